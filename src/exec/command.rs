// src/exec/command.rs

//! Shell wrapping for the user's command.
//!
//! The argument vector is joined with spaces and handed to a shell as one
//! script, so globs and other shell syntax in the command work. With bash we
//! also turn on `globstar` so `**` patterns expand recursively.

use std::io::Write;
use std::process::Stdio;

use tokio::process::Command;

/// Shell used when the config does not name one.
pub const DEFAULT_SHELL: &str = "bash";

/// ANSI sequence that clears the terminal and homes the cursor.
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Program and arguments that run `argv` through `shell`.
pub fn shell_invocation(shell: &str, argv: &[String]) -> (String, Vec<String>) {
    let script = argv.join(" ");

    if cfg!(windows) {
        return ("cmd".to_string(), vec!["/C".to_string(), script]);
    }

    let mut args = Vec::with_capacity(5);
    if is_bash(shell) {
        args.push("-O".to_string());
        args.push("globstar".to_string());
    }
    args.push("-c".to_string());
    args.push("--".to_string());
    args.push(script);
    (shell.to_string(), args)
}

/// Build the command for one run: stdout and stderr are shared with us,
/// stdin is closed.
pub fn shell_command(shell: &str, argv: &[String]) -> Command {
    let (program, args) = shell_invocation(shell, argv);
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true);
    cmd
}

/// Clear the terminal before a run.
pub fn clear_screen() {
    let mut out = std::io::stdout().lock();
    // Nothing useful to do if stdout is gone.
    let _ = out.write_all(CLEAR_SCREEN.as_bytes());
    let _ = out.flush();
}

fn is_bash(shell: &str) -> bool {
    std::path::Path::new(shell)
        .file_name()
        .is_some_and(|name| name == "bash")
}
