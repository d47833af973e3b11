// tests/exec.rs

mod common;
use crate::common::with_timeout;

use quietwatch::exec::command::shell_invocation;

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

#[cfg(not(windows))]
#[test]
fn bash_gets_globstar_and_joined_script() {
    let (program, args) = shell_invocation("bash", &argv(&["ls", "src/**/*.rs"]));
    assert_eq!(program, "bash");
    assert_eq!(args, argv(&["-O", "globstar", "-c", "--", "ls src/**/*.rs"]));

    let (program, args) = shell_invocation("/usr/local/bin/bash", &argv(&["true"]));
    assert_eq!(program, "/usr/local/bin/bash");
    assert_eq!(args[..2], argv(&["-O", "globstar"])[..]);
}

#[cfg(not(windows))]
#[test]
fn other_shells_get_plain_dash_c() {
    let (program, args) = shell_invocation("zsh", &argv(&["echo", "hi"]));
    assert_eq!(program, "zsh");
    assert_eq!(args, argv(&["-c", "--", "echo hi"]));
}

#[cfg(unix)]
mod process {
    use super::*;

    use quietwatch::exec::{Launcher, ProcessLauncher, RunCompleted, RunOutcome, RunRequest};
    use tokio::sync::mpsc;

    fn request(id: u64, script: &[&str]) -> RunRequest {
        RunRequest {
            id,
            argv: argv(script),
            clear_screen: false,
        }
    }

    #[tokio::test]
    async fn exit_codes_are_reported() {
        let mut launcher = ProcessLauncher::new("sh");
        let (tx, mut rx) = mpsc::channel(4);

        let _ok = launcher.start(request(1, &["true"]), tx.clone()).unwrap();
        let done = with_timeout(rx.recv()).await.unwrap();
        assert_eq!(done, RunCompleted { id: 1, outcome: RunOutcome::Success });

        let _failed = launcher.start(request(2, &["exit", "3"]), tx).unwrap();
        let done = with_timeout(rx.recv()).await.unwrap();
        assert_eq!(done, RunCompleted { id: 2, outcome: RunOutcome::Failed(3) });
    }

    #[tokio::test]
    async fn kill_terminates_long_running_command() {
        let mut launcher = ProcessLauncher::new("sh");
        let (tx, mut rx) = mpsc::channel(4);

        let mut handle = launcher.start(request(7, &["sleep", "30"]), tx).unwrap();
        assert!(handle.kill());
        assert!(!handle.kill(), "second kill request is a no-op");

        let done = with_timeout(rx.recv()).await.unwrap();
        assert_eq!(done, RunCompleted { id: 7, outcome: RunOutcome::Killed });
    }

    #[tokio::test]
    async fn dropping_the_handle_kills_the_run() {
        let mut launcher = ProcessLauncher::new("sh");
        let (tx, mut rx) = mpsc::channel(4);

        drop(launcher.start(request(9, &["sleep", "30"]), tx).unwrap());

        let done = with_timeout(rx.recv()).await.unwrap();
        assert_eq!(done.outcome, RunOutcome::Killed);
    }

    #[tokio::test]
    async fn missing_shell_is_a_start_error() {
        let mut launcher = ProcessLauncher::new("/definitely/not/a/shell");
        let (tx, _rx) = mpsc::channel(4);

        let err = launcher.start(request(1, &["true"]), tx).unwrap_err();
        assert!(matches!(err, quietwatch::errors::QuietwatchError::CommandStart(_)));
    }
}
