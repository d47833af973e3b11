// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! Command mode:
//!     quietwatch [-q DURATION] [-p PATH] [-i] [-f] [-c] [-k] -- CMD ARG1 ARG2...
//!
//! Die mode:
//!     quietwatch -d [-p PATH] [-f]
//!
//! Boolean options that default to on take an optional value, e.g.
//! `--kill=false` or `-k=false`.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::{parse_duration, RawWatchConfig};

/// Command-line arguments for `quietwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "quietwatch",
    version,
    about = "Run a command whenever files under a path change, once per quiet window.",
    long_about = None,
    after_help = "Only --path and --follow apply in die mode."
)]
pub struct CliArgs {
    /// The path to watch; default is the current directory.
    #[arg(short = 'p', long, value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Follow symlinks when walking the tree.
    #[arg(
        short = 'f',
        long = "follow",
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub follow_symlinks: Option<bool>,

    /// Exit on the first notification (0) or watch error (1); no command is run.
    #[arg(short = 'd', long)]
    pub die: bool,

    /// Duration of the quiet window, e.g. 200ms, 1s, 10us. Minimum 1ms.
    #[arg(short = 'q', long, value_name = "DURATION", value_parser = parse_duration)]
    pub quiet: Option<Duration>,

    /// Run the command once at startup [default: true].
    #[arg(
        short = 'i',
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub initial: Option<bool>,

    /// Clear the screen before each run [default: true].
    #[arg(
        short = 'c',
        long = "clear",
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub clear_screen: Option<bool>,

    /// Kill the running command when a new change arrives; otherwise the
    /// change is skipped [default: true].
    #[arg(
        short = 'k',
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub kill: Option<bool>,

    /// Timeout after which a run would be killed. Accepted but not enforced.
    #[arg(short = 't', long, value_name = "DURATION", value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Paths to ignore. A leading `/` anchors the pattern at the watch root;
    /// other patterns match any path ending with them. Repeatable.
    #[arg(short = 'I', long = "ignore", value_name = "PATTERN")]
    pub ignore: Vec<String>,

    /// TOML file providing defaults for any of the options above.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Shell used to run the command [default: bash].
    #[arg(long, value_name = "SHELL")]
    pub shell: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `QUIETWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve and print the configuration, but don't watch or run anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Command to run, with its arguments.
    #[arg(trailing_var_arg = true, value_name = "CMD")]
    pub command: Vec<String>,
}

impl CliArgs {
    /// The command-line layer of the configuration.
    pub fn to_raw_config(&self) -> RawWatchConfig {
        RawWatchConfig {
            path: self.path.clone(),
            follow_symlinks: self.follow_symlinks,
            die: self.die.then_some(true),
            quiet: self.quiet,
            initial: self.initial,
            clear_screen: self.clear_screen,
            kill: self.kill,
            timeout: self.timeout,
            ignore: self.ignore.clone(),
            command: self.command.clone(),
            shell: self.shell.clone(),
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(lvl: LogLevel) -> Self {
        match lvl {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
