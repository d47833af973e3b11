// src/config/model.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::config::duration::deserialize_opt_duration;
use crate::exec::command::DEFAULT_SHELL;
use crate::types::OverlapPolicy;

/// Default quiet window.
pub const DEFAULT_QUIET: Duration = Duration::from_millis(1);

/// Smallest quiet window accepted in loop mode.
pub const MIN_QUIET: Duration = Duration::from_millis(1);

/// Un-validated configuration, as read from a TOML file or collected from
/// the command line. Every field is optional; [`RawWatchConfig::merge`]
/// layers one source over another.
///
/// ```toml
/// path = "."
/// quiet = "200ms"
/// kill = true
/// ignore = ["/target", "node_modules"]
/// command = ["cargo", "test"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawWatchConfig {
    /// Directory or file to watch. Defaults to the current directory.
    pub path: Option<PathBuf>,

    /// Descend into symlinked directories while walking.
    pub follow_symlinks: Option<bool>,

    /// Exit on the first notification instead of running a command.
    pub die: Option<bool>,

    /// Quiet window between the first change and the triggered run.
    #[serde(default, deserialize_with = "deserialize_opt_duration")]
    pub quiet: Option<Duration>,

    /// Run the command once at startup.
    pub initial: Option<bool>,

    /// Clear the terminal before each run.
    pub clear_screen: Option<bool>,

    /// Kill a running command when a new trigger arrives (otherwise the
    /// trigger is skipped).
    pub kill: Option<bool>,

    /// Per-run timeout. Accepted but not enforced.
    #[serde(default, deserialize_with = "deserialize_opt_duration")]
    pub timeout: Option<Duration>,

    /// Ignore patterns; `/`-prefixed ones are anchored at the root.
    #[serde(default)]
    pub ignore: Vec<String>,

    /// Command and arguments.
    #[serde(default)]
    pub command: Vec<String>,

    /// Shell used to run the command.
    pub shell: Option<String>,
}

impl RawWatchConfig {
    /// Layer `overlay` on top of `self`.
    ///
    /// Scalars set in `overlay` win. Ignore patterns accumulate. A non-empty
    /// command in `overlay` replaces ours.
    pub fn merge(self, overlay: RawWatchConfig) -> RawWatchConfig {
        let mut ignore = self.ignore;
        ignore.extend(overlay.ignore);

        RawWatchConfig {
            path: overlay.path.or(self.path),
            follow_symlinks: overlay.follow_symlinks.or(self.follow_symlinks),
            die: overlay.die.or(self.die),
            quiet: overlay.quiet.or(self.quiet),
            initial: overlay.initial.or(self.initial),
            clear_screen: overlay.clear_screen.or(self.clear_screen),
            kill: overlay.kill.or(self.kill),
            timeout: overlay.timeout.or(self.timeout),
            ignore,
            command: if overlay.command.is_empty() {
                self.command
            } else {
                overlay.command
            },
            shell: overlay.shell.or(self.shell),
        }
    }
}

/// Validated configuration. Immutable once built; construct it through
/// `WatchConfig::try_from(RawWatchConfig)`.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchConfig {
    root: PathBuf,
    follow_symlinks: bool,
    die: bool,
    quiet: Duration,
    initial_run: bool,
    clear_screen: bool,
    policy: OverlapPolicy,
    timeout: Option<Duration>,
    ignore: Vec<String>,
    command: Vec<String>,
    shell: String,
}

impl WatchConfig {
    /// Build without validation. Only `validate.rs` calls this.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new_unchecked(
        root: PathBuf,
        follow_symlinks: bool,
        die: bool,
        quiet: Duration,
        initial_run: bool,
        clear_screen: bool,
        policy: OverlapPolicy,
        timeout: Option<Duration>,
        ignore: Vec<String>,
        command: Vec<String>,
        shell: String,
    ) -> Self {
        Self {
            root,
            follow_symlinks,
            die,
            quiet,
            initial_run,
            clear_screen,
            policy,
            timeout,
            ignore,
            command,
            shell,
        }
    }

    /// Absolute watch root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn follow_symlinks(&self) -> bool {
        self.follow_symlinks
    }

    pub fn die(&self) -> bool {
        self.die
    }

    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    pub fn initial_run(&self) -> bool {
        self.initial_run
    }

    pub fn clear_screen(&self) -> bool {
        self.clear_screen
    }

    pub fn policy(&self) -> OverlapPolicy {
        self.policy
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Ignore patterns: the user's, in the order given, followed by the
    /// built-in ones.
    pub fn ignore(&self) -> &[String] {
        &self.ignore
    }

    pub fn command(&self) -> &[String] {
        &self.command
    }

    pub fn shell(&self) -> &str {
        &self.shell
    }
}

pub(crate) fn default_shell() -> String {
    DEFAULT_SHELL.to_string()
}
