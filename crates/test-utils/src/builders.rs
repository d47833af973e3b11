#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;

use quietwatch::config::{RawWatchConfig, WatchConfig};

/// Builder for `WatchConfig` to simplify test setup.
///
/// Starts from a loop-mode config with `echo` as the command, no initial
/// run and no screen clearing, so tests only opt into what they check.
pub struct WatchConfigBuilder {
    raw: RawWatchConfig,
}

impl WatchConfigBuilder {
    pub fn new(root: &Path) -> Self {
        Self {
            raw: RawWatchConfig {
                path: Some(root.to_path_buf()),
                initial: Some(false),
                clear_screen: Some(false),
                command: vec!["echo".to_string(), "changed".to_string()],
                ..RawWatchConfig::default()
            },
        }
    }

    pub fn quiet(mut self, quiet: Duration) -> Self {
        self.raw.quiet = Some(quiet);
        self
    }

    pub fn initial(mut self, val: bool) -> Self {
        self.raw.initial = Some(val);
        self
    }

    pub fn kill(mut self, val: bool) -> Self {
        self.raw.kill = Some(val);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.raw.timeout = Some(timeout);
        self
    }

    pub fn follow_symlinks(mut self, val: bool) -> Self {
        self.raw.follow_symlinks = Some(val);
        self
    }

    pub fn die(mut self) -> Self {
        self.raw.die = Some(true);
        self
    }

    pub fn ignore(mut self, pattern: &str) -> Self {
        self.raw.ignore.push(pattern.to_string());
        self
    }

    pub fn command(mut self, argv: &[&str]) -> Self {
        self.raw.command = argv.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn raw(self) -> RawWatchConfig {
        self.raw
    }

    pub fn build(self) -> WatchConfig {
        WatchConfig::try_from(self.raw).expect("Failed to build valid config from builder")
    }
}
