// src/config/validate.rs

use std::path::PathBuf;

use crate::config::model::{default_shell, RawWatchConfig, WatchConfig, DEFAULT_QUIET, MIN_QUIET};
use crate::errors::{QuietwatchError, Result};
use crate::types::OverlapPolicy;
use crate::watch::matcher::GLOBALLY_IGNORED;

impl TryFrom<RawWatchConfig> for WatchConfig {
    type Error = QuietwatchError;

    fn try_from(raw: RawWatchConfig) -> std::result::Result<Self, Self::Error> {
        let die = raw.die.unwrap_or(false);
        let root = resolve_root(raw.path.clone())?;

        let quiet = raw.quiet.unwrap_or(DEFAULT_QUIET);
        if !die {
            validate_loop_options(&raw, quiet)?;
        }
        validate_ignore_patterns(&raw.ignore)?;

        let shell = raw.shell.unwrap_or_else(default_shell);
        if shell.trim().is_empty() {
            return Err(QuietwatchError::ConfigError(
                "shell must not be empty".to_string(),
            ));
        }

        let mut ignore = raw.ignore;
        for builtin in GLOBALLY_IGNORED {
            if !ignore.iter().any(|p| p == builtin) {
                ignore.push(builtin.to_string());
            }
        }

        // A zero timeout means "no timeout".
        let timeout = raw.timeout.filter(|t| !t.is_zero());

        Ok(WatchConfig::new_unchecked(
            root,
            raw.follow_symlinks.unwrap_or(false),
            die,
            quiet,
            raw.initial.unwrap_or(true),
            raw.clear_screen.unwrap_or(true),
            OverlapPolicy::from_kill_flag(raw.kill.unwrap_or(true)),
            timeout,
            ignore,
            raw.command,
            shell,
        ))
    }
}

/// Make the root absolute and check that it exists.
fn resolve_root(path: Option<PathBuf>) -> Result<PathBuf> {
    let path = path
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from("."));

    let abs = std::path::absolute(&path).map_err(|e| {
        QuietwatchError::ConfigError(format!("could not resolve watch path {:?}: {e}", path))
    })?;

    std::fs::metadata(&abs).map_err(|e| {
        QuietwatchError::ConfigError(format!("could not stat watch path {:?}: {e}", abs))
    })?;

    Ok(abs)
}

fn validate_loop_options(raw: &RawWatchConfig, quiet: std::time::Duration) -> Result<()> {
    if quiet < MIN_QUIET {
        return Err(QuietwatchError::ConfigError(format!(
            "quiet window must be at least {:?} (got {:?})",
            MIN_QUIET, quiet
        )));
    }

    if raw.command.is_empty() || raw.command.iter().all(|a| a.trim().is_empty()) {
        return Err(QuietwatchError::ConfigError(
            "a command is required unless running in die mode".to_string(),
        ));
    }

    Ok(())
}

fn validate_ignore_patterns(patterns: &[String]) -> Result<()> {
    for pattern in patterns {
        // An empty suffix would match every path; a lone "/" would match the
        // root, which is never ignored anyway.
        if pattern.is_empty() || pattern == "/" {
            return Err(QuietwatchError::ConfigError(format!(
                "invalid ignore pattern {:?}",
                pattern
            )));
        }
    }
    Ok(())
}
