// src/logging.rs

//! Logging setup: a `tracing-subscriber` fmt layer on stderr.
//!
//! The level is taken from `--log-level`, else from `QUIETWATCH_LOG`, else
//! `info`. Stdout belongs to the watched command, so nothing of ours may be
//! written there.

use anyhow::{anyhow, Result};
use tracing::Level;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

/// Environment variable consulted when no `--log-level` is given.
pub const LOG_ENV_VAR: &str = "QUIETWATCH_LOG";

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env_value = std::env::var(LOG_ENV_VAR).ok();
    let level = resolve_level(cli_level, env_value.as_deref());

    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install logger: {e}"))
}

/// Effective level for a CLI flag and the raw value of `QUIETWATCH_LOG`.
/// Unparseable env values are ignored.
pub fn resolve_level(cli_level: Option<LogLevel>, env_value: Option<&str>) -> Level {
    if let Some(lvl) = cli_level {
        return lvl.into();
    }
    env_value.and_then(parse_env_level).unwrap_or(Level::INFO)
}

fn parse_env_level(raw: &str) -> Option<Level> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("warning") {
        return Some(Level::WARN);
    }
    raw.parse().ok()
}
