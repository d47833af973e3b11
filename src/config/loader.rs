// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{RawWatchConfig, WatchConfig};
use crate::errors::Result;

/// Load a configuration file and return the raw `RawWatchConfig`.
///
/// This only performs TOML deserialization; it does **not** validate. Use
/// [`load_and_validate`] or [`resolve`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawWatchConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawWatchConfig = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file and validate it on its own.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<WatchConfig> {
    let raw = load_from_path(path)?;
    WatchConfig::try_from(raw)
}

/// Layer `overlay` (typically the command line) over an optional config
/// file, then validate.
pub fn resolve(file: Option<&Path>, overlay: RawWatchConfig) -> Result<WatchConfig> {
    let base = match file {
        Some(path) => load_from_path(path)?,
        None => RawWatchConfig::default(),
    };
    WatchConfig::try_from(base.merge(overlay))
}
