// src/config/mod.rs

//! Configuration loading and validation for quietwatch.
//!
//! Responsibilities:
//! - Define the raw and validated data model (`model.rs`).
//! - Load an optional TOML file from disk (`loader.rs`).
//! - Validate and apply defaults (`validate.rs`).
//! - Parse duration strings (`duration.rs`).

pub mod duration;
pub mod loader;
pub mod model;
pub mod validate;

pub use duration::parse_duration;
pub use loader::{load_and_validate, load_from_path, resolve};
pub use model::{RawWatchConfig, WatchConfig, DEFAULT_QUIET, MIN_QUIET};
