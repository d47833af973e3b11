// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Deciding which paths are ignored ([`matcher`]).
//! - Fingerprinting files and directories ([`hash`]).
//! - Walking the root and registering watches, with a fingerprint cache
//!   ([`tree`], [`cache`]).
//! - Turning raw notifications into coalesced triggers ([`dispatcher`],
//!   [`deadline`]).
//! - The notification backend itself ([`source`]).
//!
//! It does **not** know about processes; it only produces triggers.

pub mod cache;
pub mod deadline;
pub mod dispatcher;
pub mod hash;
pub mod matcher;
pub mod path_utils;
pub mod source;
pub mod tree;

pub use cache::{FingerprintCache, WatchEntry};
pub use deadline::QuietDeadline;
pub use dispatcher::{Dispatch, EventDispatcher, Trigger};
pub use hash::{fingerprint, Fingerprint};
pub use matcher::{is_ignored, PathMatcher, GIT_DIR};
pub use source::{NotifySource, SourceError, SourceStreams, WatchSource};
pub use tree::{WalkFailure, WalkReport, WalkStage, WatchTree};
