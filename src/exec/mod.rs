// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`command`] builds the shell invocation and clears the screen.
//! - [`launcher`] provides the `Launcher` trait, the run handle and
//!   completion types, and the production `ProcessLauncher`.
//! - [`process`] is the waiter that owns one child until it exits.

pub mod command;
pub mod launcher;
pub mod process;

pub use launcher::{
    Launcher, ProcessLauncher, RunCompleted, RunHandle, RunId, RunOutcome, RunRequest,
};
