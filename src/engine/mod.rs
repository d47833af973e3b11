// src/engine/mod.rs

//! Orchestration engine for quietwatch.
//!
//! This module ties together:
//! - the run state machine (what a trigger means given what is running)
//! - the command runner task that owns the active process
//! - the controller that drives die mode or the watch loop
//!
//! The pure state machine lives in [`core`]; the async shell around it is
//! [`runtime`], and [`controller`] wires watch and exec together.

use crate::exec::{RunCompleted, RunId};

/// Whether a command is currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running(RunId),
}

/// Events flowing into the run state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerEvent {
    /// A coalesced trigger tick (or the initial run).
    Trigger,
    /// A run's waiter reported exit.
    Completed(RunCompleted),
}

pub mod controller;
pub mod core;
pub mod event_handlers;
pub mod runtime;

pub use controller::{register_root, run_die_mode, run_loop_mode, WatchLoop};
pub use core::RunnerCore;
pub use event_handlers::{RunnerCommand, RunnerStep};
pub use runtime::{spawn_runner, CommandRunner, RunnerHandle, RunnerSettings};
pub use crate::types::OverlapPolicy;
