// src/engine/core.rs

//! Pure run state machine.
//!
//! This module contains a synchronous, deterministic core that consumes
//! [`RunnerEvent`]s and produces [`RunnerCommand`]s describing what the async
//! shell (`engine::runtime::CommandRunner`) should do: kill a run, start a
//! run. It has no channels, no Tokio types and performs no IO, so every
//! transition can be unit tested directly.
//!
//! [`RunnerCommand`]: crate::engine::RunnerCommand

use crate::engine::event_handlers::{handle_completion, handle_trigger, RunnerStep};
use crate::engine::{RunState, RunnerEvent};
use crate::exec::RunId;
use crate::types::OverlapPolicy;

#[derive(Debug)]
pub struct RunnerCore {
    state: RunState,
    policy: OverlapPolicy,
    next_id: RunId,
}

impl RunnerCore {
    pub fn new(policy: OverlapPolicy) -> Self {
        Self {
            state: RunState::Idle,
            policy,
            next_id: 1,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn policy(&self) -> OverlapPolicy {
        self.policy
    }

    pub fn is_idle(&self) -> bool {
        self.state == RunState::Idle
    }

    /// Handle a single event, updating state and returning the commands for
    /// the IO shell.
    pub fn step(&mut self, event: RunnerEvent) -> RunnerStep {
        match event {
            RunnerEvent::Trigger => handle_trigger(&mut self.state, self.policy, &mut self.next_id),
            RunnerEvent::Completed(done) => handle_completion(&mut self.state, done),
        }
    }

    /// Roll back a `Start` that the shell could not carry out.
    pub fn start_failed(&mut self, id: RunId) {
        if self.state == RunState::Running(id) {
            self.state = RunState::Idle;
        }
    }
}
