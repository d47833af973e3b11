// src/engine/event_handlers.rs

//! Transition logic for the run state machine.

use tracing::debug;

use crate::engine::RunState;
use crate::exec::{RunCompleted, RunId};
use crate::types::OverlapPolicy;

/// Command produced by the pure core, to be executed by the async shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerCommand {
    /// Ask the given run to terminate (best effort).
    Kill(RunId),
    /// Launch a new run with this id.
    Start(RunId),
}

/// Decision returned by the core after handling one event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunnerStep {
    /// Commands to execute, in order.
    pub commands: Vec<RunnerCommand>,
}

impl RunnerStep {
    fn none() -> Self {
        Self::default()
    }

    /// Was the event dropped without any effect?
    pub fn is_noop(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Handle a trigger tick.
///
/// - Idle: start a run.
/// - Running with `Restart`: kill the current run, then start a new one.
/// - Running with `Skip`: drop the trigger. Nothing is queued.
pub fn handle_trigger(
    state: &mut RunState,
    policy: OverlapPolicy,
    next_id: &mut RunId,
) -> RunnerStep {
    match (*state, policy) {
        (RunState::Idle, _) => {
            let id = allocate(next_id);
            *state = RunState::Running(id);
            RunnerStep {
                commands: vec![RunnerCommand::Start(id)],
            }
        }
        (RunState::Running(current), OverlapPolicy::Restart) => {
            let id = allocate(next_id);
            *state = RunState::Running(id);
            RunnerStep {
                commands: vec![RunnerCommand::Kill(current), RunnerCommand::Start(id)],
            }
        }
        (RunState::Running(current), OverlapPolicy::Skip) => {
            debug!(run_id = current, "command still running; dropping trigger");
            RunnerStep::none()
        }
    }
}

/// Handle a completion notice.
///
/// Only the current run's completion returns us to idle; a superseded run
/// finishing is consumed without effect.
pub fn handle_completion(state: &mut RunState, done: RunCompleted) -> RunnerStep {
    match *state {
        RunState::Running(current) if current == done.id => {
            *state = RunState::Idle;
        }
        _ => {
            debug!(run_id = done.id, ?state, "completion of superseded run; ignoring");
        }
    }
    RunnerStep::none()
}

fn allocate(next_id: &mut RunId) -> RunId {
    let id = *next_id;
    *next_id += 1;
    id
}
