// src/exec/launcher.rs

//! Pluggable process launcher.
//!
//! The command runner talks to a [`Launcher`] instead of spawning processes
//! itself. Production code uses [`ProcessLauncher`]; tests provide a fake
//! that never touches the OS.
//!
//! Every launched run gets its own waiter task. The waiter owns the child,
//! and is the only thing that ever calls `wait` or `kill` on it. The runner
//! keeps a [`RunHandle`] through which it can ask for termination, and
//! learns about exit through a [`RunCompleted`] message.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::errors::{QuietwatchError, Result};
use crate::exec::command::{clear_screen, shell_command, DEFAULT_SHELL};
use crate::exec::process::wait_for_exit;

/// Monotonic identifier of one run.
pub type RunId = u64;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Success,
    Failed(i32),
    /// Terminated on our request.
    Killed,
}

/// Completion notice delivered by a run's waiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunCompleted {
    pub id: RunId,
    pub outcome: RunOutcome,
}

/// What the runner asks the launcher to start.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub id: RunId,
    pub argv: Vec<String>,
    pub clear_screen: bool,
}

/// The runner's side of an active run.
///
/// Dropping the handle without calling [`kill`](Self::kill) also terminates
/// the run.
#[derive(Debug)]
pub struct RunHandle {
    id: RunId,
    kill_tx: Option<oneshot::Sender<()>>,
}

impl RunHandle {
    pub fn new(id: RunId, kill_tx: oneshot::Sender<()>) -> Self {
        Self {
            id,
            kill_tx: Some(kill_tx),
        }
    }

    pub fn id(&self) -> RunId {
        self.id
    }

    /// Best-effort termination request.
    ///
    /// Returns `false` if the run had already finished (or was already asked
    /// to stop); that is never an error.
    pub fn kill(&mut self) -> bool {
        match self.kill_tx.take() {
            Some(tx) => tx.send(()).is_ok(),
            None => false,
        }
    }
}

/// Trait abstracting how runs are started.
pub trait Launcher: Send {
    /// Start a run and its waiter. The waiter must deliver exactly one
    /// [`RunCompleted`] for `request.id` on `done_tx`.
    fn start(
        &mut self,
        request: RunRequest,
        done_tx: mpsc::Sender<RunCompleted>,
    ) -> Result<RunHandle>;
}

/// Real launcher: runs the command through a shell.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    shell: String,
}

impl ProcessLauncher {
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl Default for ProcessLauncher {
    fn default() -> Self {
        Self::new(DEFAULT_SHELL)
    }
}

impl Launcher for ProcessLauncher {
    fn start(
        &mut self,
        request: RunRequest,
        done_tx: mpsc::Sender<RunCompleted>,
    ) -> Result<RunHandle> {
        if request.clear_screen {
            clear_screen();
        }

        let mut cmd = shell_command(&self.shell, &request.argv);
        let child = cmd.spawn().map_err(|e| {
            QuietwatchError::CommandStart(format!("{} ({e})", request.argv.join(" ")))
        })?;

        info!(
            run_id = request.id,
            pid = child.id(),
            cmd = %request.argv.join(" "),
            "command started"
        );

        let (kill_tx, kill_rx) = oneshot::channel();
        let id = request.id;
        tokio::spawn(async move {
            let outcome = wait_for_exit(id, child, kill_rx).await;
            if done_tx.send(RunCompleted { id, outcome }).await.is_err() {
                debug!(run_id = id, "runner gone before completion could be delivered");
            }
        });

        Ok(RunHandle::new(request.id, kill_tx))
    }
}
