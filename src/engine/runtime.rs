// src/engine/runtime.rs

use std::fmt;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::WatchConfig;
use crate::errors::Result;
use crate::exec::{Launcher, RunCompleted, RunHandle, RunId, RunRequest};
use crate::types::OverlapPolicy;
use crate::watch::Trigger;

use super::core::RunnerCore;
use super::{RunnerCommand, RunnerEvent};

/// Capacity of the trigger channel. Triggers are already coalesced, so this
/// only needs to absorb a short burst.
const TICK_CHANNEL_CAPACITY: usize = 16;

/// How long shutdown waits for a killed run's waiter to report exit.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Settings the runner needs from the watch config.
#[derive(Debug, Clone)]
pub struct RunnerSettings {
    pub argv: Vec<String>,
    pub policy: OverlapPolicy,
    pub initial_run: bool,
    pub clear_screen: bool,
    /// Accepted and reported, never enforced.
    pub timeout: Option<Duration>,
}

impl RunnerSettings {
    pub fn from_config(cfg: &WatchConfig) -> Self {
        Self {
            argv: cfg.command().to_vec(),
            policy: cfg.policy(),
            initial_run: cfg.initial_run(),
            clear_screen: cfg.clear_screen(),
            timeout: cfg.timeout(),
        }
    }
}

/// Owns the (at most one) active run.
///
/// All run state is mutated on this task only; the outside world reaches it
/// through the trigger channel, and run waiters through the completion
/// channel.
pub struct CommandRunner<L: Launcher> {
    core: RunnerCore,
    launcher: L,
    settings: RunnerSettings,
    tick_rx: mpsc::Receiver<Trigger>,
    done_tx: mpsc::Sender<RunCompleted>,
    done_rx: mpsc::Receiver<RunCompleted>,
    current: Option<RunHandle>,
}

impl<L: Launcher> fmt::Debug for CommandRunner<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRunner")
            .field("core", &self.core)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl<L: Launcher> CommandRunner<L> {
    pub fn new(settings: RunnerSettings, launcher: L, tick_rx: mpsc::Receiver<Trigger>) -> Self {
        let (done_tx, done_rx) = mpsc::channel(TICK_CHANNEL_CAPACITY);
        Self {
            core: RunnerCore::new(settings.policy),
            launcher,
            settings,
            tick_rx,
            done_tx,
            done_rx,
            current: None,
        }
    }

    /// Main loop. Returns when the trigger channel closes, or with an error
    /// if the command cannot be started.
    pub async fn run(mut self) -> Result<()> {
        info!(policy = ?self.settings.policy, "command runner started");

        if let Some(timeout) = self.settings.timeout {
            warn!(?timeout, "per-run timeout is accepted but not enforced");
        }

        if self.settings.initial_run {
            debug!("initial run requested");
            self.dispatch(RunnerEvent::Trigger)?;
        }

        loop {
            tokio::select! {
                // Completions first, so a trigger sees up-to-date state.
                biased;

                Some(done) = self.done_rx.recv() => {
                    self.dispatch(RunnerEvent::Completed(done))?;
                }

                tick = self.tick_rx.recv() => match tick {
                    Some(Trigger) => self.dispatch(RunnerEvent::Trigger)?,
                    None => {
                        debug!("trigger channel closed");
                        break;
                    }
                },
            }
        }

        self.shutdown().await;
        info!("command runner exiting");
        Ok(())
    }

    fn dispatch(&mut self, event: RunnerEvent) -> Result<()> {
        if let RunnerEvent::Completed(done) = event {
            debug!(run_id = done.id, outcome = ?done.outcome, "run completed");
            if self.current.as_ref().is_some_and(|h| h.id() == done.id) {
                self.current = None;
            }
        }

        let step = self.core.step(event);
        for command in step.commands {
            self.execute(command)?;
        }
        Ok(())
    }

    fn execute(&mut self, command: RunnerCommand) -> Result<()> {
        match command {
            RunnerCommand::Kill(id) => self.kill(id),
            RunnerCommand::Start(id) => self.start(id)?,
        }
        Ok(())
    }

    fn kill(&mut self, id: RunId) {
        match self.current.take() {
            Some(mut handle) if handle.id() == id => {
                if !handle.kill() {
                    debug!(run_id = id, "run already finished when kill was requested");
                }
            }
            other => {
                debug!(run_id = id, "no handle for run to kill");
                self.current = other;
            }
        }
    }

    fn start(&mut self, id: RunId) -> Result<()> {
        let request = RunRequest {
            id,
            argv: self.settings.argv.clone(),
            clear_screen: self.settings.clear_screen,
        };
        match self.launcher.start(request, self.done_tx.clone()) {
            Ok(handle) => {
                self.current = Some(handle);
                Ok(())
            }
            Err(err) => {
                self.core.start_failed(id);
                Err(err)
            }
        }
    }

    /// Kill the active run and wait (bounded) until its waiter has reaped
    /// it, so the process is gone before we return.
    async fn shutdown(&mut self) {
        let Some(mut handle) = self.current.take() else {
            return;
        };
        let id = handle.id();
        info!(run_id = id, "stopping running command");
        if !handle.kill() {
            debug!(run_id = id, "run already finished");
            return;
        }

        let reaped = async {
            while let Some(done) = self.done_rx.recv().await {
                if done.id == id {
                    break;
                }
            }
        };
        if tokio::time::timeout(SHUTDOWN_GRACE, reaped).await.is_err() {
            warn!(run_id = id, grace = ?SHUTDOWN_GRACE, "command did not report exit during shutdown");
        }
    }
}

/// Running command runner task plus its trigger sender.
#[derive(Debug)]
pub struct RunnerHandle {
    pub ticks: mpsc::Sender<Trigger>,
    pub join: JoinHandle<Result<()>>,
}

/// Spawn a [`CommandRunner`] on the current runtime.
pub fn spawn_runner<L>(settings: RunnerSettings, launcher: L) -> RunnerHandle
where
    L: Launcher + 'static,
{
    let (ticks, tick_rx) = mpsc::channel(TICK_CHANNEL_CAPACITY);
    let runner = CommandRunner::new(settings, launcher, tick_rx);
    let join = tokio::spawn(runner.run());
    RunnerHandle { ticks, join }
}
