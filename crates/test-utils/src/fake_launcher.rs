use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use quietwatch::errors::{QuietwatchError, Result};
use quietwatch::exec::{Launcher, RunCompleted, RunHandle, RunId, RunOutcome, RunRequest};
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

#[derive(Debug, Default)]
struct State {
    started: Vec<(RunId, Instant)>,
    killed: Vec<RunId>,
    finishers: HashMap<RunId, oneshot::Sender<RunOutcome>>,
    fail_start: bool,
    ignore_kills: bool,
}

/// A fake launcher whose runs only end when the test says so (or when they
/// are killed).
///
/// Clones share state, so keep one clone in the test and hand the other to
/// the runner.
#[derive(Debug, Clone, Default)]
pub struct FakeLauncher {
    state: Arc<Mutex<State>>,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `start` fail.
    pub fn fail_starts(&self) {
        self.state.lock().unwrap().fail_start = true;
    }

    /// Killed runs record the kill but never report completion, like a
    /// process that hangs on its way out.
    pub fn ignore_kills(&self) {
        self.state.lock().unwrap().ignore_kills = true;
    }

    pub fn started(&self) -> Vec<RunId> {
        self.state.lock().unwrap().started.iter().map(|(id, _)| *id).collect()
    }

    pub fn start_times(&self) -> Vec<Instant> {
        self.state.lock().unwrap().started.iter().map(|(_, t)| *t).collect()
    }

    pub fn killed(&self) -> Vec<RunId> {
        self.state.lock().unwrap().killed.clone()
    }

    /// Let run `id` exit with `outcome`. Returns false if it already ended.
    pub fn finish(&self, id: RunId, outcome: RunOutcome) -> bool {
        let finisher = self.state.lock().unwrap().finishers.remove(&id);
        match finisher {
            Some(tx) => tx.send(outcome).is_ok(),
            None => false,
        }
    }
}

impl Launcher for FakeLauncher {
    fn start(
        &mut self,
        request: RunRequest,
        done_tx: mpsc::Sender<RunCompleted>,
    ) -> Result<RunHandle> {
        let (kill_tx, mut kill_rx) = oneshot::channel::<()>();
        let (finish_tx, finish_rx) = oneshot::channel::<RunOutcome>();

        {
            let mut state = self.state.lock().unwrap();
            if state.fail_start {
                return Err(QuietwatchError::CommandStart(request.argv.join(" ")));
            }
            state.started.push((request.id, Instant::now()));
            state.finishers.insert(request.id, finish_tx);
        }

        let id = request.id;
        let shared = Arc::clone(&self.state);
        tokio::spawn(async move {
            let outcome = tokio::select! {
                _ = &mut kill_rx => {
                    let hang = {
                        let mut state = shared.lock().unwrap();
                        state.killed.push(id);
                        state.finishers.remove(&id);
                        state.ignore_kills
                    };
                    if hang {
                        std::future::pending::<()>().await;
                    }
                    RunOutcome::Killed
                }
                res = finish_rx => res.unwrap_or(RunOutcome::Killed),
            };
            let _ = done_tx.send(RunCompleted { id, outcome }).await;
        });

        Ok(RunHandle::new(id, kill_tx))
    }
}
