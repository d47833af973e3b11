// src/exec/process.rs

//! Waiting on a single child process.

use tokio::process::Child;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::exec::launcher::{RunId, RunOutcome};

/// Wait for `child` to exit, or kill it when `kill_rx` fires.
///
/// A closed `kill_rx` (the runner dropped its handle) is treated as a kill
/// request too. Kill errors are expected when the process already exited on
/// its own, and are only logged.
pub async fn wait_for_exit(
    id: RunId,
    mut child: Child,
    mut kill_rx: oneshot::Receiver<()>,
) -> RunOutcome {
    tokio::select! {
        status = child.wait() => match status {
            Ok(status) => {
                let code = status.code().unwrap_or(-1);
                info!(
                    run_id = id,
                    exit_code = code,
                    success = status.success(),
                    "command exited"
                );
                if status.success() {
                    RunOutcome::Success
                } else {
                    RunOutcome::Failed(code)
                }
            }
            Err(err) => {
                warn!(run_id = id, error = %err, "failed waiting for command");
                RunOutcome::Failed(-1)
            }
        },

        request = &mut kill_rx => {
            match request {
                Ok(()) => info!(run_id = id, "killing running command"),
                Err(_) => debug!(run_id = id, "run handle dropped; killing command"),
            }
            if let Err(err) = child.kill().await {
                debug!(run_id = id, error = %err, "kill failed; process probably already exited");
            }
            RunOutcome::Killed
        }
    }
}
