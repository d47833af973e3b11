// src/engine/controller.rs

//! Die mode and the watch loop.
//!
//! Both modes start with the same registration pass over the watch root.
//! Die mode then waits for exactly one raw event or error. Loop mode feeds
//! events into the dispatcher, turns quiet-window expiries into trigger
//! ticks, and logs source errors without stopping.

use std::future::Future;

use anyhow::anyhow;
use tracing::{debug, info, warn};

use crate::engine::runtime::{spawn_runner, RunnerHandle, RunnerSettings};
use crate::errors::Result;
use crate::exec::Launcher;
use crate::watch::deadline::expired;
use crate::watch::tree::WalkReport;
use crate::watch::{EventDispatcher, SourceStreams, WatchSource, WatchTree};

/// Exit code for die mode when an event arrives first.
pub const DIE_EXIT_EVENT: i32 = 0;
/// Exit code for die mode when an error arrives first.
pub const DIE_EXIT_ERROR: i32 = 1;

/// Register everything under the tree's root and log the outcome.
pub fn register_root<S: WatchSource>(tree: &mut WatchTree<S>) -> WalkReport {
    let root = tree.root().to_path_buf();
    let report = tree.add(&root);

    for failure in &report.failures {
        debug!(
            path = ?failure.path,
            stage = ?failure.stage,
            error = %failure.error,
            "skipped entry during registration"
        );
    }
    info!(
        root = ?root,
        watched = report.registered.len(),
        pruned = report.pruned.len(),
        skipped = report.failures.len(),
        "watching"
    );
    report
}

/// One-shot mode: returns the process exit code.
///
/// No debouncing and no command execution happen here.
pub async fn run_die_mode<S: WatchSource>(
    tree: &mut WatchTree<S>,
    streams: &mut SourceStreams,
) -> i32 {
    register_root(tree);

    let code = tokio::select! {
        event = streams.events.recv() => match event {
            Some(event) => {
                info!(?event, "change notification received; exiting");
                DIE_EXIT_EVENT
            }
            None => {
                warn!("notification source closed before any event");
                DIE_EXIT_ERROR
            }
        },
        err = streams.errors.recv() => {
            match err {
                Some(err) => warn!(error = %err, "watch source error; exiting"),
                None => warn!("notification source closed before any event"),
            }
            DIE_EXIT_ERROR
        }
    };

    tree.close();
    code
}

/// The continuous watch loop.
pub struct WatchLoop<S: WatchSource> {
    dispatcher: EventDispatcher<S>,
    streams: SourceStreams,
    runner: RunnerHandle,
}

impl<S: WatchSource> std::fmt::Debug for WatchLoop<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchLoop")
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

impl<S: WatchSource> WatchLoop<S> {
    /// The dispatcher's tree is expected to be registered already, and the
    /// runner already spawned.
    pub fn new(dispatcher: EventDispatcher<S>, streams: SourceStreams, runner: RunnerHandle) -> Self {
        Self {
            dispatcher,
            streams,
            runner,
        }
    }

    /// Run until `shutdown` resolves, the source closes, or the runner fails.
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let Self {
            mut dispatcher,
            mut streams,
            runner,
        } = self;
        let RunnerHandle { ticks, mut join } = runner;

        tokio::pin!(shutdown);
        let mut errors_open = true;

        info!(quiet = ?dispatcher.quiet(), "watch loop started");

        let runner_result = loop {
            let deadline = dispatcher.deadline();

            tokio::select! {
                _ = &mut shutdown => {
                    info!("shutdown requested");
                    break None;
                }

                res = &mut join => {
                    break Some(res);
                }

                _ = expired(deadline), if deadline.is_some() => {
                    if let Some(trigger) = dispatcher.fire() {
                        if ticks.send(trigger).await.is_err() {
                            warn!("command runner stopped; leaving watch loop");
                            break None;
                        }
                    }
                }

                event = streams.events.recv() => match event {
                    Some(event) => {
                        let outcome = dispatcher.handle(event);
                        debug!(?outcome, "handled change event");
                    }
                    None => {
                        warn!("notification source closed; leaving watch loop");
                        break None;
                    }
                },

                err = streams.errors.recv(), if errors_open => match err {
                    Some(err) => warn!(error = %err, "watch source error; continuing"),
                    None => errors_open = false,
                },
            }
        };

        dispatcher.close();
        drop(ticks);

        let res = match runner_result {
            Some(res) => res,
            None => join.await,
        };
        match res {
            Ok(inner) => inner,
            Err(join_err) => Err(anyhow!("command runner task failed: {join_err}").into()),
        }
    }
}

/// Loop mode: register the root, then start the command runner, then hand
/// over to [`WatchLoop`].
pub async fn run_loop_mode<S, L, F>(
    mut dispatcher: EventDispatcher<S>,
    streams: SourceStreams,
    settings: RunnerSettings,
    launcher: L,
    shutdown: F,
) -> Result<()>
where
    S: WatchSource,
    L: Launcher + 'static,
    F: Future<Output = ()>,
{
    register_root(dispatcher.tree_mut());
    let runner = spawn_runner(settings, launcher);
    WatchLoop::new(dispatcher, streams, runner).run(shutdown).await
}
