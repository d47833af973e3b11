// src/watch/source.rs

//! Low-level notification source.
//!
//! The rest of the crate only sees the [`WatchSource`] capability plus the
//! two receivers in [`SourceStreams`]. [`NotifySource`] is the production
//! backend, built on `notify`'s recommended watcher with one non-recursive
//! watch per registered path (the tree walker decides what gets watched).

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::anyhow;
use notify::event::{ModifyKind, RenameMode};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

use crate::errors::Result;
use crate::types::{ChangeEvent, ChangeKind};

/// Error reported asynchronously by the notification source.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct SourceError {
    pub message: String,
    pub paths: Vec<PathBuf>,
}

impl SourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            paths: Vec::new(),
        }
    }
}

impl From<notify::Error> for SourceError {
    fn from(err: notify::Error) -> Self {
        Self {
            message: err.to_string(),
            paths: err.paths,
        }
    }
}

/// Receivers for everything the source reports.
#[derive(Debug)]
pub struct SourceStreams {
    pub events: mpsc::UnboundedReceiver<ChangeEvent>,
    pub errors: mpsc::UnboundedReceiver<SourceError>,
}

/// Senders paired with [`SourceStreams`]; backends push into these.
#[derive(Debug, Clone)]
pub struct SourceSinks {
    pub events: mpsc::UnboundedSender<ChangeEvent>,
    pub errors: mpsc::UnboundedSender<SourceError>,
}

/// Create a connected sink/stream pair.
pub fn source_channels() -> (SourceSinks, SourceStreams) {
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (errors_tx, errors_rx) = mpsc::unbounded_channel();
    (
        SourceSinks {
            events: events_tx,
            errors: errors_tx,
        },
        SourceStreams {
            events: events_rx,
            errors: errors_rx,
        },
    )
}

/// Registration capability required by the watch tree.
///
/// Registration failures are reported but treated as advisory by callers.
pub trait WatchSource: Send {
    fn add(&mut self, path: &Path) -> Result<()>;
    fn remove(&mut self, path: &Path) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}

/// `notify`-backed source.
pub struct NotifySource {
    inner: Option<RecommendedWatcher>,
}

impl fmt::Debug for NotifySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifySource")
            .field("open", &self.inner.is_some())
            .finish()
    }
}

impl NotifySource {
    /// Construct the backend. Failure here is fatal for the caller.
    pub fn new() -> Result<(Self, SourceStreams)> {
        let (sinks, streams) = source_channels();

        // Called synchronously on notify's own thread.
        let watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    for change in translate_event(&event) {
                        // Receiver gone means we are shutting down.
                        let _ = sinks.events.send(change);
                    }
                }
                Err(err) => {
                    let _ = sinks.errors.send(SourceError::from(err));
                }
            },
            Config::default(),
        )?;

        Ok((
            Self {
                inner: Some(watcher),
            },
            streams,
        ))
    }

    fn watcher(&mut self) -> Result<&mut RecommendedWatcher> {
        self.inner
            .as_mut()
            .ok_or_else(|| anyhow!("watch source already closed").into())
    }
}

impl WatchSource for NotifySource {
    fn add(&mut self, path: &Path) -> Result<()> {
        self.watcher()?.watch(path, RecursiveMode::NonRecursive)?;
        Ok(())
    }

    fn remove(&mut self, path: &Path) -> Result<()> {
        self.watcher()?.unwatch(path)?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        // Dropping the watcher stops the backend thread and closes the sinks.
        if self.inner.take().is_some() {
            debug!("notification source closed");
        }
        Ok(())
    }
}

/// Map one `notify` event onto zero or more [`ChangeEvent`]s.
///
/// Rename-to halves are reported as creates, so the new name gets walked
/// and fingerprinted like any other new path. Pure access events are
/// dropped.
pub fn translate_event(event: &Event) -> Vec<ChangeEvent> {
    let per_path = |kind: ChangeKind| -> Vec<ChangeEvent> {
        event
            .paths
            .iter()
            .map(|p| ChangeEvent::new(p.clone(), kind))
            .collect()
    };

    match event.kind {
        EventKind::Create(_) => per_path(ChangeKind::Create),
        EventKind::Remove(_) => per_path(ChangeKind::Remove),
        EventKind::Modify(ModifyKind::Name(mode)) => match mode {
            RenameMode::From => per_path(ChangeKind::Rename),
            RenameMode::To => per_path(ChangeKind::Create),
            RenameMode::Both => {
                let mut out = Vec::with_capacity(2);
                if let Some(from) = event.paths.first() {
                    out.push(ChangeEvent::new(from.clone(), ChangeKind::Rename));
                }
                if let Some(to) = event.paths.get(1) {
                    out.push(ChangeEvent::new(to.clone(), ChangeKind::Create));
                }
                out
            }
            // Backends that cannot tell the halves apart: decide by whether
            // the path still exists.
            RenameMode::Any | RenameMode::Other => event
                .paths
                .iter()
                .map(|p| {
                    let kind = if p.exists() {
                        ChangeKind::Create
                    } else {
                        ChangeKind::Rename
                    };
                    ChangeEvent::new(p.clone(), kind)
                })
                .collect(),
        },
        EventKind::Modify(_) | EventKind::Any | EventKind::Other => per_path(ChangeKind::Modify),
        EventKind::Access(_) => Vec::new(),
    }
}
