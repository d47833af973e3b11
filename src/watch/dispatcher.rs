// src/watch/dispatcher.rs

//! Turns raw change events into at most one trigger per quiet window.
//!
//! - Create: walk and seed fingerprints for the new path.
//! - Remove / Rename: drop the watch.
//! - Modify: re-fingerprint; only a real content change arms the deadline.
//!
//! Topology events never arm the deadline on their own.

use std::fmt;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, trace};

use crate::types::{ChangeEvent, ChangeKind};
use crate::watch::deadline::QuietDeadline;
use crate::watch::source::WatchSource;
use crate::watch::tree::{WalkReport, WatchTree};

/// What handling one event amounted to.
#[derive(Debug, Clone)]
pub enum Dispatch {
    /// A create event was walked into the tree.
    Added(WalkReport),
    /// A remove or rename dropped the watch.
    Removed,
    /// The path is ignored; nothing happened.
    Ignored,
    /// The path could not be fingerprinted; the event was discarded.
    Unreadable(String),
    /// Fingerprint matched the cache; spurious notification.
    Unchanged,
    /// Genuine content change. `armed` is true if this change opened a new
    /// quiet window.
    Changed { armed: bool },
}

/// Single coalesced signal sent to the command runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigger;

/// Event dispatcher plus debouncer for one watch tree.
pub struct EventDispatcher<S: WatchSource> {
    tree: WatchTree<S>,
    deadline: QuietDeadline,
    quiet: Duration,
}

impl<S: WatchSource> fmt::Debug for EventDispatcher<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("tree", &self.tree)
            .field("deadline", &self.deadline)
            .field("quiet", &self.quiet)
            .finish()
    }
}

impl<S: WatchSource> EventDispatcher<S> {
    pub fn new(tree: WatchTree<S>, quiet: Duration) -> Self {
        Self {
            tree,
            deadline: QuietDeadline::new(),
            quiet,
        }
    }

    pub fn tree(&self) -> &WatchTree<S> {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut WatchTree<S> {
        &mut self.tree
    }

    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    /// When the pending trigger fires, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline.at()
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_armed()
    }

    /// Apply one raw event.
    pub fn handle(&mut self, event: ChangeEvent) -> Dispatch {
        trace!(?event, "dispatching change event");

        match event.kind {
            ChangeKind::Create => Dispatch::Added(self.tree.add(&event.path)),
            ChangeKind::Remove | ChangeKind::Rename => {
                self.tree.remove(&event.path);
                Dispatch::Removed
            }
            ChangeKind::Modify => self.handle_modify(event),
        }
    }

    fn handle_modify(&mut self, event: ChangeEvent) -> Dispatch {
        if self.tree.is_ignored(&event.path) {
            trace!(path = ?event.path, "modify under ignored path; discarding");
            return Dispatch::Ignored;
        }

        let (kind, fp) = match self.tree.fingerprint(&event.path) {
            Ok(res) => res,
            Err(err) => {
                debug!(path = ?event.path, error = %err, "could not fingerprint; discarding event");
                return Dispatch::Unreadable(err.to_string());
            }
        };

        if !self.tree.refresh(&event.path, kind, fp) {
            debug!(path = ?event.path, "fingerprint unchanged; discarding spurious event");
            return Dispatch::Unchanged;
        }

        let armed = self.deadline.arm(self.quiet);
        if armed {
            debug!(path = ?event.path, quiet = ?self.quiet, "content changed; quiet window armed");
        } else {
            debug!(path = ?event.path, "content changed; quiet window already pending");
        }
        Dispatch::Changed { armed }
    }

    /// Consume the pending deadline. Returns the trigger to forward, or
    /// `None` if nothing was armed.
    pub fn fire(&mut self) -> Option<Trigger> {
        if !self.deadline.is_armed() {
            return None;
        }
        self.deadline.clear();
        debug!("quiet window elapsed; emitting trigger");
        Some(Trigger)
    }

    /// Close the underlying source.
    pub fn close(&mut self) {
        self.tree.close();
    }
}
