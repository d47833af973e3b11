// src/watch/deadline.rs

//! The quiet-window deadline.

use std::time::Duration;

use tokio::time::Instant;

/// A cancellable, one-shot deadline.
///
/// Arming an already-armed deadline is a no-op: the first genuine change
/// since the last trigger fixes when the next trigger fires.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuietDeadline {
    at: Option<Instant>,
}

impl QuietDeadline {
    pub fn new() -> Self {
        Self { at: None }
    }

    /// Arm the deadline `duration` from now unless it is already armed.
    /// Returns `true` if this call armed it.
    pub fn arm(&mut self, duration: Duration) -> bool {
        self.arm_at(Instant::now() + duration)
    }

    /// Arm at an explicit instant unless already armed.
    pub fn arm_at(&mut self, at: Instant) -> bool {
        if self.at.is_some() {
            return false;
        }
        self.at = Some(at);
        true
    }

    pub fn is_armed(&self) -> bool {
        self.at.is_some()
    }

    pub fn clear(&mut self) {
        self.at = None;
    }

    /// When the deadline fires, if armed.
    pub fn at(&self) -> Option<Instant> {
        self.at
    }
}

/// Sleep until `at`, or forever when `None`.
///
/// Takes the instant by value so a `select!` branch does not have to borrow
/// the deadline while other branches mutate it.
pub async fn expired(at: Option<Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending::<()>().await,
    }
}
