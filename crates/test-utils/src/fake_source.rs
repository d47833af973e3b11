use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use quietwatch::errors::Result;
use quietwatch::watch::source::{source_channels, SourceSinks, SourceStreams, WatchSource};

/// Notification source that records registrations and lets the test push
/// events and errors by hand through the returned [`SourceSinks`].
#[derive(Debug, Clone, Default)]
pub struct FakeSource {
    added: Arc<Mutex<Vec<PathBuf>>>,
    removed: Arc<Mutex<Vec<PathBuf>>>,
    refuse: Arc<Mutex<HashSet<PathBuf>>>,
    closed: Arc<Mutex<bool>>,
}

impl FakeSource {
    pub fn new() -> (Self, SourceSinks, SourceStreams) {
        let (sinks, streams) = source_channels();
        (Self::default(), sinks, streams)
    }

    /// Make `add` fail for this exact path.
    pub fn refuse(&self, path: impl Into<PathBuf>) {
        self.refuse.lock().unwrap().insert(path.into());
    }

    pub fn added(&self) -> Vec<PathBuf> {
        self.added.lock().unwrap().clone()
    }

    pub fn removed(&self) -> Vec<PathBuf> {
        self.removed.lock().unwrap().clone()
    }

    pub fn is_watched(&self, path: &Path) -> bool {
        self.added.lock().unwrap().iter().any(|p| p == path)
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.lock().unwrap()
    }
}

impl WatchSource for FakeSource {
    fn add(&mut self, path: &Path) -> Result<()> {
        if self.refuse.lock().unwrap().contains(path) {
            return Err(anyhow!("refusing to watch {:?}", path).into());
        }
        self.added.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }

    fn remove(&mut self, path: &Path) -> Result<()> {
        self.removed.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        *self.closed.lock().unwrap() = true;
        Ok(())
    }
}
