// src/watch/cache.rs

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::types::EntryKind;
use crate::watch::hash::Fingerprint;

/// One observed, non-ignored path under the watch root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEntry {
    pub path: PathBuf,
    pub kind: EntryKind,
    pub fingerprint: Fingerprint,
}

/// Fingerprint cache keyed by path.
///
/// Owned by the [`WatchTree`](crate::watch::tree::WatchTree); nothing else
/// mutates it.
#[derive(Debug, Default)]
pub struct FingerprintCache {
    entries: HashMap<PathBuf, WatchEntry>,
}

impl FingerprintCache {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, path: &Path) -> Option<&WatchEntry> {
        self.entries.get(path)
    }

    pub fn fingerprint_of(&self, path: &Path) -> Option<Fingerprint> {
        self.entries.get(path).map(|e| e.fingerprint)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or overwrite the entry for `path`.
    pub fn store(&mut self, path: &Path, kind: EntryKind, fingerprint: Fingerprint) {
        self.entries.insert(
            path.to_path_buf(),
            WatchEntry {
                path: path.to_path_buf(),
                kind,
                fingerprint,
            },
        );
    }

    /// Replace the fingerprint of `path` if it changed.
    ///
    /// Returns `true` when the new fingerprint differs from the cached one
    /// (including when nothing was cached). The entry kind is kept, or taken
    /// from `kind` for a previously unknown path.
    pub fn refresh(&mut self, path: &Path, kind: EntryKind, fingerprint: Fingerprint) -> bool {
        match self.entries.get_mut(path) {
            Some(entry) if entry.fingerprint == fingerprint => false,
            Some(entry) => {
                entry.fingerprint = fingerprint;
                true
            }
            None => {
                self.store(path, kind, fingerprint);
                true
            }
        }
    }

    /// Drop the entry for exactly `path`. Descendants are left alone.
    pub fn evict(&mut self, path: &Path) -> Option<WatchEntry> {
        let removed = self.entries.remove(path);
        if removed.is_some() {
            debug!("evicted cached fingerprint for {:?}", path);
        }
        removed
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.keys().map(|p| p.as_path())
    }
}
