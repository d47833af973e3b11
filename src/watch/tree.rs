// src/watch/tree.rs

//! Recursive watch registration plus the fingerprint cache.
//!
//! The walk is synchronous and depth-first. Nothing in it is fatal: an entry
//! that cannot be stat'ed or hashed is recorded in the [`WalkReport`] and
//! skipped, and a watch that cannot be registered only costs coverage.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::fs::{FileMeta, FileSystem};
use crate::types::EntryKind;
use crate::watch::cache::FingerprintCache;
use crate::watch::hash::{fingerprint, Fingerprint};
use crate::watch::matcher::PathMatcher;
use crate::watch::source::WatchSource;

/// Where in the walk an entry failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkStage {
    Stat,
    Hash,
    List,
    Watch,
}

/// A soft failure encountered while walking.
#[derive(Debug, Clone)]
pub struct WalkFailure {
    pub path: PathBuf,
    pub stage: WalkStage,
    pub error: String,
}

/// Outcome of [`WatchTree::add`].
#[derive(Debug, Clone, Default)]
pub struct WalkReport {
    /// Entries that were fingerprinted and cached, in walk order.
    pub registered: Vec<PathBuf>,
    /// Ignored paths whose subtree was skipped.
    pub pruned: Vec<PathBuf>,
    pub failures: Vec<WalkFailure>,
}

impl WalkReport {
    fn fail(&mut self, path: &Path, stage: WalkStage, error: impl fmt::Display) {
        self.failures.push(WalkFailure {
            path: path.to_path_buf(),
            stage,
            error: error.to_string(),
        });
    }
}

/// Watch set and fingerprint cache for one root.
pub struct WatchTree<S: WatchSource> {
    root: PathBuf,
    follow_symlinks: bool,
    matcher: PathMatcher,
    fs: Arc<dyn FileSystem>,
    source: S,
    cache: FingerprintCache,
}

impl<S: WatchSource> fmt::Debug for WatchTree<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchTree")
            .field("root", &self.root)
            .field("follow_symlinks", &self.follow_symlinks)
            .field("cached", &self.cache.len())
            .finish_non_exhaustive()
    }
}

impl<S: WatchSource> WatchTree<S> {
    pub fn new(
        root: impl Into<PathBuf>,
        follow_symlinks: bool,
        matcher: PathMatcher,
        fs: Arc<dyn FileSystem>,
        source: S,
    ) -> Self {
        Self {
            root: root.into(),
            follow_symlinks,
            matcher,
            fs,
            source,
            cache: FingerprintCache::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn matcher(&self) -> &PathMatcher {
        &self.matcher
    }

    pub fn cache(&self) -> &FingerprintCache {
        &self.cache
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Is `path` (or one of its ancestors below the root) ignored?
    pub fn is_ignored(&self, path: &Path) -> bool {
        self.matcher.is_ignored_or_under(path, &self.root)
    }

    /// Fingerprint `path` with this tree's filesystem.
    pub fn fingerprint(&self, path: &Path) -> anyhow::Result<(EntryKind, Fingerprint)> {
        let meta = self.fs.metadata(path)?;
        let fp = fingerprint(self.fs.as_ref(), path)?;
        Ok((meta.kind, fp))
    }

    /// Record a freshly computed fingerprint. Returns `true` if it differs
    /// from what was cached.
    pub fn refresh(&mut self, path: &Path, kind: EntryKind, fp: Fingerprint) -> bool {
        self.cache.refresh(path, kind, fp)
    }

    /// Register `path` and, for a directory, everything beneath it that is
    /// not ignored.
    pub fn add(&mut self, path: &Path) -> WalkReport {
        let mut report = WalkReport::default();

        // Create events can point inside a pruned subtree.
        if self.is_ignored(path) {
            debug!(?path, "path is ignored; not watching");
            report.pruned.push(path.to_path_buf());
            return report;
        }

        let meta = match self.fs.metadata(path) {
            Ok(meta) => meta,
            Err(err) => {
                warn!(?path, error = %err, "could not stat path; skipping");
                report.fail(path, WalkStage::Stat, err);
                return report;
            }
        };

        let mut visited: HashSet<PathBuf> = HashSet::new();
        let mut stack: Vec<(PathBuf, FileMeta)> = vec![(path.to_path_buf(), meta)];

        while let Some((current, meta)) = stack.pop() {
            if !self.register(&current, meta, &mut report) {
                continue;
            }

            if !meta.is_dir() || !self.should_descend(&current, meta, &mut visited) {
                continue;
            }

            let mut children = match self.fs.read_dir(&current) {
                Ok(children) => children,
                Err(err) => {
                    warn!(path = ?current, error = %err, "could not list directory; skipping subtree");
                    report.fail(&current, WalkStage::List, err);
                    continue;
                }
            };
            // Reverse-sorted so the stack pops them in name order.
            children.sort();
            children.reverse();

            for child in children {
                if self.matcher.is_ignored(&child, &self.root) {
                    debug!(path = ?child, "ignored; pruning subtree");
                    report.pruned.push(child);
                    continue;
                }
                match self.fs.metadata(&child) {
                    Ok(child_meta) => stack.push((child, child_meta)),
                    Err(err) => {
                        debug!(path = ?child, error = %err, "could not stat entry; skipping");
                        report.fail(&child, WalkStage::Stat, err);
                    }
                }
            }
        }

        debug!(
            ?path,
            registered = report.registered.len(),
            pruned = report.pruned.len(),
            failures = report.failures.len(),
            "watch registration pass finished"
        );
        report
    }

    /// Deregister the watch for `path` and drop its own cache entry.
    ///
    /// Cached fingerprints of former descendants are not touched; a later
    /// create event for the same paths re-seeds them.
    pub fn remove(&mut self, path: &Path) {
        if let Err(err) = self.source.remove(path) {
            debug!(?path, error = %err, "failed to remove watch; ignoring");
        }
        self.cache.evict(path);
    }

    /// Close the underlying notification source.
    pub fn close(&mut self) {
        if let Err(err) = self.source.close() {
            warn!(error = %err, "failed to close watch source");
        }
    }

    /// Fingerprint, cache and watch one entry. Returns `false` if the entry
    /// had to be skipped.
    fn register(&mut self, path: &Path, meta: FileMeta, report: &mut WalkReport) -> bool {
        let fp = match fingerprint(self.fs.as_ref(), path) {
            Ok(fp) => fp,
            Err(err) => {
                debug!(?path, error = %err, "could not fingerprint entry; skipping");
                report.fail(path, WalkStage::Hash, err);
                return false;
            }
        };
        self.cache.store(path, meta.kind, fp);

        if let Err(err) = self.source.add(path) {
            // Advisory only: we lose notifications for this path, nothing more.
            warn!(?path, error = %err, "failed to register watch");
            report.fail(path, WalkStage::Watch, err);
        }

        report.registered.push(path.to_path_buf());
        true
    }

    fn should_descend(&self, dir: &Path, meta: FileMeta, visited: &mut HashSet<PathBuf>) -> bool {
        if meta.is_symlink && !self.follow_symlinks {
            debug!(path = ?dir, "not following symlinked directory");
            return false;
        }
        if !self.follow_symlinks {
            return true;
        }
        // With symlinks followed, the same directory can be reached twice.
        match self.fs.canonicalize(dir) {
            Ok(canon) => visited.insert(canon),
            Err(_) => true,
        }
    }
}
