// src/watch/matcher.rs

//! Ignore rules for the watch tree.
//!
//! Two kinds of pattern are supported, both evaluated against the path
//! relative to the watch root (forward slashes, no leading slash):
//!
//! - root-anchored: `/target` matches exactly `target` and nothing else.
//! - suffix: `node_modules` matches any relative path ending in
//!   `node_modules`, at any depth (`a/b/node_modules`, but also
//!   `my_node_modules`).
//!
//! A matched directory hides its whole subtree, because the walker never
//! descends into it.

use std::path::Path;

use crate::watch::path_utils::relative_str;

/// Version-control metadata directory that is always ignored.
pub const GIT_DIR: &str = ".git";

/// Patterns that are appended to every user-supplied ignore list.
pub const GLOBALLY_IGNORED: &[&str] = &[GIT_DIR];

/// Compiled ignore rules for one watch root.
#[derive(Debug, Clone)]
pub struct PathMatcher {
    patterns: Vec<IgnorePattern>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum IgnorePattern {
    Anchored(String),
    Suffix(String),
}

impl IgnorePattern {
    fn parse(raw: &str) -> Self {
        match raw.strip_prefix('/') {
            Some(anchored) => IgnorePattern::Anchored(anchored.to_string()),
            None => IgnorePattern::Suffix(raw.to_string()),
        }
    }

    fn matches(&self, rel: &str) -> bool {
        match self {
            IgnorePattern::Anchored(p) => rel == p,
            IgnorePattern::Suffix(p) => rel.ends_with(p.as_str()),
        }
    }
}

impl PathMatcher {
    /// Build a matcher from user patterns. The built-in patterns are added
    /// unless already present.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut compiled: Vec<IgnorePattern> = patterns
            .into_iter()
            .map(|p| IgnorePattern::parse(p.as_ref()))
            .collect();

        for builtin in GLOBALLY_IGNORED {
            let pat = IgnorePattern::parse(builtin);
            if !compiled.contains(&pat) {
                compiled.push(pat);
            }
        }

        Self { patterns: compiled }
    }

    /// Decide whether `path` is excluded from watching.
    ///
    /// The root itself is never ignored, and neither is a path that cannot
    /// be related to `root`.
    pub fn is_ignored(&self, path: &Path, root: &Path) -> bool {
        match relative_str(root, path) {
            Some(rel) => self.is_ignored_rel(&rel),
            None => false,
        }
    }

    /// Same as [`is_ignored`](Self::is_ignored) for an already-relativized
    /// path.
    pub fn is_ignored_rel(&self, rel: &str) -> bool {
        if rel.is_empty() {
            return false;
        }
        self.patterns.iter().any(|p| p.matches(rel))
    }

    /// Is `path` ignored itself, or does it live beneath an ignored
    /// directory?
    ///
    /// Used for raw events, whose paths may point anywhere inside a pruned
    /// subtree.
    pub fn is_ignored_or_under(&self, path: &Path, root: &Path) -> bool {
        let Some(rel) = relative_str(root, path) else {
            return false;
        };
        let mut prefix = String::with_capacity(rel.len());
        for (i, part) in rel.split('/').enumerate() {
            if i > 0 {
                prefix.push('/');
            }
            prefix.push_str(part);
            if self.is_ignored_rel(&prefix) {
                return true;
            }
        }
        false
    }
}

/// Free-function form of [`PathMatcher::is_ignored`].
pub fn is_ignored<S: AsRef<str>>(path: &Path, root: &Path, patterns: &[S]) -> bool {
    PathMatcher::new(patterns.iter().map(|p| p.as_ref())).is_ignored(path, root)
}
