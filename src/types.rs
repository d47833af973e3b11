use std::path::PathBuf;

/// What to do when a trigger arrives while the command is still running.
///
/// - `Restart`: kill the running process and start a fresh one. This is
///   `--kill`, the default. Runs never overlap and the latest change always
///   gets a run.
/// - `Skip`: leave the running process alone and drop the trigger
///   (`--kill=false`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapPolicy {
    Restart,
    Skip,
}

impl OverlapPolicy {
    /// Map the boolean `--kill` flag onto a policy.
    pub fn from_kill_flag(kill: bool) -> Self {
        if kill {
            OverlapPolicy::Restart
        } else {
            OverlapPolicy::Skip
        }
    }
}

/// Whether a watched entry is a directory or something we treat as a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

/// Kind of raw change reported by the notification source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Create,
    Remove,
    Rename,
    /// Content or attribute change.
    Modify,
}

/// A single raw notification, consumed once by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}
