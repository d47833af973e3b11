// src/fs/mod.rs

//! Filesystem access used by the hasher and the tree walker.
//!
//! Everything that stats, lists or reads paths goes through [`FileSystem`] so
//! the fingerprint and walk logic can be exercised against [`mock`] in tests.

use std::fmt::Debug;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::types::EntryKind;

pub mod mock;

/// Result of a stat call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMeta {
    /// Kind of the entry after following symlinks.
    pub kind: EntryKind,
    /// Whether the path itself is a symbolic link.
    pub is_symlink: bool,
}

impl FileMeta {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

/// Abstract filesystem interface.
pub trait FileSystem: Send + Sync + Debug {
    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>>;

    /// Stat `path`, following symlinks for the reported kind.
    fn metadata(&self, path: &Path) -> Result<FileMeta>;

    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;

    /// Return the entries of a directory as full paths, in whatever order the
    /// platform listing produces them.
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        let file = fs::File::open(path).with_context(|| format!("opening file {:?}", path))?;
        Ok(Box::new(file))
    }

    fn metadata(&self, path: &Path) -> Result<FileMeta> {
        let link_meta =
            fs::symlink_metadata(path).with_context(|| format!("stat {:?}", path))?;
        let is_symlink = link_meta.file_type().is_symlink();
        let meta = if is_symlink {
            fs::metadata(path).with_context(|| format!("following symlink {:?}", path))?
        } else {
            link_meta
        };
        let kind = if meta.is_dir() {
            EntryKind::Dir
        } else {
            EntryKind::File
        };
        Ok(FileMeta { kind, is_symlink })
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        fs::canonicalize(path).with_context(|| format!("canonicalizing {:?}", path))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path).with_context(|| format!("reading dir {:?}", path))? {
            let entry = entry?;
            entries.push(entry.path());
        }
        Ok(entries)
    }
}
