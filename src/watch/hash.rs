// src/watch/hash.rs

//! Content fingerprints used to tell real changes from spurious
//! notifications.

use std::fmt;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use blake3::Hasher;

use crate::fs::FileSystem;
use crate::types::EntryKind;

/// Opaque digest of a file's bytes or a directory's entry names.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; blake3::OUT_LEN]);

impl Fingerprint {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        blake3::Hash::from(self.0).to_hex().to_string()
    }
}

impl From<blake3::Hash> for Fingerprint {
    fn from(hash: blake3::Hash) -> Self {
        Fingerprint(*hash.as_bytes())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = self.to_hex();
        write!(f, "Fingerprint({})", &hex[..12])
    }
}

/// Fingerprint `path`, dispatching on whether it is a file or a directory.
///
/// Fails when the path cannot be stat'ed, opened or listed; callers treat
/// that as "skip this entry".
pub fn fingerprint(fs: &dyn FileSystem, path: &Path) -> Result<Fingerprint> {
    let meta = fs
        .metadata(path)
        .with_context(|| format!("failed to stat {:?} for hashing", path))?;

    match meta.kind {
        EntryKind::Dir => fingerprint_dir(fs, path),
        EntryKind::File => fingerprint_file(fs, path),
    }
}

/// Digest of the complete byte stream of a file.
pub fn fingerprint_file(fs: &dyn FileSystem, path: &Path) -> Result<Fingerprint> {
    let mut hasher = Hasher::new();
    let mut reader = fs
        .open_read(path)
        .with_context(|| format!("failed to open {:?} for hashing", path))?;
    let mut buf = [0u8; 8192];
    loop {
        let n = reader
            .read(&mut buf)
            .with_context(|| format!("failed to hash {:?}", path))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().into())
}

/// Digest over the immediate entry names of a directory.
///
/// Names are sorted first so the result does not depend on the order the
/// platform happens to list them in. Nested contents are not included.
pub fn fingerprint_dir(fs: &dyn FileSystem, path: &Path) -> Result<Fingerprint> {
    let entries = fs
        .read_dir(path)
        .with_context(|| format!("failed to read dir contents from {:?}", path))?;

    let mut names: Vec<_> = entries
        .iter()
        .filter_map(|p| p.file_name().map(|n| n.to_os_string()))
        .collect();
    names.sort();

    let mut hasher = Hasher::new();
    for name in &names {
        hasher.update(name.as_encoded_bytes());
    }
    Ok(hasher.finalize().into())
}
