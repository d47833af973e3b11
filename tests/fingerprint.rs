// tests/fingerprint.rs

use std::path::Path;

use quietwatch::fs::mock::MockFileSystem;
use quietwatch::types::EntryKind;
use quietwatch::watch::hash::{fingerprint, fingerprint_dir};
use quietwatch::watch::FingerprintCache;

#[test]
fn file_fingerprint_is_blake3_of_content() {
    let fs = MockFileSystem::new();
    fs.add_file("./test.txt", b"hello world");

    let fp = fingerprint(&fs, Path::new("./test.txt")).unwrap();
    // blake3 hash of "hello world"
    assert_eq!(
        fp.to_hex(),
        "d74981efa70a0c880b8d8c1985d075dbcbf679b99a5f9914e5aaf96b831a9e24"
    );
}

#[test]
fn file_fingerprint_tracks_content_only() {
    let fs = MockFileSystem::new();
    fs.add_file("./a.txt", b"same");
    fs.add_file("./b.txt", b"same");

    let a = fingerprint(&fs, Path::new("./a.txt")).unwrap();
    let b = fingerprint(&fs, Path::new("./b.txt")).unwrap();
    assert_eq!(a, b);

    fs.add_file("./a.txt", b"different");
    let a2 = fingerprint(&fs, Path::new("./a.txt")).unwrap();
    assert_ne!(a, a2);
}

#[test]
fn large_file_is_hashed_across_chunks() {
    let fs = MockFileSystem::new();
    let mut content = vec![b'x'; 20_000];
    fs.add_file("./big.bin", content.clone());
    let before = fingerprint(&fs, Path::new("./big.bin")).unwrap();

    // Change a byte past the first read buffer.
    content[19_999] = b'y';
    fs.add_file("./big.bin", content.clone());
    let after = fingerprint(&fs, Path::new("./big.bin")).unwrap();

    assert_ne!(before, after);
    assert_eq!(after.as_bytes(), blake3::hash(&content).as_bytes());
}

#[test]
fn dir_fingerprint_ignores_listing_order() {
    let first = MockFileSystem::new();
    first.add_file("./d/a", b"");
    first.add_file("./d/b", b"");

    let second = MockFileSystem::new();
    second.add_file("./d/b", b"");
    second.add_file("./d/a", b"");

    assert_eq!(
        fingerprint_dir(&first, Path::new("./d")).unwrap(),
        fingerprint_dir(&second, Path::new("./d")).unwrap()
    );
}

#[test]
fn dir_fingerprint_tracks_names_not_contents() {
    let fs = MockFileSystem::new();
    fs.add_file("./d/a", b"one");
    let before = fingerprint(&fs, Path::new("./d")).unwrap();

    fs.add_file("./d/a", b"two");
    assert_eq!(before, fingerprint(&fs, Path::new("./d")).unwrap());

    fs.add_file("./d/b", b"");
    let with_b = fingerprint(&fs, Path::new("./d")).unwrap();
    assert_ne!(before, with_b);

    fs.remove("./d/b");
    assert_eq!(before, fingerprint(&fs, Path::new("./d")).unwrap());
}

#[test]
fn missing_path_cannot_be_fingerprinted() {
    let fs = MockFileSystem::new();
    assert!(fingerprint(&fs, Path::new("./nope")).is_err());
}

#[test]
fn cache_refresh_reports_changes_only() {
    let fs = MockFileSystem::new();
    fs.add_file("./f", b"v1");
    let path = Path::new("./f");
    let v1 = fingerprint(&fs, path).unwrap();

    let mut cache = FingerprintCache::new();
    assert!(cache.refresh(path, EntryKind::File, v1), "unknown path counts as changed");
    assert!(!cache.refresh(path, EntryKind::File, v1));

    fs.add_file("./f", b"v2");
    let v2 = fingerprint(&fs, path).unwrap();
    assert!(cache.refresh(path, EntryKind::File, v2));
    assert_eq!(cache.fingerprint_of(path), Some(v2));
}

#[test]
fn cache_evict_leaves_descendants() {
    let fs = MockFileSystem::new();
    fs.add_file("./d/f", b"x");

    let mut cache = FingerprintCache::new();
    for p in ["./d", "./d/f"] {
        let fp = fingerprint(&fs, Path::new(p)).unwrap();
        let kind = if p == "./d" { EntryKind::Dir } else { EntryKind::File };
        cache.store(Path::new(p), kind, fp);
    }

    assert!(cache.evict(Path::new("./d")).is_some());
    assert!(!cache.contains(Path::new("./d")));
    assert!(cache.contains(Path::new("./d/f")));
    assert!(cache.evict(Path::new("./d")).is_none());
}
