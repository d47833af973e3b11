#![allow(dead_code, unused_imports)]

pub use quietwatch_test_utils::builders;
pub use quietwatch_test_utils::fake_launcher::FakeLauncher;
pub use quietwatch_test_utils::fake_source::FakeSource;
pub use quietwatch_test_utils::{init_tracing, settle, with_timeout};

use std::path::Path;
use std::sync::Arc;

use quietwatch::fs::FileSystem;
use quietwatch::fs::mock::MockFileSystem;
use quietwatch::watch::{PathMatcher, WatchTree};

/// A tree over `fs` rooted at `.`, watched through a fake source.
pub fn mock_tree(fs: &MockFileSystem, ignore: &[&str]) -> WatchTree<FakeSource> {
    let (source, _sinks, _streams) = FakeSource::new();
    tree_with(Path::new("."), Arc::new(fs.clone()), ignore, source)
}

pub fn tree_with(
    root: &Path,
    fs: Arc<dyn FileSystem>,
    ignore: &[&str],
    source: FakeSource,
) -> WatchTree<FakeSource> {
    WatchTree::new(root, false, PathMatcher::new(ignore.iter().copied()), fs, source)
}
