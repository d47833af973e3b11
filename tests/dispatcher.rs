// tests/dispatcher.rs

mod common;
use crate::common::mock_tree;

use std::path::Path;
use std::sync::Arc;

use quietwatch::fs::mock::MockFileSystem;
use quietwatch::types::{ChangeEvent, ChangeKind};
use quietwatch::errors::Result;
use quietwatch::watch::{Dispatch, EventDispatcher, PathMatcher, Trigger, WatchSource, WatchTree};
use tokio::time::{advance, Duration, Instant};

use crate::common::FakeSource;

fn setup(quiet: Duration, ignore: &[&str]) -> (MockFileSystem, EventDispatcher<FakeSource>) {
    let fs = MockFileSystem::new();
    fs.add_file("./src/main.rs", b"fn main() {}");
    fs.add_file("./build/out.o", b"obj");
    fs.add_file("./.git/index", b"idx");

    let mut tree = mock_tree(&fs, ignore);
    tree.add(Path::new("."));
    (fs, EventDispatcher::new(tree, quiet))
}

fn modify(path: &str) -> ChangeEvent {
    ChangeEvent::new(path, ChangeKind::Modify)
}

#[tokio::test(start_paused = true)]
async fn identical_content_never_arms() {
    let (_fs, mut dispatcher) = setup(Duration::from_millis(50), &[]);

    let outcome = dispatcher.handle(modify("./src/main.rs"));

    assert!(matches!(outcome, Dispatch::Unchanged));
    assert!(!dispatcher.is_armed());
    assert_eq!(dispatcher.fire(), None);
}

#[tokio::test(start_paused = true)]
async fn content_change_arms_once_per_window() {
    let (fs, mut dispatcher) = setup(Duration::from_millis(50), &[]);
    let t0 = Instant::now();

    fs.add_file("./src/main.rs", b"fn main() { println!(); }");
    assert!(matches!(
        dispatcher.handle(modify("./src/main.rs")),
        Dispatch::Changed { armed: true }
    ));
    assert_eq!(dispatcher.deadline(), Some(t0 + Duration::from_millis(50)));

    // A later change inside the window does not move the deadline.
    advance(Duration::from_millis(30)).await;
    fs.add_file("./src/main.rs", b"fn main() { todo!() }");
    assert!(matches!(
        dispatcher.handle(modify("./src/main.rs")),
        Dispatch::Changed { armed: false }
    ));
    assert_eq!(dispatcher.deadline(), Some(t0 + Duration::from_millis(50)));

    assert_eq!(dispatcher.fire(), Some(Trigger));
    assert!(!dispatcher.is_armed());
    assert_eq!(dispatcher.fire(), None);
}

#[tokio::test(start_paused = true)]
async fn reverting_content_is_still_a_change() {
    let (fs, mut dispatcher) = setup(Duration::from_millis(5), &[]);

    fs.add_file("./src/main.rs", b"edited");
    dispatcher.handle(modify("./src/main.rs"));
    dispatcher.fire();

    fs.add_file("./src/main.rs", b"fn main() {}");
    assert!(matches!(
        dispatcher.handle(modify("./src/main.rs")),
        Dispatch::Changed { armed: true }
    ));
}

#[tokio::test(start_paused = true)]
async fn topology_events_do_not_arm() {
    let (fs, mut dispatcher) = setup(Duration::from_millis(50), &[]);

    fs.add_file("./src/new.rs", b"");
    let outcome = dispatcher.handle(ChangeEvent::new("./src/new.rs", ChangeKind::Create));
    match outcome {
        Dispatch::Added(report) => {
            assert_eq!(report.registered, vec![Path::new("./src/new.rs").to_path_buf()])
        }
        other => panic!("expected Added, got {other:?}"),
    }
    assert!(dispatcher.tree().cache().contains(Path::new("./src/new.rs")));
    assert!(dispatcher.tree().source().is_watched(Path::new("./src/new.rs")));
    assert!(!dispatcher.is_armed());

    fs.remove("./src/new.rs");
    assert!(matches!(
        dispatcher.handle(ChangeEvent::new("./src/new.rs", ChangeKind::Remove)),
        Dispatch::Removed
    ));
    assert!(matches!(
        dispatcher.handle(ChangeEvent::new("./src/main.rs", ChangeKind::Rename)),
        Dispatch::Removed
    ));
    assert!(!dispatcher.tree().cache().contains(Path::new("./src/main.rs")));
    assert!(!dispatcher.is_armed());
}

#[tokio::test(start_paused = true)]
async fn changes_under_ignored_paths_are_discarded() {
    let (fs, mut dispatcher) = setup(Duration::from_millis(50), &["/build"]);

    fs.add_file("./build/out.o", b"new obj");
    fs.add_file("./.git/index", b"new idx");

    assert!(matches!(dispatcher.handle(modify("./build/out.o")), Dispatch::Ignored));
    assert!(matches!(dispatcher.handle(modify("./.git/index")), Dispatch::Ignored));
    assert!(!dispatcher.is_armed());
}

#[tokio::test(start_paused = true)]
async fn unreadable_path_is_discarded() {
    let (_fs, mut dispatcher) = setup(Duration::from_millis(50), &[]);

    let outcome = dispatcher.handle(modify("./src/vanished.rs"));
    assert!(matches!(outcome, Dispatch::Unreadable(_)));
    assert!(!dispatcher.is_armed());
}

#[tokio::test(start_paused = true)]
async fn uncached_path_with_content_counts_as_change() {
    // Modify for a path the walk never saw (e.g. its create was missed).
    let (fs, mut dispatcher) = setup(Duration::from_millis(50), &[]);
    fs.add_file("./late.txt", b"hi");

    assert!(matches!(
        dispatcher.handle(modify("./late.txt")),
        Dispatch::Changed { armed: true }
    ));
}

/// A source with no `Debug` impl; the dispatcher and loop must not need one.
struct BareSource;

impl WatchSource for BareSource {
    fn add(&mut self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn remove(&mut self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn dispatcher_debug_does_not_require_debug_source() {
    let fs = MockFileSystem::new();
    let tree = WatchTree::new(
        ".",
        false,
        PathMatcher::new(Vec::<String>::new()),
        Arc::new(fs),
        BareSource,
    );
    let dispatcher = EventDispatcher::new(tree, Duration::from_millis(5));

    let rendered = format!("{dispatcher:?}");
    assert!(rendered.contains("EventDispatcher"));
    assert!(rendered.contains("quiet"));
}
