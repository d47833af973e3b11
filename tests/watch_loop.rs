// tests/watch_loop.rs

mod common;
use crate::common::{init_tracing, settle, FakeLauncher, FakeSource};

use std::path::Path;
use std::sync::Arc;

use quietwatch::engine::controller::{DIE_EXIT_ERROR, DIE_EXIT_EVENT};
use quietwatch::engine::{run_die_mode, run_loop_mode, OverlapPolicy, RunnerSettings};
use quietwatch::fs::mock::MockFileSystem;
use quietwatch::types::{ChangeEvent, ChangeKind};
use quietwatch::watch::source::SourceSinks;
use quietwatch::watch::{EventDispatcher, PathMatcher, SourceError, SourceStreams, WatchTree};
use tokio::sync::oneshot;
use tokio::time::{sleep, Duration, Instant};

struct Harness {
    fs: MockFileSystem,
    source: FakeSource,
    sinks: SourceSinks,
    streams: SourceStreams,
    tree: WatchTree<FakeSource>,
}

fn harness() -> Harness {
    let fs = MockFileSystem::new();
    fs.add_file("./src/main.rs", b"fn main() {}");
    fs.add_file("./notes.txt", b"todo");

    let (source, sinks, streams) = FakeSource::new();
    let tree = WatchTree::new(
        ".",
        false,
        PathMatcher::new(Vec::<String>::new()),
        Arc::new(fs.clone()),
        source.clone(),
    );
    Harness {
        fs,
        source,
        sinks,
        streams,
        tree,
    }
}

fn settings(initial_run: bool) -> RunnerSettings {
    RunnerSettings {
        argv: vec!["true".to_string()],
        policy: OverlapPolicy::Restart,
        initial_run,
        clear_screen: false,
        timeout: None,
    }
}

fn edit(fs: &MockFileSystem, sinks: &SourceSinks, path: &str, content: &str) {
    fs.add_file(path, content.as_bytes().to_vec());
    sinks
        .events
        .send(ChangeEvent::new(path, ChangeKind::Modify))
        .unwrap();
}

#[tokio::test(start_paused = true)]
async fn burst_of_changes_yields_one_run_at_window_end() {
    init_tracing();
    let Harness {
        fs,
        source,
        sinks,
        streams,
        tree,
    } = harness();
    let launcher = FakeLauncher::new();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let dispatcher = EventDispatcher::new(tree, Duration::from_millis(50));
    let watch = run_loop_mode(dispatcher, streams, settings(false), launcher.clone(), async {
        let _ = stop_rx.await;
    });

    let script = async {
        settle().await;
        let t0 = Instant::now();

        edit(&fs, &sinks, "./src/main.rs", "fn main() { a() }");
        sleep(Duration::from_millis(30)).await;
        edit(&fs, &sinks, "./src/main.rs", "fn main() { b() }");
        sleep(Duration::from_millis(100)).await;

        assert_eq!(launcher.started(), vec![1]);
        assert_eq!(launcher.start_times(), vec![t0 + Duration::from_millis(50)]);
        let _ = stop_tx.send(());
    };

    let (res, ()) = tokio::join!(watch, script);
    res.unwrap();
    assert!(source.is_closed());
}

#[tokio::test(start_paused = true)]
async fn spurious_notifications_never_run_the_command() {
    let h = harness();
    let launcher = FakeLauncher::new();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let sinks = h.sinks.clone();

    let dispatcher = EventDispatcher::new(h.tree, Duration::from_millis(10));
    let watch = run_loop_mode(dispatcher, h.streams, settings(false), launcher.clone(), async {
        let _ = stop_rx.await;
    });

    let script = async {
        settle().await;
        for _ in 0..5 {
            sinks
                .events
                .send(ChangeEvent::new("./src/main.rs", ChangeKind::Modify))
                .unwrap();
            sleep(Duration::from_millis(20)).await;
        }
        assert!(launcher.started().is_empty());
        let _ = stop_tx.send(());
    };

    let (res, ()) = tokio::join!(watch, script);
    res.unwrap();
}

#[tokio::test(start_paused = true)]
async fn source_errors_do_not_stop_the_loop() {
    let h = harness();
    let launcher = FakeLauncher::new();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let fs = h.fs.clone();
    let sinks = h.sinks.clone();

    let dispatcher = EventDispatcher::new(h.tree, Duration::from_millis(10));
    let watch = run_loop_mode(dispatcher, h.streams, settings(true), launcher.clone(), async {
        let _ = stop_rx.await;
    });

    let script = async {
        settle().await;
        assert_eq!(launcher.started(), vec![1]);

        sinks.errors.send(SourceError::new("queue overflow")).unwrap();
        sleep(Duration::from_millis(5)).await;

        fs.add_file("./notes.txt", b"changed".to_vec());
        sinks
            .events
            .send(ChangeEvent::new("./notes.txt", ChangeKind::Modify))
            .unwrap();
        sleep(Duration::from_millis(50)).await;

        assert_eq!(launcher.started(), vec![1, 2]);
        assert_eq!(launcher.killed(), vec![1]);
        let _ = stop_tx.send(());
    };

    let (res, ()) = tokio::join!(watch, script);
    res.unwrap();
}

#[tokio::test(start_paused = true)]
async fn runner_start_failure_ends_loop_mode() {
    let h = harness();
    let launcher = FakeLauncher::new();
    launcher.fail_starts();

    let dispatcher = EventDispatcher::new(h.tree, Duration::from_millis(10));
    let res = run_loop_mode(
        dispatcher,
        h.streams,
        settings(true),
        launcher,
        std::future::pending::<()>(),
    )
    .await;

    assert!(res.is_err());
}

#[tokio::test(start_paused = true)]
async fn die_mode_exits_zero_on_first_event() {
    let mut h = harness();
    h.sinks
        .events
        .send(ChangeEvent::new("./notes.txt", ChangeKind::Create))
        .unwrap();

    let code = run_die_mode(&mut h.tree, &mut h.streams).await;

    assert_eq!(code, DIE_EXIT_EVENT);
    assert!(h.source.is_watched(Path::new("./src/main.rs")));
    assert!(h.source.is_closed());
}

#[tokio::test(start_paused = true)]
async fn die_mode_exits_one_on_error() {
    let mut h = harness();
    h.sinks.errors.send(SourceError::new("watch limit reached")).unwrap();

    let code = run_die_mode(&mut h.tree, &mut h.streams).await;
    assert_eq!(code, DIE_EXIT_ERROR);
}

#[tokio::test(start_paused = true)]
async fn die_mode_does_not_run_anything_or_debounce() {
    // Even an unchanged-content notification ends die mode immediately.
    let mut h = harness();
    let start = Instant::now();
    h.sinks
        .events
        .send(ChangeEvent::new("./src/main.rs", ChangeKind::Modify))
        .unwrap();

    let code = run_die_mode(&mut h.tree, &mut h.streams).await;
    assert_eq!(code, DIE_EXIT_EVENT);
    assert_eq!(Instant::now(), start);
}
