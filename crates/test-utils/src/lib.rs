//! Shared helpers for quietwatch's integration tests.

pub mod builders;
pub mod fake_launcher;
pub mod fake_source;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use quietwatch::logging::LOG_ENV_VAR;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Install a test-writer subscriber once per test binary.
///
/// Output is captured and only shown for failing tests (or with
/// `-- --nocapture`). The filter is read from `QUIETWATCH_LOG`, falling back
/// to `RUST_LOG`, then `warn`:
/// `QUIETWATCH_LOG=quietwatch=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Fail the test if `f` takes more than five (real or paused) seconds.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    tokio::time::timeout(Duration::from_secs(5), f)
        .await
        .expect("test timed out after 5 seconds")
}

/// Let every spawned task run until it blocks.
///
/// Meant for `start_paused` tests: paused time only auto-advances once the
/// runtime is idle, so the 1ms sleep returns after everything else settled.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
