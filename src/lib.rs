// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod types;
pub mod watch;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{resolve, WatchConfig};
use crate::engine::{run_die_mode, run_loop_mode, RunnerSettings};
use crate::errors::Result;
use crate::exec::ProcessLauncher;
use crate::fs::{FileSystem, RealFileSystem};
use crate::watch::{EventDispatcher, NotifySource, PathMatcher, WatchTree};

/// High-level entry point used by `main.rs`. Returns the process exit code.
///
/// This wires together:
/// - config resolution (file + CLI)
/// - the notification source and watch tree
/// - die mode, or the dispatcher + command runner loop
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<i32> {
    let cfg = resolve(args.config.as_deref(), args.to_raw_config())?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(0);
    }

    let (source, mut streams) = NotifySource::new()?;
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let mut tree = WatchTree::new(
        cfg.root(),
        cfg.follow_symlinks(),
        PathMatcher::new(cfg.ignore()),
        fs,
        source,
    );

    if cfg.die() {
        if !cfg.command().is_empty() {
            debug!("command is ignored in die mode");
        }
        return Ok(run_die_mode(&mut tree, &mut streams).await);
    }

    let dispatcher = EventDispatcher::new(tree, cfg.quiet());
    let launcher = ProcessLauncher::new(cfg.shell());

    run_loop_mode(
        dispatcher,
        streams,
        RunnerSettings::from_config(&cfg),
        launcher,
        ctrl_c(),
    )
    .await?;

    info!("quietwatch exiting");
    Ok(0)
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

/// Dry-run output: the fully resolved configuration.
fn print_dry_run(cfg: &WatchConfig) {
    println!("quietwatch dry-run");
    println!("  root = {}", cfg.root().display());
    println!("  follow_symlinks = {}", cfg.follow_symlinks());
    println!("  die = {}", cfg.die());

    if !cfg.die() {
        println!("  quiet = {:?}", cfg.quiet());
        println!("  initial = {}", cfg.initial_run());
        println!("  clear_screen = {}", cfg.clear_screen());
        println!("  policy = {:?}", cfg.policy());
        if let Some(timeout) = cfg.timeout() {
            println!("  timeout = {:?} (not enforced)", timeout);
        }
        println!("  shell = {}", cfg.shell());
        println!("  command = {:?}", cfg.command());
    }

    println!("  ignore = {:?}", cfg.ignore());

    debug!("dry-run complete (no watching)");
}
