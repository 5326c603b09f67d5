// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod invalidate;
pub mod livereload;
pub mod logging;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::watch as watch_channel;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::engine::{EngineSettings, WatchEngine};
use crate::exec::CommandQueue;
use crate::fs::{FileSystem, RealFileSystem};
use crate::livereload::LiveReloadRegistry;
use crate::types::WatchFiles;
use crate::watch::path_utils::display_path;
use crate::watch::{discover, resolve_targets, NotifyBackend, Target};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and target resolution
/// - the native watcher backend and the action executor
/// - live-reload servers
/// - the watch engine
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;
    let targets = resolve_targets(&cfg, args.target.as_deref())?;

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let root_dir = config_root_dir(fs.as_ref(), &config_path);

    if args.dry_run {
        print_dry_run(&cfg, &targets, fs.as_ref(), &root_dir);
        return Ok(());
    }

    let (engine_tx, engine_rx) = engine::channel();
    let (files_tx, files_rx) = watch_channel::channel(WatchFiles::default());

    let backend = NotifyBackend::new(engine_tx.clone())?;
    let queue = CommandQueue::new(cfg.tasks().clone(), files_rx, engine_tx.clone());
    let reloaders = LiveReloadRegistry::bind_for_targets(&targets).await?;

    info!(root = ?root_dir, targets = targets.len(), "starting watch");

    let settings = EngineSettings::new(root_dir, cfg.options());
    let engine = WatchEngine::new(settings, targets, fs, backend, queue, engine_rx)
        .with_last_batch(files_tx)
        .with_livereload(reloaders);

    tokio::select! {
        res = engine.run() => res.map_err(anyhow::Error::from),
        res = tokio::signal::ctrl_c() => {
            res?;
            info!("Ctrl-C received; shutting down");
            Ok(())
        }
    }
}

/// Figure out the directory patterns are resolved against.
///
/// - If the config path has a non-empty parent (e.g. "configs/Watchloop.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Watchloop.toml" (parent = ""),
///   we fall back to the current working directory.
///
/// The result is made absolute so native notifications carry the same paths
/// the engine subscribed to.
fn config_root_dir(fs: &dyn FileSystem, config_path: &Path) -> PathBuf {
    let dir = match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };
    fs.canonicalize(&dir).unwrap_or(dir)
}

/// Dry-run output: resolved targets, their actions and the files they match.
fn print_dry_run(cfg: &ConfigFile, targets: &[Target], fs: &dyn FileSystem, root: &Path) {
    println!("watchloop dry-run");
    println!("  root = {}", root.display());
    println!("  options.debounce_ms = {}", cfg.options().debounce_ms);
    println!("  options.interval_ms = {}", cfg.options().interval_ms);
    println!();

    println!("targets ({}):", targets.len());
    for target in targets {
        println!("  - {target}");
        println!("      files: {:?}", target.patterns().patterns());
        println!("      tasks: {:?}", target.actions());
        if let Some(addr) = target.livereload() {
            println!("      livereload: {addr}");
        }
        let matched = discover(fs, root, &[target.patterns()]);
        println!("      matched ({}):", matched.len());
        for path in &matched {
            println!("        {}", display_path(fs, root, path));
        }
    }
    println!();

    println!("tasks ({}):", cfg.tasks().len());
    for (name, task) in cfg.tasks() {
        println!("  - {name}");
        println!("      cmd: {}", task.cmd);
    }

    debug!("dry-run complete (no watching)");
}
