// src/lib.rs

pub mod cli;
pub mod compiler;
pub mod config;
pub mod errors;
pub mod fs;
pub mod loader;
pub mod logging;
pub mod metrics;
pub mod registry;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::compiler::RuleCompiler;
use crate::config::{load_or_default, validate_extension, ConfigFile};
use crate::fs::RealFileSystem;
use crate::loader::{LoaderOptions, LoaderParts, ProgLoader};
use crate::metrics::LoadCounters;
use crate::watch::{NotifyWatcher, NullWatcher, Watcher};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and CLI overrides
/// - the filesystem watcher
/// - the program loader and its event loop
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let mut cfg = load_or_default(&args.config)?;
    apply_overrides(&mut cfg, &args)?;

    let program_dir = resolve_program_dir(&cfg.loader.program_dir);
    let metrics = Arc::new(LoadCounters::new());

    if args.compile_only {
        return compile_only(&cfg, program_dir, metrics).await;
    }

    let (senders, events) = watch::channel();
    let watcher = NotifyWatcher::new(
        cfg.watcher.backend,
        Duration::from_millis(cfg.watcher.poll_interval_ms),
        senders,
    )?;

    let parts = loader_parts(&cfg, Arc::new(watcher), Arc::clone(&metrics));
    let (loader, handle) = ProgLoader::spawn(parts, events);

    let errors = loader.load_all_blocking(program_dir.clone()).await?;
    if errors > 0 {
        warn!(errors, "some programs failed to load; continuing with the rest");
    }
    info!(
        dir = ?program_dir,
        programs = ?loader.registry().names(),
        "watching for program changes"
    );

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for Ctrl+C: {e}");
    }

    handle.shutdown().await;
    log_counters(&metrics);
    Ok(())
}

/// Load every program once without watching; fail if any program failed.
async fn compile_only(
    cfg: &ConfigFile,
    program_dir: PathBuf,
    metrics: Arc<LoadCounters>,
) -> Result<()> {
    let parts = loader_parts(cfg, Arc::new(NullWatcher), Arc::clone(&metrics));
    let loader = ProgLoader::new(parts);

    let errors = loader.load_all_blocking(program_dir.clone()).await?;
    log_counters(&metrics);

    if errors > 0 {
        bail!("{errors} program(s) in {:?} failed to load", program_dir);
    }
    info!(programs = loader.registry().len(), "all programs compiled");
    Ok(())
}

fn loader_parts(
    cfg: &ConfigFile,
    watcher: Arc<dyn Watcher>,
    metrics: Arc<LoadCounters>,
) -> LoaderParts<RuleCompiler> {
    LoaderParts {
        compiler: RuleCompiler::new(),
        watcher,
        metrics,
        fs: Arc::new(RealFileSystem),
        options: LoaderOptions {
            extension: cfg.loader.extension.clone(),
            dump_programs: cfg.loader.dump_programs,
        },
    }
}

/// CLI flags win over the config file.
fn apply_overrides(cfg: &mut ConfigFile, args: &CliArgs) -> Result<()> {
    if let Some(dir) = &args.program_dir {
        cfg.loader.program_dir = dir.clone();
    }
    if let Some(ext) = &args.extension {
        validate_extension(ext)?;
        cfg.loader.extension = ext.clone();
    }
    if args.dump_programs {
        cfg.loader.dump_programs = true;
    }
    if let Some(backend) = args.watcher {
        cfg.watcher.backend = backend;
    }
    debug!(?cfg, "effective configuration");
    Ok(())
}

/// Canonicalize once so event paths and the scanned directory agree.
///
/// A directory that does not exist is passed through unchanged; listing it
/// then fails with a clear error.
fn resolve_program_dir(dir: &Path) -> PathBuf {
    dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf())
}

fn log_counters(metrics: &LoadCounters) {
    let snapshot = metrics.snapshot();
    for (name, count) in &snapshot.prog_loads_total {
        info!(program = %name, count, "prog_loads_total");
    }
    for (name, count) in &snapshot.prog_load_errors {
        info!(program = %name, count, "prog_load_errors");
    }
}
