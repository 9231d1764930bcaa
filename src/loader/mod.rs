// src/loader/mod.rs

//! Program loader and hot-reload manager.
//!
//! [`ProgLoader`] owns the compile-and-register path for individual program
//! files ([`ProgLoader::load_one`]), the initial directory scan
//! ([`ProgLoader::load_all`]) and the per-file watch bookkeeping. The
//! long-lived coordination loop that turns watcher events into loads and
//! unloads lives in [`event_loop`].
//!
//! Every per-file failure (unreadable file, compile diagnostics) is logged,
//! counted, and leaves the registry untouched for that name. Only failing to
//! list the program directory at startup is reported as an error.

use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::compiler::Compiler;
use crate::errors::{ProgloadError, Result};
use crate::fs::FileSystem;
use crate::metrics::MetricsSink;
use crate::registry::Registry;
use crate::watch::{WatchEvents, Watcher};

pub mod event_loop;
pub mod path_utils;
pub mod subscriptions;

pub use event_loop::LoaderHandle;
pub use path_utils::{has_extension, split_program_path};
pub use subscriptions::Subscriptions;

/// Behaviour switches fixed at construction time.
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Recognised program-file suffix, without the dot.
    pub extension: String,
    /// Print every successfully compiled program's dump after it loads.
    pub dump_programs: bool,
}

/// Collaborators the loader is built from.
pub struct LoaderParts<C: Compiler> {
    pub compiler: C,
    pub watcher: Arc<dyn Watcher>,
    pub metrics: Arc<dyn MetricsSink>,
    pub fs: Arc<dyn FileSystem>,
    pub options: LoaderOptions,
}

struct Shared<C: Compiler> {
    compiler: C,
    registry: Registry<C::Program>,
    subscriptions: Subscriptions,
    watcher: Arc<dyn Watcher>,
    metrics: Arc<dyn MetricsSink>,
    fs: Arc<dyn FileSystem>,
    options: LoaderOptions,
}

/// Cheaply cloneable handle to the loader state.
pub struct ProgLoader<C: Compiler> {
    shared: Arc<Shared<C>>,
}

impl<C: Compiler> Clone for ProgLoader<C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<C: Compiler> fmt::Debug for ProgLoader<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgLoader")
            .field("options", &self.shared.options)
            .field("registry", &self.shared.registry)
            .field("subscriptions", &self.shared.subscriptions)
            .finish_non_exhaustive()
    }
}

impl<C: Compiler> ProgLoader<C> {
    /// Build a loader without an event loop (e.g. for `--compile-only`).
    pub fn new(parts: LoaderParts<C>) -> Self {
        Self {
            shared: Arc::new(Shared {
                compiler: parts.compiler,
                registry: Registry::new(),
                subscriptions: Subscriptions::new(),
                watcher: parts.watcher,
                metrics: parts.metrics,
                fs: parts.fs,
                options: parts.options,
            }),
        }
    }

    /// Build a loader and start its coordination loop on the current Tokio
    /// runtime.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(parts: LoaderParts<C>, events: WatchEvents) -> (Self, LoaderHandle) {
        let loader = Self::new(parts);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let join = tokio::spawn(event_loop::run(loader.clone(), events, shutdown_rx));
        (loader, LoaderHandle::new(shutdown_tx, join))
    }

    /// The shared registry of active programs. Clones see the same map.
    pub fn registry(&self) -> Registry<C::Program> {
        self.shared.registry.clone()
    }

    /// Names with a dedicated per-file watch.
    pub fn tracked_names(&self) -> Vec<String> {
        self.shared.subscriptions.names()
    }

    pub fn is_tracked(&self, name: &str) -> bool {
        self.shared.subscriptions.contains(name)
    }

    /// True if `path` carries the recognised program suffix.
    pub fn is_program_file(&self, path: &Path) -> bool {
        has_extension(path, &self.shared.options.extension)
    }

    /// Subscribe `dir` and load every program file directly inside it.
    ///
    /// Files load one after another; each failure is isolated and counted.
    /// Returns the number of files that failed. Failing to list `dir` is the
    /// only error.
    pub fn load_all(&self, dir: &Path) -> Result<usize> {
        if let Err(err) = self.shared.watcher.add(dir) {
            warn!(?dir, "failed to watch program directory: {err:#}");
        }

        let mut entries = self
            .shared
            .fs
            .read_dir(dir)
            .map_err(|source| ProgloadError::ListPrograms {
                path: dir.to_path_buf(),
                source,
            })?;
        entries.sort();

        let mut errors = 0;
        for path in entries {
            if !self.is_program_file(&path) || self.shared.fs.is_dir(&path) {
                debug!(?path, "skipping non-program entry");
                continue;
            }
            let Some((_, name)) = split_program_path(&path) else {
                warn!(?path, "skipping program with unusable file name");
                continue;
            };
            errors += self.load_one(dir, &name);
        }

        info!(
            ?dir,
            loaded = self.shared.registry.len(),
            errors,
            "initial program load complete"
        );
        Ok(errors)
    }

    /// [`ProgLoader::load_all`] on the blocking pool, for async callers.
    pub async fn load_all_blocking(&self, dir: PathBuf) -> Result<usize> {
        let loader = self.clone();
        tokio::task::spawn_blocking(move || loader.load_all(&dir))
            .await
            .map_err(|err| anyhow::anyhow!("initial program load task failed: {err}"))?
    }

    /// Read, compile and register `dir/name`. Returns 1 on failure, else 0.
    ///
    /// On failure the registry keeps whatever was registered under `name`
    /// before, so a broken edit never takes down a running program.
    pub fn load_one(&self, dir: &Path, name: &str) -> usize {
        let path = dir.join(name);
        let shared = &self.shared;

        let source = match read_source(shared.fs.as_ref(), &path) {
            Ok(source) => source,
            Err(err) => {
                warn!(program = %name, "failed to read program {:?}: {err:#}", path);
                shared.metrics.program_load_failed(name);
                return 1;
            }
        };

        let program = match shared.compiler.compile(name, &source) {
            Ok(program) => program,
            Err(diagnostics) => {
                for diagnostic in &diagnostics {
                    warn!(program = %name, "{diagnostic}");
                }
                shared.metrics.program_load_failed(name);
                return 1;
            }
        };

        if shared.options.dump_programs {
            println!("{}", shared.compiler.dump(name, &program));
        }

        shared.registry.put(name, program);
        shared.metrics.program_loaded(name);
        info!(program = %name, "loaded program");
        0
    }

    /// Handle a creation or update of `path`.
    ///
    /// Both kinds are handled identically: backends disagree on whether an
    /// atomic rename surfaces as one or the other.
    pub(crate) async fn handle_change(&self, path: PathBuf) {
        if !self.is_program_file(&path) {
            debug!(?path, "ignoring change to non-program file");
            return;
        }
        if self.shared.fs.is_dir(&path) {
            debug!(?path, "ignoring change to directory");
            return;
        }
        let Some((dir, name)) = split_program_path(&path) else {
            warn!(?path, "ignoring program with unusable file name");
            return;
        };

        self.shared
            .subscriptions
            .track(&name, &path, self.shared.watcher.as_ref());

        // Compile off the async workers, but finish before taking the next
        // event so changes apply in delivery order.
        let loader = self.clone();
        if let Err(err) =
            tokio::task::spawn_blocking(move || loader.load_one(&dir, &name)).await
        {
            warn!(?path, "program load task failed: {err}");
        }
    }

    /// Handle a deletion of `path`: unregister it and drop its watch.
    pub(crate) fn handle_delete(&self, path: &Path) {
        let Some((_, name)) = split_program_path(path) else {
            debug!(?path, "ignoring deletion with unusable file name");
            return;
        };

        if self.shared.registry.remove(&name) {
            info!(program = %name, "unloaded program");
        }
        self.shared
            .subscriptions
            .untrack(&name, self.shared.watcher.as_ref());
    }
}

/// The reader is dropped before returning, closing the file on every path.
fn read_source(fs: &dyn FileSystem, path: &Path) -> anyhow::Result<Vec<u8>> {
    let mut reader = fs.open_read(path)?;
    let mut source = Vec::new();
    reader
        .read_to_end(&mut source)
        .with_context(|| format!("reading program {:?}", path))?;
    Ok(source)
}
