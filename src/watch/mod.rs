// src/watch/mod.rs

//! Filesystem watching for the program loader.
//!
//! This module is responsible for:
//! - The [`Watcher`] seam the loader subscribes and unsubscribes paths
//!   through.
//! - Delivering changes as three independent streams (creations, updates,
//!   deletions) via [`WatchEvents`].
//! - A production implementation on top of `notify` ([`NotifyWatcher`]).
//!
//! It does **not** know about program files or the registry; every path
//! under a subscription is forwarded and the loader decides what matters.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tokio::sync::mpsc;

pub mod watcher;

pub use watcher::{classify, FsChange, NotifyWatcher};

/// Subscription side of a filesystem watcher.
///
/// Both calls may be made from any thread. Implementations treat a repeated
/// `add` for the same path as harmless; `remove` of a path that is no longer
/// watched returns an error the caller is free to ignore.
pub trait Watcher: Send + Sync {
    /// Start observing `path` (non-recursively when it is a directory).
    fn add(&self, path: &Path) -> Result<()>;

    /// Stop observing `path`.
    fn remove(&self, path: &Path) -> Result<()>;
}

/// Receiving ends of the three change streams.
#[derive(Debug)]
pub struct WatchEvents {
    pub creates: mpsc::UnboundedReceiver<PathBuf>,
    pub updates: mpsc::UnboundedReceiver<PathBuf>,
    pub deletes: mpsc::UnboundedReceiver<PathBuf>,
}

/// Sending ends of the three change streams.
#[derive(Debug, Clone)]
pub struct WatchSenders {
    creates: mpsc::UnboundedSender<PathBuf>,
    updates: mpsc::UnboundedSender<PathBuf>,
    deletes: mpsc::UnboundedSender<PathBuf>,
}

impl WatchSenders {
    /// Each returns `false` once the receiving side has been dropped.
    pub fn created(&self, path: impl Into<PathBuf>) -> bool {
        self.creates.send(path.into()).is_ok()
    }

    pub fn updated(&self, path: impl Into<PathBuf>) -> bool {
        self.updates.send(path.into()).is_ok()
    }

    pub fn deleted(&self, path: impl Into<PathBuf>) -> bool {
        self.deletes.send(path.into()).is_ok()
    }

    pub fn dispatch(&self, change: FsChange) -> bool {
        match change {
            FsChange::Created(path) => self.created(path),
            FsChange::Updated(path) => self.updated(path),
            FsChange::Deleted(path) => self.deleted(path),
        }
    }
}

/// Create a connected set of change streams.
pub fn channel() -> (WatchSenders, WatchEvents) {
    let (creates_tx, creates_rx) = mpsc::unbounded_channel();
    let (updates_tx, updates_rx) = mpsc::unbounded_channel();
    let (deletes_tx, deletes_rx) = mpsc::unbounded_channel();
    (
        WatchSenders {
            creates: creates_tx,
            updates: updates_tx,
            deletes: deletes_tx,
        },
        WatchEvents {
            creates: creates_rx,
            updates: updates_rx,
            deletes: deletes_rx,
        },
    )
}

/// Watcher that accepts every subscription and never produces events.
///
/// Used when programs are loaded once without hot reload.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullWatcher;

impl Watcher for NullWatcher {
    fn add(&self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn remove(&self, _path: &Path) -> Result<()> {
        Ok(())
    }
}
