// src/watch/watcher.rs

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, Context};
use notify::event::{MetadataKind, ModifyKind, RenameMode};
use notify::{Config, Event, EventKind, PollWatcher, RecommendedWatcher, RecursiveMode};
use notify::Watcher as _;
use tracing::{debug, info, trace, warn};

use crate::errors::{ProgloadError, Result};
use crate::types::WatcherBackend;
use crate::watch::{WatchSenders, Watcher};

/// A change, already sorted into one of the three streams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsChange {
    Created(PathBuf),
    Updated(PathBuf),
    Deleted(PathBuf),
}

/// Map a raw `notify` event onto the create/update/delete streams.
///
/// Renames are split: the old name is a deletion and the new name a
/// creation, so an atomic rename-into-place looks like the file appearing.
/// When the backend cannot tell which side of a rename a path is on, the
/// path's current existence decides. A write-time change counts as an
/// update, since the poll backend reports rewrites that way. Access events
/// and permission or ownership changes are dropped.
pub fn classify(event: &Event) -> Vec<FsChange> {
    let paths = event.paths.iter().cloned();
    match &event.kind {
        EventKind::Create(_) => paths.map(FsChange::Created).collect(),
        EventKind::Remove(_) => paths.map(FsChange::Deleted).collect(),
        EventKind::Modify(ModifyKind::Name(mode)) => match mode {
            RenameMode::From => paths.map(FsChange::Deleted).collect(),
            RenameMode::To => paths.map(FsChange::Created).collect(),
            RenameMode::Both => {
                let mut changes = Vec::with_capacity(event.paths.len());
                let mut iter = event.paths.iter();
                if let Some(from) = iter.next() {
                    changes.push(FsChange::Deleted(from.clone()));
                }
                changes.extend(iter.cloned().map(FsChange::Created));
                changes
            }
            _ => paths
                .map(|p| {
                    if p.exists() {
                        FsChange::Created(p)
                    } else {
                        FsChange::Deleted(p)
                    }
                })
                .collect(),
        },
        EventKind::Modify(ModifyKind::Metadata(MetadataKind::WriteTime | MetadataKind::Any)) => {
            paths.map(FsChange::Updated).collect()
        }
        EventKind::Modify(ModifyKind::Metadata(_)) => Vec::new(),
        EventKind::Modify(_) => paths.map(FsChange::Updated).collect(),
        _ => Vec::new(),
    }
}

/// [`Watcher`] backed by `notify`.
///
/// Dropping this stops all file watching; the change streams then close
/// once the last sender goes away.
pub struct NotifyWatcher {
    inner: Mutex<Box<dyn notify::Watcher + Send>>,
    backend: WatcherBackend,
}

impl fmt::Debug for NotifyWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifyWatcher")
            .field("backend", &self.backend)
            .finish_non_exhaustive()
    }
}

impl NotifyWatcher {
    /// Build a watcher that forwards classified changes into `senders`.
    ///
    /// `poll_interval` is only used by [`WatcherBackend::Poll`].
    pub fn new(
        backend: WatcherBackend,
        poll_interval: Duration,
        senders: WatchSenders,
    ) -> Result<Self> {
        // Called synchronously on notify's own thread.
        let handler = move |res: notify::Result<Event>| match res {
            Ok(event) => {
                trace!(?event, "received notify event");
                for change in classify(&event) {
                    if !senders.dispatch(change) {
                        debug!("change streams closed; dropping notify event");
                        return;
                    }
                }
            }
            Err(err) => warn!("file watch error: {err}"),
        };

        let inner: Box<dyn notify::Watcher + Send> = match backend {
            WatcherBackend::Native => Box::new(RecommendedWatcher::new(handler, Config::default())?),
            WatcherBackend::Poll => Box::new(PollWatcher::new(
                handler,
                Config::default().with_poll_interval(poll_interval),
            )?),
        };

        info!(?backend, "file watcher created");

        Ok(Self {
            inner: Mutex::new(inner),
            backend,
        })
    }
}

impl Watcher for NotifyWatcher {
    fn add(&self, path: &Path) -> anyhow::Result<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| anyhow!("watcher mutex poisoned"))?;
        inner
            .watch(path, RecursiveMode::NonRecursive)
            .map_err(ProgloadError::Watch)
            .with_context(|| format!("watching {:?}", path))?;
        debug!(?path, "watch added");
        Ok(())
    }

    fn remove(&self, path: &Path) -> anyhow::Result<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| anyhow!("watcher mutex poisoned"))?;
        inner
            .unwatch(path)
            .map_err(ProgloadError::Watch)
            .with_context(|| format!("unwatching {:?}", path))?;
        debug!(?path, "watch removed");
        Ok(())
    }
}
