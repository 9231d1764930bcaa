// src/loader/subscriptions.rs

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info, warn};

use crate::watch::Watcher;

/// Program names that have a dedicated per-file watch, beyond the
/// directory-level one.
///
/// A name is present exactly while its watch is active: membership changes
/// and the matching `Watcher::add` / `Watcher::remove` call happen under the
/// same lock, so two handlers racing on one name cannot both subscribe.
#[derive(Debug, Default)]
pub struct Subscriptions {
    watched: Mutex<HashMap<String, PathBuf>>,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, PathBuf>> {
        self.watched.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Ensure `name` has a dedicated watch on `path`.
    ///
    /// Returns `true` only when a new watch was established. If the watcher
    /// refuses the path the name stays untracked, so a later event retries.
    pub fn track(&self, name: &str, path: &Path, watcher: &dyn Watcher) -> bool {
        let mut watched = self.lock();
        if watched.contains_key(name) {
            return false;
        }

        match watcher.add(path) {
            Ok(()) => {
                watched.insert(name.to_string(), path.to_path_buf());
                debug!(program = %name, ?path, "dedicated watch added");
                true
            }
            Err(err) => {
                warn!(program = %name, ?path, "failed to add dedicated watch: {err:#}");
                false
            }
        }
    }

    /// Drop `name` and cancel its dedicated watch.
    ///
    /// The watcher may already have discarded the watch when the file went
    /// away, so a failed cancellation is only logged. Returns whether `name`
    /// was tracked.
    pub fn untrack(&self, name: &str, watcher: &dyn Watcher) -> bool {
        let mut watched = self.lock();
        let Some(path) = watched.remove(name) else {
            return false;
        };

        if let Err(err) = watcher.remove(&path) {
            info!(program = %name, ?path, "remove watch failed: {err:#}");
        } else {
            debug!(program = %name, ?path, "dedicated watch removed");
        }
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lock().contains_key(name)
    }

    /// Sorted names currently holding a dedicated watch.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().keys().cloned().collect();
        names.sort();
        names
    }
}
