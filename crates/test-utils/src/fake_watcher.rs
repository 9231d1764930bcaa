use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use progload::watch::Watcher;

/// A fake watcher that:
/// - records every `add` / `remove` call in order
/// - tracks which paths are currently subscribed
/// - can be told to refuse particular paths
#[derive(Debug, Default)]
pub struct FakeWatcher {
    adds: Mutex<Vec<PathBuf>>,
    removes: Mutex<Vec<PathBuf>>,
    active: Mutex<HashSet<PathBuf>>,
    refuse: Mutex<HashSet<PathBuf>>,
}

impl FakeWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `add(path)` calls fail.
    pub fn refuse(&self, path: impl Into<PathBuf>) {
        self.refuse.lock().unwrap().insert(path.into());
    }

    pub fn adds(&self) -> Vec<PathBuf> {
        self.adds.lock().unwrap().clone()
    }

    pub fn removes(&self) -> Vec<PathBuf> {
        self.removes.lock().unwrap().clone()
    }

    /// Number of successful `add` calls for `path`.
    pub fn add_count(&self, path: impl AsRef<Path>) -> usize {
        self.adds
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.as_path() == path.as_ref())
            .count()
    }

    pub fn is_watching(&self, path: impl AsRef<Path>) -> bool {
        self.active.lock().unwrap().contains(path.as_ref())
    }
}

impl Watcher for FakeWatcher {
    fn add(&self, path: &Path) -> Result<()> {
        if self.refuse.lock().unwrap().contains(path) {
            return Err(anyhow!("refusing to watch {:?}", path));
        }
        self.adds.lock().unwrap().push(path.to_path_buf());
        self.active.lock().unwrap().insert(path.to_path_buf());
        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<()> {
        self.removes.lock().unwrap().push(path.to_path_buf());
        if self.active.lock().unwrap().remove(path) {
            Ok(())
        } else {
            Err(anyhow!("not watching {:?}", path))
        }
    }
}
