// src/registry.rs

//! Shared mapping from program name to the active compiled program.
//!
//! The registry is the only structure the loader shares with the outside
//! world. Writers (`put`, `remove`) take the write lock; readers take the
//! read lock and get `Arc` handles, so a program that is replaced while a
//! reader still holds it stays alive until the reader drops it.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

/// Thread-safe name -> program map. Clones share the same underlying map.
pub struct Registry<P> {
    programs: Arc<RwLock<HashMap<String, Arc<P>>>>,
}

impl<P> Clone for Registry<P> {
    fn clone(&self) -> Self {
        Self {
            programs: Arc::clone(&self.programs),
        }
    }
}

impl<P> Default for Registry<P> {
    fn default() -> Self {
        Self {
            programs: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<P> fmt::Debug for Registry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("names", &self.names())
            .finish()
    }
}

impl<P> Registry<P> {
    pub fn new() -> Self {
        Self::default()
    }

    // Every mutation is a single map insert or remove, so a panic elsewhere
    // while holding the lock cannot leave a torn entry behind.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<P>>> {
        self.programs.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<P>>> {
        self.programs.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Install `program` under `name`, atomically replacing any previous one.
    pub fn put(&self, name: impl Into<String>, program: P) {
        let name = name.into();
        let replaced = self.write().insert(name.clone(), Arc::new(program));
        debug!(program = %name, replaced = replaced.is_some(), "registry put");
    }

    /// Deregister `name`. Absent names are a no-op.
    ///
    /// Returns whether an entry was removed.
    pub fn remove(&self, name: &str) -> bool {
        let removed = self.write().remove(name).is_some();
        debug!(program = %name, removed, "registry remove");
        removed
    }

    pub fn get(&self, name: &str) -> Option<Arc<P>> {
        self.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Sorted names of all registered programs.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Copy of the whole mapping as it was at one instant.
    pub fn snapshot(&self) -> BTreeMap<String, Arc<P>> {
        self.read()
            .iter()
            .map(|(name, program)| (name.clone(), Arc::clone(program)))
            .collect()
    }
}
