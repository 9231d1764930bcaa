// src/metrics.rs

//! Load/error tallies keyed by program name.
//!
//! The loader reports into a [`MetricsSink`] it is handed at construction
//! time; the process owns the sink and decides where the numbers go.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

/// Receives one call per load attempt outcome.
pub trait MetricsSink: Send + Sync {
    /// A program compiled and was installed in the registry.
    fn program_loaded(&self, name: &str);

    /// A program could not be opened or failed to compile.
    fn program_load_failed(&self, name: &str);
}

#[derive(Debug, Default)]
struct Tallies {
    loads: HashMap<String, u64>,
    errors: HashMap<String, u64>,
}

/// In-memory counters, exported under the names `prog_loads_total` and
/// `prog_load_errors`.
#[derive(Debug, Default)]
pub struct LoadCounters {
    inner: Mutex<Tallies>,
}

/// Point-in-time copy of [`LoadCounters`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountersSnapshot {
    pub prog_loads_total: BTreeMap<String, u64>,
    pub prog_load_errors: BTreeMap<String, u64>,
}

impl LoadCounters {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tallies> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn loads(&self, name: &str) -> u64 {
        self.lock().loads.get(name).copied().unwrap_or(0)
    }

    pub fn errors(&self, name: &str) -> u64 {
        self.lock().errors.get(name).copied().unwrap_or(0)
    }

    pub fn snapshot(&self) -> CountersSnapshot {
        let tallies = self.lock();
        CountersSnapshot {
            prog_loads_total: tallies.loads.iter().map(|(k, v)| (k.clone(), *v)).collect(),
            prog_load_errors: tallies.errors.iter().map(|(k, v)| (k.clone(), *v)).collect(),
        }
    }
}

impl MetricsSink for LoadCounters {
    fn program_loaded(&self, name: &str) {
        *self.lock().loads.entry(name.to_string()).or_insert(0) += 1;
    }

    fn program_load_failed(&self, name: &str) {
        *self.lock().errors.entry(name.to_string()).or_insert(0) += 1;
    }
}
