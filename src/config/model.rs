// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::types::{DEFAULT_EXTENSION, DEFAULT_POLL_INTERVAL_MS, WatcherBackend};

/// Configuration exactly as read from a TOML file, before validation.
///
/// ```toml
/// [loader]
/// program_dir = "progs"
/// extension = "prog"
/// dump_programs = false
///
/// [watcher]
/// backend = "native"
/// poll_interval_ms = 1000
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub loader: LoaderSection,

    #[serde(default)]
    pub watcher: WatcherSection,
}

/// `[loader]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct LoaderSection {
    /// Directory whose program files are loaded and watched.
    #[serde(default = "default_program_dir")]
    pub program_dir: PathBuf,

    /// Recognised program-file suffix, compared case-sensitively.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Print the compiled form of every program after it loads.
    #[serde(default)]
    pub dump_programs: bool,
}

fn default_program_dir() -> PathBuf {
    PathBuf::from("progs")
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

impl Default for LoaderSection {
    fn default() -> Self {
        Self {
            program_dir: default_program_dir(),
            extension: default_extension(),
            dump_programs: false,
        }
    }
}

/// `[watcher]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatcherSection {
    #[serde(default)]
    pub backend: WatcherBackend,

    /// Rescan interval for the `poll` backend; ignored by `native`.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

impl Default for WatcherSection {
    fn default() -> Self {
        Self {
            backend: WatcherBackend::default(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

/// Validated configuration.
///
/// Only obtainable through `ConfigFile::try_from(RawConfigFile)`, so holders
/// can rely on the invariants checked in [`crate::config::validate`].
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub loader: LoaderSection,
    pub watcher: WatcherSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(loader: LoaderSection, watcher: WatcherSection) -> Self {
        Self { loader, watcher }
    }
}
