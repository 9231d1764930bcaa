use std::str::FromStr;
use serde::Deserialize;

/// Which notification mechanism backs the filesystem watcher.
///
/// - `Native`: the platform's recommended watcher (inotify, FSEvents, ...).
/// - `Poll`: periodic rescans; useful on network filesystems and in
///   containers where native notifications are not delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatcherBackend {
    Native,
    Poll,
}

impl Default for WatcherBackend {
    fn default() -> Self {
        WatcherBackend::Native
    }
}

impl FromStr for WatcherBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "native" => Ok(WatcherBackend::Native),
            "poll" => Ok(WatcherBackend::Poll),
            other => Err(format!(
                "invalid watcher backend: {other} (expected \"native\" or \"poll\")"
            )),
        }
    }
}

/// Default recognised program-file suffix (without the leading dot).
pub const DEFAULT_EXTENSION: &str = "prog";

/// Default interval between rescans for the poll backend.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
