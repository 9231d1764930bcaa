#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use progload::fs::mock::MockFileSystem;
use progload::fs::FileSystem;
use progload::loader::{LoaderHandle, LoaderOptions, LoaderParts, ProgLoader};
use progload::metrics::LoadCounters;
use progload::types::DEFAULT_EXTENSION;
use progload::watch::{self, WatchSenders};

use crate::fake_watcher::FakeWatcher;
use crate::recording_compiler::RecordingCompiler;

/// Directory used for programs on the mock filesystem.
pub const PROG_DIR: &str = "/progs";

/// A program that compiles.
pub const VALID_PROGRAM: &str = "counter lines\n/.*/ lines\n";

/// A program the compiler rejects (unterminated pattern).
pub const INVALID_PROGRAM: &str = "counter lines\n/unterminated lines\n";

/// Everything a loader test needs to drive and inspect a loader.
pub struct Harness {
    pub fs: MockFileSystem,
    pub watcher: Arc<FakeWatcher>,
    pub metrics: Arc<LoadCounters>,
    pub compiled: Arc<Mutex<Vec<String>>>,
    pub loader: ProgLoader<RecordingCompiler>,
}

/// A [`Harness`] whose event loop is running.
pub struct RunningHarness {
    pub harness: Harness,
    pub senders: WatchSenders,
    pub handle: LoaderHandle,
}

/// Builder for loaders over a mock filesystem and a fake watcher.
pub struct LoaderBuilder {
    fs: MockFileSystem,
    extension: String,
    dump_programs: bool,
}

impl LoaderBuilder {
    pub fn new() -> Self {
        let fs = MockFileSystem::new();
        fs.add_dir(PROG_DIR);
        Self {
            fs,
            extension: DEFAULT_EXTENSION.to_string(),
            dump_programs: false,
        }
    }

    /// Add a file under [`PROG_DIR`].
    pub fn with_program(self, name: &str, source: &str) -> Self {
        self.fs.add_file(format!("{PROG_DIR}/{name}"), source);
        self
    }

    pub fn with_subdir(self, name: &str) -> Self {
        self.fs.add_dir(format!("{PROG_DIR}/{name}"));
        self
    }

    pub fn extension(mut self, ext: &str) -> Self {
        self.extension = ext.to_string();
        self
    }

    pub fn dump_programs(mut self, val: bool) -> Self {
        self.dump_programs = val;
        self
    }

    fn parts(&self) -> (LoaderParts<RecordingCompiler>, Probes) {
        let watcher = Arc::new(FakeWatcher::new());
        let metrics = Arc::new(LoadCounters::new());
        let compiler = RecordingCompiler::new();
        let compiled = compiler.log();
        let fs: Arc<dyn FileSystem> = Arc::new(self.fs.clone());

        let parts = LoaderParts {
            compiler,
            watcher: watcher.clone(),
            metrics: metrics.clone(),
            fs,
            options: LoaderOptions {
                extension: self.extension.clone(),
                dump_programs: self.dump_programs,
            },
        };
        let probes = Probes {
            fs: self.fs.clone(),
            watcher,
            metrics,
            compiled,
        };
        (parts, probes)
    }

    /// Build a loader without starting its event loop.
    pub fn build(self) -> Harness {
        let (parts, probes) = self.parts();
        probes.into_harness(ProgLoader::new(parts))
    }

    /// Build a loader and start its event loop. Requires a Tokio runtime.
    pub fn spawn(self) -> RunningHarness {
        let (parts, probes) = self.parts();
        let (senders, events) = watch::channel();
        let (loader, handle) = ProgLoader::spawn(parts, events);
        RunningHarness {
            harness: probes.into_harness(loader),
            senders,
            handle,
        }
    }
}

/// Test-side handles onto the collaborators given to the loader.
struct Probes {
    fs: MockFileSystem,
    watcher: Arc<FakeWatcher>,
    metrics: Arc<LoadCounters>,
    compiled: Arc<Mutex<Vec<String>>>,
}

impl Probes {
    fn into_harness(self, loader: ProgLoader<RecordingCompiler>) -> Harness {
        Harness {
            fs: self.fs,
            watcher: self.watcher,
            metrics: self.metrics,
            compiled: self.compiled,
            loader,
        }
    }
}

impl Default for LoaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Full mock path of a program under [`PROG_DIR`].
pub fn prog_path(name: &str) -> PathBuf {
    Path::new(PROG_DIR).join(name)
}
