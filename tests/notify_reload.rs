// tests/notify_reload.rs

use std::error::Error;
use std::fs;
use std::sync::Arc;
use std::time::Duration;

use progload::compiler::RuleCompiler;
use progload::fs::RealFileSystem;
use progload::loader::{LoaderOptions, LoaderParts, ProgLoader};
use progload::metrics::LoadCounters;
use progload::types::WatcherBackend;
use progload::watch::{self, NotifyWatcher};
use progload_test_utils::builders::VALID_PROGRAM;
use progload_test_utils::{eventually, init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn poll_backend_reloads_a_rewritten_program() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let dir_path = dir.path().canonicalize()?;
    let program = dir_path.join("a.prog");
    fs::write(&program, VALID_PROGRAM)?;

    let (senders, events) = watch::channel();
    let watcher = NotifyWatcher::new(WatcherBackend::Poll, Duration::from_millis(50), senders)?;
    let metrics = Arc::new(LoadCounters::new());
    let (loader, handle) = ProgLoader::spawn(
        LoaderParts {
            compiler: RuleCompiler::new(),
            watcher: Arc::new(watcher),
            metrics: metrics.clone(),
            fs: Arc::new(RealFileSystem),
            options: LoaderOptions {
                extension: "prog".to_string(),
                dump_programs: false,
            },
        },
        events,
    );

    assert_eq!(loader.load_all_blocking(dir_path.clone()).await?, 0);
    assert_eq!(metrics.loads("a.prog"), 1);

    // Step past coarse mtime resolution so the rewrite is visible to polling.
    tokio::time::sleep(Duration::from_millis(1100)).await;
    fs::write(&program, "counter updated_metric\n/x/ updated_metric\n")?;

    eventually(|| metrics.loads("a.prog") >= 2).await;
    let reloaded = loader.registry().get("a.prog").expect("a.prog loaded");
    assert_eq!(reloaded.metrics(), ["updated_metric".to_string()]);

    with_timeout(handle.shutdown()).await;
    Ok(())
}
