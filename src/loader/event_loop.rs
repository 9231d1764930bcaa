// src/loader/event_loop.rs

//! The coordination loop: one long-lived task that waits on the creation,
//! update and deletion streams and applies each event to the loader.
//!
//! Events are handled one at a time. A deletion unregisters the program and
//! cancels its dedicated watch; a creation or update (re)loads it. Nothing
//! that goes wrong for a single file stops the loop. It ends on an explicit
//! shutdown through [`LoaderHandle`], or once every stream has closed.

use std::fmt;
use std::path::PathBuf;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::compiler::Compiler;
use crate::loader::ProgLoader;
use crate::watch::WatchEvents;

#[derive(Debug)]
enum Change {
    Created(PathBuf),
    Updated(PathBuf),
    Deleted(PathBuf),
}

/// Owner of the running coordination loop.
///
/// Dropping the handle does not stop the loop; call [`LoaderHandle::shutdown`].
pub struct LoaderHandle {
    shutdown: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

impl fmt::Debug for LoaderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderHandle")
            .field("finished", &self.join.is_finished())
            .finish()
    }
}

impl LoaderHandle {
    pub(crate) fn new(shutdown: oneshot::Sender<()>, join: JoinHandle<()>) -> Self {
        Self { shutdown, join }
    }

    /// Whether the loop has exited (shutdown or all streams closed).
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Ask the loop to stop and wait for it. An event already being handled
    /// is finished first.
    pub async fn shutdown(self) {
        // The loop may already be gone if every stream closed.
        let _ = self.shutdown.send(());
        if let Err(err) = self.join.await {
            warn!("loader event loop ended abnormally: {err}");
        }
    }

    /// Wait for the loop to end on its own.
    pub async fn join(self) {
        let Self { shutdown, join } = self;
        // Keep the sender alive so waiting does not count as a shutdown.
        let _shutdown = shutdown;
        if let Err(err) = join.await {
            warn!("loader event loop ended abnormally: {err}");
        }
    }
}

async fn next_change(events: &mut WatchEvents) -> Option<Change> {
    tokio::select! {
        Some(path) = events.deletes.recv() => Some(Change::Deleted(path)),
        Some(path) = events.creates.recv() => Some(Change::Created(path)),
        Some(path) = events.updates.recv() => Some(Change::Updated(path)),
        else => None,
    }
}

pub(crate) async fn run<C: Compiler>(
    loader: ProgLoader<C>,
    mut events: WatchEvents,
    mut shutdown: oneshot::Receiver<()>,
) {
    info!("program loader event loop started");

    // A completed oneshot must not be polled again.
    let mut shutdown_open = true;

    loop {
        let change = tokio::select! {
            res = &mut shutdown, if shutdown_open => match res {
                Ok(()) => {
                    info!("shutdown requested; stopping loader event loop");
                    break;
                }
                Err(_) => {
                    debug!("loader handle dropped; running until streams close");
                    shutdown_open = false;
                    continue;
                }
            },
            change = next_change(&mut events) => change,
        };

        let Some(change) = change else {
            info!("all watch event streams closed; stopping loader event loop");
            break;
        };

        debug!(?change, "loader received change");

        match change {
            Change::Deleted(path) => loader.handle_delete(&path),
            Change::Created(path) | Change::Updated(path) => loader.handle_change(path).await,
        }
    }

    debug!("loader event loop finished");
}
