//! The file watcher port: debounced filesystem observation.

use std::path::PathBuf;

/// A debounced batch of filesystem changes, ready for the orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchBatch {
    /// Paths that appeared or changed since the last batch.
    pub changed: Vec<PathBuf>,
    /// Paths that disappeared since the last batch.
    pub deleted: Vec<PathBuf>,
}

impl WatchBatch {
    /// True if this batch carries no changes.
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.deleted.is_empty()
    }
}

/// Debounced observer over a single folder root.
///
/// The watcher is advisory only: correctness of the index still depends on
/// the Fingerprint & Change Detector running at least once at startup and
/// after any reconnection event, since filesystem events can be coalesced,
/// reordered, or missed entirely (e.g. across a network mount outage).
pub trait FolderWatcher: Send + Sync {
    /// Begin watching `root`, emitting debounced [`WatchBatch`]es on `tx`.
    fn watch(
        &self,
        root: PathBuf,
        tx: tokio::sync::mpsc::Sender<WatchBatch>,
    ) -> crate::domain::error::Result<WatchHandle>;
}

/// Handle to a running watch; dropping or calling [`WatchHandle::stop`] ends it.
pub struct WatchHandle {
    cancel: tokio_util::sync::CancellationToken,
}

impl WatchHandle {
    /// Wrap a cancellation token controlling the background watch task.
    pub fn new(cancel: tokio_util::sync::CancellationToken) -> Self {
        Self { cancel }
    }

    /// Stop the watch.
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}
