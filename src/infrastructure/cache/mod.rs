//! Folder preview cache: memoizes [`crate::application::folder_aggregator::aggregate`]
//! per folder, backed by `moka`'s async cache.
//!
//! Per spec §9's redesign note, this cache is invalidated purely by
//! document upsert/delete events, never by a timer — [`run_invalidation_loop`]
//! subscribes to a folder's [`ChangeEvent`]s and evicts the affected
//! entries as they arrive. Eviction is otherwise size-bounded only
//! (`max_capacity`), not time-bounded.

use crate::domain::ports::events::ChangeEvent;
use crate::domain::types::SemanticPreview;
use moka::future::Cache;
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Caches [`SemanticPreview`]s keyed by folder-relative path.
pub struct FolderPreviewCache {
    inner: Cache<PathBuf, SemanticPreview>,
}

impl FolderPreviewCache {
    /// Build a cache bounded to `max_capacity` entries.
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::builder().max_capacity(max_capacity).build(),
        }
    }

    /// Return the cached preview for `folder`, computing and inserting it
    /// via `compute` on a miss.
    pub async fn get_or_compute<F, Fut>(&self, folder: PathBuf, compute: F) -> SemanticPreview
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = SemanticPreview>,
    {
        self.inner.get_with(folder, compute()).await
    }

    /// Evict one folder's cached preview.
    pub fn invalidate(&self, folder: &Path) {
        self.inner.invalidate(folder);
    }

    /// Evict every cached preview (used for `ReindexCompleted`, since a
    /// full scan can touch an unbounded set of folders).
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    /// Current number of cached entries (moka reports this eventually, not
    /// synchronously after a write).
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

/// The folder whose preview an upsert/delete invalidates: its immediate
/// parent, since [`crate::application::folder_aggregator::aggregate`] rolls
/// up direct children only.
fn invalidated_folder(document_path: &Path) -> PathBuf {
    document_path.parent().map(Path::to_path_buf).unwrap_or_default()
}

/// Drives cache invalidation from a folder's change-event stream until
/// `cancel` fires or the channel closes. Spawn this once per folder
/// alongside its orchestrator.
pub async fn run_invalidation_loop(
    cache: std::sync::Arc<FolderPreviewCache>,
    mut events: broadcast::Receiver<ChangeEvent>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            received = events.recv() => match received {
                Ok(ChangeEvent::DocumentUpserted { document, .. }) => {
                    let folder = invalidated_folder(&document.path);
                    debug!(folder = %folder.display(), "invalidating folder preview on upsert");
                    cache.invalidate(&folder);
                }
                Ok(ChangeEvent::DocumentDeleted { document_id, .. }) => {
                    let folder = invalidated_folder(Path::new(&document_id));
                    debug!(folder = %folder.display(), "invalidating folder preview on delete");
                    cache.invalidate(&folder);
                }
                Ok(ChangeEvent::ReindexCompleted { .. }) => cache.invalidate_all(),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "cache invalidation loop lagged, invalidating entire cache");
                    cache.invalidate_all();
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }
}
