//! The explicit services container (spec §9's redesign note): replaces the
//! teacher's `shaku`-based DI container with a plain struct built once at
//! startup and passed down explicitly, plus a per-folder handle bundling
//! that folder's pipeline, retrieval engine, and control surface.

use crate::adapters::events::BroadcastEventPublisher;
use crate::adapters::providers::parsing::ParserDispatcher;
use crate::adapters::storage::FolderStore;
use crate::adapters::watcher::NotifyWatcher;
use crate::application::embedding_pool::EmbeddingWorkerPool;
use crate::application::orchestrator::FolderOrchestrator;
use crate::application::retrieval::FolderRetrieval;
use crate::domain::error::Result;
use crate::domain::ports::admin::FolderAdmin;
use crate::domain::ports::embedding::EmbeddingService;
use crate::domain::ports::events::ChangeEvent;
use crate::domain::ports::watcher::{FolderWatcher, WatchHandle};
use crate::domain::semantics::{build_extractor, ChunkSemanticExtractor};
use crate::domain::types::{FolderStatus, ReindexSummary};
use crate::infrastructure::cache::{self, FolderPreviewCache};
use crate::infrastructure::config::{CacheConfig, FolderConfig, WatcherConfig};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

/// Shared collaborators constructed once at process startup and handed to
/// every folder this process indexes: the embedding service, parser
/// registry, and the optional folder preview cache. Unlike the teacher's DI
/// container, there is no runtime registry lookup here — every field is a
/// concrete, typed handle a caller holds directly.
pub struct Services {
    embedding: Arc<dyn EmbeddingService>,
    parsers: Arc<ParserDispatcher>,
    cache: Option<Arc<FolderPreviewCache>>,
}

impl Services {
    /// Build the shared services. `cache_config` controls whether (and how
    /// large) the folder preview cache is; pass `None` to disable it.
    pub fn new(embedding: Arc<dyn EmbeddingService>, cache_config: Option<&CacheConfig>) -> Self {
        let cache = cache_config
            .filter(|c| c.enabled)
            .map(|c| Arc::new(FolderPreviewCache::new(c.max_capacity)));
        Self {
            embedding,
            parsers: Arc::new(ParserDispatcher::with_defaults()),
            cache,
        }
    }

    /// The folder preview cache, if enabled.
    pub fn cache(&self) -> Option<&Arc<FolderPreviewCache>> {
        self.cache.as_ref()
    }

    /// Open one folder's pipeline and retrieval collaborators, running its
    /// startup full scan before returning. Torn down (watcher stopped) when
    /// the returned [`FolderHandle`] is dropped.
    #[instrument(skip(self, folder, watcher_config), fields(root = %folder.path.display()))]
    pub async fn open_folder(
        &self,
        folder: &FolderConfig,
        watcher_config: &WatcherConfig,
    ) -> Result<FolderHandle> {
        let root = folder.path.clone();
        let storage: Arc<dyn crate::domain::ports::storage::Storage> =
            Arc::new(FolderStore::open(&root).await?);
        let embeddings = Arc::new(EmbeddingWorkerPool::with_defaults(self.embedding.clone()));
        let extractor: Arc<dyn ChunkSemanticExtractor> =
            Arc::from(build_extractor(self.embedding.capabilities().extraction_strategy));
        let events = Arc::new(BroadcastEventPublisher::new());

        let orchestrator = Arc::new(FolderOrchestrator::new(
            root.clone(),
            storage.clone(),
            self.parsers.clone(),
            embeddings.clone(),
            extractor,
            events.clone(),
            folder.include_extensions.clone(),
        ));
        let retrieval = Arc::new(FolderRetrieval::new(root.clone(), storage.clone(), embeddings));

        orchestrator.run_full_scan(CancellationToken::new()).await?;

        let invalidation_cancel = CancellationToken::new();
        if let Some(cache) = &self.cache {
            tokio::spawn(cache::run_invalidation_loop(
                cache.clone(),
                events.subscribe(),
                invalidation_cancel.clone(),
            ));
        }

        let watch_handle = if watcher_config.enabled {
            let watcher = NotifyWatcher::new(Duration::from_millis(watcher_config.debounce_ms));
            Some(spawn_rescan_on_watch(watcher, orchestrator.clone())?)
        } else {
            None
        };

        Ok(FolderHandle {
            root,
            storage,
            orchestrator,
            retrieval,
            events,
            watch_handle,
            invalidation_cancel,
        })
    }
}

/// Starts the folder watcher and, on every debounced batch, triggers
/// another full fingerprint-diff scan rather than processing the batch's
/// paths directly — the watcher is advisory only (spec §4.11), and a full
/// scan is the one code path guaranteed to reconcile any coalesced,
/// reordered, or missed filesystem event.
fn spawn_rescan_on_watch(
    watcher: NotifyWatcher,
    orchestrator: Arc<FolderOrchestrator>,
) -> Result<WatchHandle> {
    let (tx, mut rx) = tokio::sync::mpsc::channel(8);
    let handle = watcher.watch(orchestrator.root().to_path_buf(), tx)?;

    tokio::spawn(async move {
        while let Some(batch) = rx.recv().await {
            if batch.is_empty() {
                continue;
            }
            info!(
                changed = batch.changed.len(),
                deleted = batch.deleted.len(),
                "watch batch triggered rescan"
            );
            if let Err(err) = orchestrator.run_full_scan(CancellationToken::new()).await {
                warn!(%err, "rescan after watch batch failed");
            }
        }
    });

    Ok(handle)
}

/// One folder's opened pipeline, retrieval engine, and control surface.
pub struct FolderHandle {
    root: PathBuf,
    storage: Arc<dyn crate::domain::ports::storage::Storage>,
    orchestrator: Arc<FolderOrchestrator>,
    retrieval: Arc<FolderRetrieval>,
    events: Arc<BroadcastEventPublisher>,
    watch_handle: Option<WatchHandle>,
    invalidation_cancel: CancellationToken,
}

impl FolderHandle {
    /// This folder's root path.
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    /// The five retrieval operations for this folder.
    pub fn retrieval(&self) -> &Arc<FolderRetrieval> {
        &self.retrieval
    }
}

impl Drop for FolderHandle {
    fn drop(&mut self) {
        if let Some(handle) = &self.watch_handle {
            handle.stop();
        }
        self.invalidation_cancel.cancel();
    }
}

#[async_trait]
impl FolderAdmin for FolderHandle {
    async fn reindex(&self) -> Result<ReindexSummary> {
        self.orchestrator.run_full_scan(CancellationToken::new()).await
    }

    async fn status(&self) -> Result<FolderStatus> {
        let documents = self.storage.query_documents_under(std::path::Path::new(""), false).await?;
        let failures = self.storage.list_failures().await?;
        let last_updated = documents.iter().map(|d| d.last_processed_at).max();
        Ok(FolderStatus {
            indexed: documents.len(),
            pending: 0,
            failed: failures.len(),
            last_updated,
        })
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::providers::embedding::null::NullEmbeddingService;
    use crate::infrastructure::config::WatcherConfig as WatcherCfg;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_folder_indexes_existing_files_and_reports_status() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("notes.txt"),
            "A reasonably detailed note covering several distinct topics so that chunk \
             semantic extraction has enough signal to pass the quality floor reliably.",
        )
        .unwrap();

        let services = Services::new(Arc::new(NullEmbeddingService::new(16)), None);
        let folder = FolderConfig { path: dir.path().to_path_buf(), include_extensions: vec!["txt".into()] };
        let watcher_config = WatcherCfg { enabled: false, debounce_ms: 1000 };

        let handle = services.open_folder(&folder, &watcher_config).await.unwrap();
        let status = handle.status().await.unwrap();
        assert_eq!(status.indexed, 1);
        assert!(status.last_updated.is_some());
    }
}
