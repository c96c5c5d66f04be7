//! Orchestrator (§4.9): the per-folder single-owner pipeline driver.
//!
//! One [`FolderOrchestrator`] owns one folder's entire write path: it is the
//! only writer to that folder's [`Storage`], mirroring the teacher's
//! single-writer-per-resource pattern rather than letting concurrent
//! reindex passes race each other. Reads (retrieval) remain safe to run
//! concurrently with indexing because `Storage::upsert_document` commits
//! atomically.

use crate::adapters::fingerprint::{self, Snapshot};
use crate::adapters::providers::parsing::ParserDispatcher;
use crate::application::embedding_pool::EmbeddingWorkerPool;
use crate::domain::chunking::chunk_text;
use crate::domain::constants::{DEFAULT_FILE_CONCURRENCY, FILENAME_CHUNK_INDEX};
use crate::domain::error::{Error, Result};
use crate::domain::ports::events::{ChangeEvent, EventPublisher};
use crate::domain::ports::storage::Storage;
use crate::domain::quality::{aggregate, AggregationOutcome};
use crate::domain::semantics::ChunkSemanticExtractor;
use crate::domain::types::{
    Chunk, Document, ExtractionMethod, FailureRecord, FailureScope, ParseStatus, ReindexSummary,
};
use crate::infrastructure::resilience::retry_with_backoff;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

/// Owns one folder's indexing pipeline: fingerprinting, parsing, chunking,
/// semantic extraction, embedding, aggregation, and commit.
pub struct FolderOrchestrator {
    root: PathBuf,
    storage: Arc<dyn Storage>,
    parsers: Arc<ParserDispatcher>,
    embeddings: Arc<EmbeddingWorkerPool>,
    extractor: Arc<dyn ChunkSemanticExtractor>,
    events: Arc<dyn EventPublisher>,
    include_extensions: Vec<String>,
    file_concurrency: usize,
}

impl FolderOrchestrator {
    /// Build an orchestrator for `root`, wiring the shared collaborators
    /// constructed once at folder-pipeline startup.
    pub fn new(
        root: PathBuf,
        storage: Arc<dyn Storage>,
        parsers: Arc<ParserDispatcher>,
        embeddings: Arc<EmbeddingWorkerPool>,
        extractor: Arc<dyn ChunkSemanticExtractor>,
        events: Arc<dyn EventPublisher>,
        include_extensions: Vec<String>,
    ) -> Self {
        Self {
            root,
            storage,
            parsers,
            embeddings,
            extractor,
            events,
            include_extensions,
            file_concurrency: DEFAULT_FILE_CONCURRENCY,
        }
    }

    fn snapshot_path(&self) -> PathBuf {
        self.root.join(".folder-mcp").join("fingerprint.json")
    }

    async fn load_snapshot(&self) -> Snapshot {
        match tokio::fs::read(self.snapshot_path()).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_default(),
            Err(_) => Snapshot::default(),
        }
    }

    async fn save_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        let path = self.snapshot_path();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::storage_io(e.to_string()))?;
        }
        let bytes = serde_json::to_vec_pretty(snapshot).map_err(|e| Error::storage_io(e.to_string()))?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| Error::storage_io(e.to_string()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| Error::storage_io(e.to_string()))?;
        Ok(())
    }

    /// Walk the folder, diff against the last persisted fingerprint
    /// snapshot, and process every added/modified/deleted file. This is the
    /// startup-time full scan, and the fallback run after any watcher gap.
    #[instrument(skip(self, cancel), fields(root = %self.root.display()))]
    pub async fn run_full_scan(&self, cancel: CancellationToken) -> Result<ReindexSummary> {
        let started = std::time::Instant::now();
        let prev = self.load_snapshot().await;
        let root = self.root.clone();
        let include = self.include_extensions.clone();
        let (cur, fp_failures) =
            tokio::task::spawn_blocking(move || fingerprint::snapshot(&root, &include))
                .await
                .map_err(|e| Error::internal(e.to_string()))?;
        for failure in fp_failures {
            let _ = self.storage.record_failure(failure).await;
        }

        let diff = fingerprint::diff(&prev, &cur);
        let mut changed: Vec<PathBuf> = diff.added;
        changed.extend(diff.modified);

        let summary = self
            .process_batch(changed, diff.deleted, &cur, cancel)
            .await?;
        self.save_snapshot(&cur).await?;
        info!(
            indexed = summary.indexed,
            failed_quality = summary.failed_quality,
            parse_failed = summary.parse_failed,
            deleted = summary.deleted,
            "full scan complete"
        );
        let _ = self
            .events
            .publish(ChangeEvent::ReindexCompleted { folder: self.root.clone() })
            .await;
        crate::infrastructure::metrics::record_reindex_duration(
            &self.root.display().to_string(),
            started.elapsed(),
        );
        Ok(summary)
    }

    /// Process a batch of changed/deleted paths reported by the file
    /// watcher. `snapshot` must be the fingerprint snapshot the caller
    /// computed the batch against, so content hashes land on committed
    /// documents; callers that don't track their own snapshot should prefer
    /// [`Self::run_full_scan`].
    #[instrument(skip(self, changed, deleted, snapshot, cancel))]
    pub async fn process_batch(
        &self,
        changed: Vec<PathBuf>,
        deleted: Vec<PathBuf>,
        snapshot: &Snapshot,
        cancel: CancellationToken,
    ) -> Result<ReindexSummary> {
        let mut summary = ReindexSummary::default();

        for path in &deleted {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let document_id = document_id_for(path);
            if let Err(err) = self.storage.delete_document(&document_id).await {
                warn!(path = %path.display(), %err, "failed to delete document");
                continue;
            }
            let _ = self
                .events
                .publish(ChangeEvent::DocumentDeleted {
                    folder: self.root.clone(),
                    document_id,
                })
                .await;
            summary.deleted += 1;
        }

        let semaphore = Arc::new(Semaphore::new(self.file_concurrency.max(1)));
        let mut tasks = Vec::with_capacity(changed.len());
        for relative in changed {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let Some(fingerprint) = snapshot.get(&relative).cloned() else {
                continue;
            };
            let semaphore = semaphore.clone();
            let this = self.clone_handles();
            let cancel = cancel.clone();
            tasks.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                this.process_one(&relative, fingerprint.hash, &cancel).await
            }));
        }

        for task in tasks {
            match task.await {
                Ok(Ok(status)) => match status {
                    ParseStatus::Ok => summary.indexed += 1,
                    ParseStatus::FailedQuality => summary.failed_quality += 1,
                    ParseStatus::Failed | ParseStatus::Skipped => summary.parse_failed += 1,
                },
                Ok(Err(err)) if err.is_cancelled() => return Err(Error::Cancelled),
                Ok(Err(err)) => {
                    warn!(%err, "document processing failed");
                    summary.parse_failed += 1;
                }
                Err(join_err) => {
                    warn!(%join_err, "document processing task panicked");
                    summary.parse_failed += 1;
                }
            }
        }

        Ok(summary)
    }

    /// A lightweight, `Arc`-backed clone used to move this orchestrator's
    /// shared collaborators into a spawned task without cloning `self`
    /// itself (this type is not `Clone` to keep its fields deliberate).
    fn clone_handles(&self) -> FolderOrchestrator {
        FolderOrchestrator {
            root: self.root.clone(),
            storage: self.storage.clone(),
            parsers: self.parsers.clone(),
            embeddings: self.embeddings.clone(),
            extractor: self.extractor.clone(),
            events: self.events.clone(),
            include_extensions: self.include_extensions.clone(),
            file_concurrency: self.file_concurrency,
        }
    }

    /// The folder root this orchestrator owns.
    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn process_one(
        &self,
        relative: &Path,
        content_hash: u64,
        cancel: &CancellationToken,
    ) -> Result<ParseStatus> {
        let document_id = document_id_for(relative);
        let absolute = self.root.join(relative);

        let bytes = match tokio::fs::read(&absolute).await {
            Ok(bytes) => bytes,
            Err(err) => {
                self.record_and_return_failed(&document_id, FailureScope::Parse, err.to_string())
                    .await?;
                return Ok(ParseStatus::Failed);
            }
        };

        let parsed = match self.parsers.parse(&absolute, &bytes) {
            Ok(parsed) => parsed,
            Err(Error::SkippedBinary { .. }) => return Ok(ParseStatus::Skipped),
            Err(err) => {
                self.record_and_return_failed(&document_id, FailureScope::Parse, err.to_string())
                    .await?;
                return Ok(ParseStatus::Failed);
            }
        };

        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let drafts = chunk_text(&parsed.text, &parsed.structure);
        let mut passages: Vec<String> = drafts.iter().map(|d| d.text.clone()).collect();
        let filename_text = tokenize_filename(relative);
        passages.push(filename_text.clone());

        let embeddings = self.embeddings.embed_passages(&passages).await;
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let mut chunks = Vec::with_capacity(drafts.len() + 1);
        for (index, (draft, embedding)) in drafts.into_iter().zip(embeddings.iter()).enumerate() {
            let embedding = match embedding {
                Ok(e) => Some(e.clone()),
                Err(err) => {
                    self.storage
                        .record_failure(failure_record(
                            FailureScope::Embedding,
                            &document_id,
                            Some(index as i64),
                            err.to_string(),
                        ))
                        .await?;
                    None
                }
            };

            let semantics = self
                .extractor
                .extract(&draft.text, embedding.as_ref(), self.embeddings.raw_service())
                .await;
            let (topics, key_phrases, readability, confidence, method) = match semantics {
                Ok(s) if s.confidence < crate::domain::constants::CHUNK_CONFIDENCE_FLOOR => {
                    self.storage
                        .record_failure(failure_record(
                            FailureScope::ChunkSemantic,
                            &document_id,
                            Some(index as i64),
                            format!(
                                "extraction confidence {:.2} below floor {:.2}",
                                s.confidence,
                                crate::domain::constants::CHUNK_CONFIDENCE_FLOOR
                            ),
                        ))
                        .await?;
                    (Vec::new(), Vec::new(), Some(s.readability), s.confidence, ExtractionMethod::AggregationOnly)
                }
                Ok(s) => (s.topics, s.key_phrases, Some(s.readability), s.confidence, s.method),
                Err(err) => {
                    self.storage
                        .record_failure(failure_record(
                            FailureScope::ChunkSemantic,
                            &document_id,
                            Some(index as i64),
                            err.to_string(),
                        ))
                        .await?;
                    (Vec::new(), Vec::new(), None, 0.0, ExtractionMethod::AggregationOnly)
                }
            };

            chunks.push(Chunk {
                document_id: document_id.clone(),
                chunk_index: index as i64,
                text: draft.text,
                span: Some(draft.span),
                heading: draft.heading,
                topics,
                key_phrases,
                readability,
                embedding,
                extraction_method: method,
                extraction_confidence: confidence,
            });
        }

        let filename_embedding = embeddings
            .last()
            .and_then(|r| r.as_ref().ok())
            .cloned();
        chunks.push(Chunk {
            document_id: document_id.clone(),
            chunk_index: FILENAME_CHUNK_INDEX,
            text: filename_text,
            span: None,
            heading: None,
            topics: Vec::new(),
            key_phrases: Vec::new(),
            readability: None,
            embedding: filename_embedding,
            extraction_method: ExtractionMethod::AggregationOnly,
            extraction_confidence: 1.0,
        });

        let content_chunks: Vec<Chunk> = chunks
            .iter()
            .filter(|c| !c.is_filename_chunk())
            .cloned()
            .collect();

        // §7: `quality_below_floor` rejects the commit outright — the
        // previous successful version, if any, stays authoritative. Only a
        // clean aggregation reaches `upsert_document`.
        match aggregate(&content_chunks, 0) {
            AggregationOutcome::Ok(summary) => {
                let status = ParseStatus::Ok;
                let document = Document {
                    id: document_id.clone(),
                    path: relative.to_path_buf(),
                    content_hash,
                    parser: parsed.parser_name.to_string(),
                    status,
                    semantic_summary: Some(summary),
                    last_processed_at: Utc::now(),
                };

                retry_with_backoff(
                    crate::domain::constants::MAX_RETRY_ATTEMPTS,
                    crate::domain::constants::RETRY_BASE_DELAY,
                    "storage_commit",
                    || {
                        let document = document.clone();
                        let chunks = chunks.clone();
                        async { self.storage.upsert_document(document, chunks).await }
                    },
                )
                .await?;

                self.storage.clear_failure(&document_id, None).await?;
                crate::infrastructure::metrics::record_document_indexed(
                    &self.root.display().to_string(),
                    &status.to_string(),
                );
                let _ = self
                    .events
                    .publish(ChangeEvent::DocumentUpserted {
                        folder: self.root.clone(),
                        document: Box::new(document),
                    })
                    .await;
                Ok(status)
            }
            AggregationOutcome::FailedQuality { reasons, .. } => {
                self.storage
                    .record_failure(failure_record(
                        FailureScope::Aggregate,
                        &document_id,
                        None,
                        reasons.join("; "),
                    ))
                    .await?;
                crate::infrastructure::metrics::record_document_indexed(
                    &self.root.display().to_string(),
                    &ParseStatus::FailedQuality.to_string(),
                );
                Ok(ParseStatus::FailedQuality)
            }
        }
    }

    async fn record_and_return_failed(
        &self,
        document_id: &str,
        scope: FailureScope,
        message: String,
    ) -> Result<()> {
        crate::infrastructure::metrics::record_stage_failure(
            &self.root.display().to_string(),
            &scope.to_string(),
        );
        self.storage
            .record_failure(failure_record(scope, document_id, None, message))
            .await
    }
}

fn failure_record(
    scope: FailureScope,
    document_id: &str,
    chunk_index: Option<i64>,
    message: String,
) -> FailureRecord {
    let now = Utc::now();
    FailureRecord {
        scope,
        document_id: document_id.to_string(),
        chunk_index,
        message,
        attempts: 1,
        first_seen_at: now,
        last_seen_at: now,
    }
}

/// A document's stable id: its folder-relative path, forward-slash
/// normalized so it's stable across platforms.
fn document_id_for(relative: &Path) -> String {
    relative.to_string_lossy().replace('\\', "/")
}

/// Tokenized filename text fed to the filename chunk, e.g.
/// `"budget_q4_2025_v2.md"` -> `"budget q4 2025 v2"`.
fn tokenize_filename(relative: &Path) -> String {
    let stem = relative
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    stem.split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::NullEventPublisher;
    use crate::adapters::providers::embedding::null::NullEmbeddingService;
    use crate::adapters::storage::FolderStore;
    use crate::domain::semantics::build_extractor;
    use crate::domain::types::ExtractionStrategy;
    use tempfile::tempdir;

    async fn build_orchestrator(root: &Path) -> FolderOrchestrator {
        let storage: Arc<dyn Storage> = Arc::new(FolderStore::open(root).await.unwrap());
        let parsers = Arc::new(ParserDispatcher::with_defaults());
        let embeddings = Arc::new(EmbeddingWorkerPool::with_defaults(Arc::new(
            NullEmbeddingService::new(32),
        )));
        let extractor: Arc<dyn ChunkSemanticExtractor> =
            Arc::from(build_extractor(ExtractionStrategy::Rich));
        FolderOrchestrator::new(
            root.to_path_buf(),
            storage,
            parsers,
            embeddings,
            extractor,
            Arc::new(NullEventPublisher),
            vec!["txt".to_string(), "md".to_string()],
        )
    }

    #[tokio::test]
    async fn full_scan_indexes_new_files() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("report.txt"),
            "This is a reasonably detailed report about quarterly revenue growth. \
             It discusses market trends, customer retention, and product roadmap decisions \
             with specific numeric targets for the coming fiscal year.",
        )
        .unwrap();

        let orchestrator = build_orchestrator(dir.path()).await;
        let summary = orchestrator.run_full_scan(CancellationToken::new()).await.unwrap();
        assert_eq!(summary.parse_failed, 0);
        assert_eq!(summary.indexed + summary.failed_quality, 1);
    }

    #[tokio::test]
    async fn deleted_file_removes_document_on_next_scan() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("note.txt");
        std::fs::write(
            &file_path,
            "Some moderately long note content discussing several distinct ideas and topics \
             so that chunk semantic extraction has enough signal to succeed reliably.",
        )
        .unwrap();

        let orchestrator = build_orchestrator(dir.path()).await;
        orchestrator.run_full_scan(CancellationToken::new()).await.unwrap();

        std::fs::remove_file(&file_path).unwrap();
        let summary = orchestrator.run_full_scan(CancellationToken::new()).await.unwrap();
        assert_eq!(summary.deleted, 1);
    }

    #[test]
    fn document_id_normalizes_path_separators() {
        assert_eq!(document_id_for(Path::new("a/b.txt")), "a/b.txt");
    }

    #[test]
    fn tokenize_filename_lowercases_and_splits() {
        assert_eq!(tokenize_filename(Path::new("Budget_Q4-2025.md")), "budget q4 2025");
    }
}
