//! Storage & Index (§4.7): the per-folder embedded database.
//!
//! Backed by an in-process, reader-writer-guarded table (generalizing the
//! teacher's `FilesystemVectorStore` adapter pattern) with a write-ahead
//! atomic commit to a JSON snapshot under `<folder>/.folder-mcp/store.json`:
//! the new snapshot is written to a temp file and renamed into place, so a
//! reader never observes a partially-written file. Vector search is exact
//! brute-force cosine, which spec §4.7 explicitly allows up to the tens of
//! thousands of chunks.

use crate::domain::constants::FILENAME_CHUNK_INDEX;
use crate::domain::error::{Error, Result};
use crate::domain::ports::storage::{Storage, VectorHit};
use crate::domain::types::{Chunk, Document, FailureRecord, FailureScope};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StorageState {
    documents: HashMap<String, Document>,
    chunks: HashMap<String, Vec<Chunk>>,
    #[serde(default)]
    failures: Vec<FailureRecord>,
}

/// Per-folder embedded store: one instance owns `<folder>/.folder-mcp/`.
pub struct FolderStore {
    root: PathBuf,
    state: RwLock<StorageState>,
}

impl FolderStore {
    /// Open (or create) the store rooted at `folder`. Loads the last
    /// persisted snapshot, if any, so restart resumes from prior state.
    pub async fn open(folder: &Path) -> Result<Self> {
        let store_dir = folder.join(".folder-mcp");
        tokio::fs::create_dir_all(&store_dir)
            .await
            .map_err(|e| Error::storage_io(e.to_string()))?;

        let snapshot_path = store_dir.join("store.json");
        let state = match tokio::fs::read(&snapshot_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_default(),
            Err(_) => StorageState::default(),
        };

        Ok(Self {
            root: store_dir,
            state: RwLock::new(state),
        })
    }

    fn snapshot_path(&self) -> PathBuf {
        self.root.join("store.json")
    }

    /// Write-ahead persist: serialize to a temp file, then atomically
    /// rename over the prior snapshot.
    async fn persist(&self, state: &StorageState) -> Result<()> {
        let bytes =
            serde_json::to_vec_pretty(state).map_err(|e| Error::storage_io(e.to_string()))?;
        let tmp_path = self.root.join("store.json.tmp");
        tokio::fs::write(&tmp_path, &bytes)
            .await
            .map_err(|e| Error::storage_io(e.to_string()))?;
        tokio::fs::rename(&tmp_path, self.snapshot_path())
            .await
            .map_err(|e| Error::storage_io(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl Storage for FolderStore {
    async fn upsert_document(&self, document: Document, chunks: Vec<Chunk>) -> Result<()> {
        let mut state = self.state.write().await;
        state.documents.insert(document.id.clone(), document.clone());
        state.chunks.insert(document.id.clone(), chunks);
        self.persist(&state).await
    }

    async fn delete_document(&self, document_id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state.documents.remove(document_id);
        state.chunks.remove(document_id);
        state.failures.retain(|f| f.document_id != document_id);
        self.persist(&state).await
    }

    async fn get_document(&self, document_id: &str) -> Result<Option<Document>> {
        let state = self.state.read().await;
        Ok(state.documents.get(document_id).cloned())
    }

    async fn query_documents_under(
        &self,
        path_prefix: &Path,
        direct_children_only: bool,
    ) -> Result<Vec<Document>> {
        let state = self.state.read().await;
        let mut out: Vec<Document> = state
            .documents
            .values()
            .filter(|d| d.path.starts_with(path_prefix))
            .filter(|d| {
                if !direct_children_only {
                    return true;
                }
                d.path
                    .strip_prefix(path_prefix)
                    .map(|rest| rest.components().count() <= 1)
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        out.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(out)
    }

    async fn get_chunks(&self, document_id: &str) -> Result<Vec<Chunk>> {
        let state = self.state.read().await;
        Ok(state.chunks.get(document_id).cloned().unwrap_or_default())
    }

    async fn vector_search(&self, query_vector: &[f32], k: usize) -> Result<Vec<VectorHit>> {
        let state = self.state.read().await;
        let mut hits: Vec<VectorHit> = state
            .chunks
            .values()
            .flatten()
            .filter_map(|chunk| {
                let embedding = chunk.embedding.as_ref()?;
                Some(VectorHit {
                    chunk: chunk.clone(),
                    similarity: cosine(query_vector, &embedding.vector),
                })
            })
            .collect();
        hits.sort_by(|a, b| b.similarity.partial_cmp(&a.similarity).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(k);
        Ok(hits)
    }

    async fn filename_chunks_like(&self, tokens: &[String]) -> Result<Vec<VectorHit>> {
        let state = self.state.read().await;
        let query: std::collections::HashSet<String> =
            tokens.iter().map(|t| t.to_lowercase()).collect();
        let mut hits: Vec<VectorHit> = state
            .chunks
            .values()
            .flatten()
            .filter(|c| c.chunk_index == FILENAME_CHUNK_INDEX)
            .filter_map(|chunk| {
                let chunk_tokens: std::collections::HashSet<String> = chunk
                    .text
                    .split_whitespace()
                    .map(|t| t.to_lowercase())
                    .collect();
                let overlap = query.intersection(&chunk_tokens).count();
                if overlap == 0 {
                    return None;
                }
                let union = query.union(&chunk_tokens).count().max(1);
                Some(VectorHit {
                    chunk: chunk.clone(),
                    similarity: overlap as f32 / union as f32,
                })
            })
            .collect();
        hits.sort_by(|a, b| b.similarity.partial_cmp(&a.similarity).unwrap_or(std::cmp::Ordering::Equal));
        Ok(hits)
    }

    async fn keyword_scan(&self, terms: &[String]) -> Result<Vec<Chunk>> {
        let state = self.state.read().await;
        let lowered: Vec<String> = terms.iter().map(|t| t.to_lowercase()).collect();
        Ok(state
            .chunks
            .values()
            .flatten()
            .filter(|c| {
                let haystack = c.text.to_lowercase();
                lowered.iter().any(|t| haystack.contains(t.as_str()))
            })
            .cloned()
            .collect())
    }

    async fn record_failure(&self, failure: FailureRecord) -> Result<()> {
        let mut state = self.state.write().await;
        if let Some(existing) = state.failures.iter_mut().find(|f| {
            f.scope == failure.scope
                && f.document_id == failure.document_id
                && f.chunk_index == failure.chunk_index
        }) {
            existing.attempts += 1;
            existing.message = failure.message;
            existing.last_seen_at = Utc::now();
        } else {
            state.failures.push(failure);
        }
        self.persist(&state).await
    }

    async fn clear_failure(&self, document_id: &str, chunk_index: Option<i64>) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .failures
            .retain(|f| !(f.document_id == document_id && f.chunk_index == chunk_index));
        self.persist(&state).await
    }

    async fn list_failures(&self) -> Result<Vec<FailureRecord>> {
        let state = self.state.read().await;
        Ok(state.failures.clone())
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na <= f32::EPSILON || nb <= f32::EPSILON {
        0.0
    } else {
        dot / (na * nb)
    }
}

/// Scope marker for failures originating outside any single pipeline stage
/// (e.g. the fingerprint walk itself). Re-exported for adapters that need
/// to record a failure before a document id exists.
pub const UNSCOPED_FAILURE: FailureScope = FailureScope::Storage;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{Embedding, ExtractionMethod, ParseStatus};
    use tempfile::tempdir;

    fn doc(id: &str, path: &str) -> Document {
        Document {
            id: id.to_string(),
            path: PathBuf::from(path),
            content_hash: 1,
            parser: "plain_text".to_string(),
            status: ParseStatus::Ok,
            semantic_summary: None,
            last_processed_at: Utc::now(),
        }
    }

    fn chunk_with_vector(document_id: &str, index: i64, vector: Vec<f32>) -> Chunk {
        Chunk {
            document_id: document_id.to_string(),
            chunk_index: index,
            text: "some text".to_string(),
            span: Some((0, 9)),
            heading: None,
            topics: Vec::new(),
            key_phrases: Vec::new(),
            readability: Some(50.0),
            embedding: Some(Embedding {
                dimensions: vector.len(),
                vector,
                model: "test".to_string(),
            }),
            extraction_method: ExtractionMethod::Rich,
            extraction_confidence: 0.9,
        }
    }

    #[tokio::test]
    async fn upsert_then_get_round_trips() {
        let dir = tempdir().unwrap();
        let store = FolderStore::open(dir.path()).await.unwrap();
        let document = doc("d1", "a.txt");
        let chunks = vec![chunk_with_vector("d1", 0, vec![1.0, 0.0])];
        store.upsert_document(document.clone(), chunks.clone()).await.unwrap();

        let fetched = store.get_document("d1").await.unwrap().unwrap();
        assert_eq!(fetched.id, "d1");
        let fetched_chunks = store.get_chunks("d1").await.unwrap();
        assert_eq!(fetched_chunks.len(), 1);
    }

    #[tokio::test]
    async fn delete_removes_document_and_chunks() {
        let dir = tempdir().unwrap();
        let store = FolderStore::open(dir.path()).await.unwrap();
        store
            .upsert_document(doc("d1", "a.txt"), vec![chunk_with_vector("d1", 0, vec![1.0, 0.0])])
            .await
            .unwrap();
        store.delete_document("d1").await.unwrap();
        assert!(store.get_document("d1").await.unwrap().is_none());
        assert!(store.get_chunks("d1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn vector_search_ranks_by_cosine_similarity() {
        let dir = tempdir().unwrap();
        let store = FolderStore::open(dir.path()).await.unwrap();
        store
            .upsert_document(doc("d1", "a.txt"), vec![chunk_with_vector("d1", 0, vec![1.0, 0.0])])
            .await
            .unwrap();
        store
            .upsert_document(doc("d2", "b.txt"), vec![chunk_with_vector("d2", 0, vec![0.0, 1.0])])
            .await
            .unwrap();

        let hits = store.vector_search(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(hits[0].chunk.document_id, "d1");
        assert!(hits[0].similarity >= hits[1].similarity);
    }

    #[tokio::test]
    async fn snapshot_persists_across_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = FolderStore::open(dir.path()).await.unwrap();
            store
                .upsert_document(doc("d1", "a.txt"), vec![chunk_with_vector("d1", 0, vec![1.0])])
                .await
                .unwrap();
        }
        let reopened = FolderStore::open(dir.path()).await.unwrap();
        assert!(reopened.get_document("d1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn failure_record_attempts_increment_on_repeat() {
        let dir = tempdir().unwrap();
        let store = FolderStore::open(dir.path()).await.unwrap();
        let failure = FailureRecord {
            scope: FailureScope::Parse,
            document_id: "d1".to_string(),
            chunk_index: None,
            message: "boom".to_string(),
            attempts: 1,
            first_seen_at: Utc::now(),
            last_seen_at: Utc::now(),
        };
        store.record_failure(failure.clone()).await.unwrap();
        store.record_failure(failure).await.unwrap();
        let failures = store.list_failures().await.unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].attempts, 2);
    }
}
