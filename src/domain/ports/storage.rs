//! The storage & index port: per-folder embedded database.
//!
//! One implementation backs every folder. Document upserts are write-ahead:
//! new rows and vectors are staged, the index is updated, then old rows are
//! removed within a single transaction — readers never observe a partial
//! document.

use crate::domain::error::Result;
use crate::domain::types::{Chunk, Document, FailureRecord};
use async_trait::async_trait;
use std::path::Path;

/// A chunk hit from [`Storage::vector_search`], paired with its raw cosine
/// similarity against the query vector.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorHit {
    /// The matched chunk.
    pub chunk: Chunk,
    /// Cosine similarity in `[-1, 1]`.
    pub similarity: f32,
}

/// Per-folder embedded database: documents, chunks, vectors, and the vector
/// index that sits over them.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Atomically replace the previous version of `document`, including
    /// index membership. `chunks` and `vectors` must be the same length and
    /// order; a chunk without a corresponding embedding is represented by
    /// `chunks[i].embedding = None` and is excluded from the index.
    async fn upsert_document(&self, document: Document, chunks: Vec<Chunk>) -> Result<()>;

    /// Atomically remove a document, its chunks, and its index entries.
    async fn delete_document(&self, document_id: &str) -> Result<()>;

    /// Fetch a document by id.
    async fn get_document(&self, document_id: &str) -> Result<Option<Document>>;

    /// Fetch documents whose path lies under `path_prefix`. When
    /// `direct_children_only` is set, only immediate children are returned
    /// (used by folder roll-ups).
    async fn query_documents_under(
        &self,
        path_prefix: &Path,
        direct_children_only: bool,
    ) -> Result<Vec<Document>>;

    /// Fetch the ordered chunks of a document, including chunk `-1` if present.
    async fn get_chunks(&self, document_id: &str) -> Result<Vec<Chunk>>;

    /// Top-K chunks by cosine similarity against `query_vector`, across both
    /// content and filename chunks.
    async fn vector_search(&self, query_vector: &[f32], k: usize) -> Result<Vec<VectorHit>>;

    /// Accelerated path for filename-biased search: filename chunks (index
    /// `-1`) whose tokenized text overlaps `tokens`.
    async fn filename_chunks_like(&self, tokens: &[String]) -> Result<Vec<VectorHit>>;

    /// Exact substring/word scan over chunk text for `terms`.
    async fn keyword_scan(&self, terms: &[String]) -> Result<Vec<Chunk>>;

    /// Record a stage failure. Replaces any existing record with the same
    /// scope/document/chunk, bumping `attempts`.
    async fn record_failure(&self, failure: FailureRecord) -> Result<()>;

    /// Clear a failure record after a successful retry.
    async fn clear_failure(&self, document_id: &str, chunk_index: Option<i64>) -> Result<()>;

    /// All currently-recorded failures for a folder.
    async fn list_failures(&self) -> Result<Vec<FailureRecord>>;
}
