//! Chunk Semantic Extractor (§4.4): two interchangeable strategies selected
//! by the folder's embedding model capabilities.

/// Keyphrase / topic candidate generation shared by both strategies.
pub mod keyphrase;
/// Readability scoring.
pub mod readability;
/// Rich extraction strategy.
pub mod rich;
/// Similarity-only extraction strategy.
pub mod similarity_only;

use crate::domain::error::Result;
use crate::domain::ports::embedding::EmbeddingService;
use crate::domain::types::{Embedding, ExtractionMethod, ScoredTerm};
use async_trait::async_trait;

/// Per-chunk semantics produced by a [`ChunkSemanticExtractor`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkSemantics {
    /// Topics, ordered by score, highest first.
    pub topics: Vec<ScoredTerm>,
    /// Key phrases, ordered by score, highest first.
    pub key_phrases: Vec<ScoredTerm>,
    /// Readability score, normalized 0-100.
    pub readability: f32,
    /// Confidence in [0, 1] that the extracted semantics are correct.
    pub confidence: f32,
    /// Which strategy produced this result.
    pub method: ExtractionMethod,
}

/// Produces per-chunk topics, key phrases, readability, and a confidence
/// score. A chunk with confidence below
/// [`crate::domain::constants::CHUNK_CONFIDENCE_FLOOR`] is recorded as
/// failed by the caller; the pipeline continues but the Document Aggregator
/// accounts for the gap via coverage.
#[async_trait]
pub trait ChunkSemanticExtractor: Send + Sync {
    /// Extract semantics for `text`. `embedding`, if present, is the chunk's
    /// own embedding, used by the similarity-only strategy to score
    /// candidate phrases against the chunk centroid. `embedding_service` is
    /// used by the similarity-only strategy to embed small candidate
    /// batches; the rich strategy ignores it.
    async fn extract(
        &self,
        text: &str,
        embedding: Option<&Embedding>,
        embedding_service: &dyn EmbeddingService,
    ) -> Result<ChunkSemantics>;
}

/// Selects the extractor matching a folder's model capability.
pub fn build_extractor(
    strategy: crate::domain::types::ExtractionStrategy,
) -> Box<dyn ChunkSemanticExtractor> {
    use crate::domain::types::ExtractionStrategy;
    match strategy {
        ExtractionStrategy::Rich => Box::new(rich::RichExtractor::default()),
        ExtractionStrategy::SimilarityOnly => {
            Box::new(similarity_only::SimilarityOnlyExtractor::default())
        }
    }
}
