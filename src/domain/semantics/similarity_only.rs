//! Similarity-only extraction strategy: candidate phrases ranked by
//! embedding cosine similarity against the chunk's own embedding, used when
//! the model offers no richer linguistic signal.

use super::keyphrase::{candidates, group_similar};
use super::readability;
use super::{ChunkSemantics, ChunkSemanticExtractor};
use crate::domain::error::Result;
use crate::domain::ports::embedding::EmbeddingService;
use crate::domain::types::{Embedding, ExtractionMethod, ScoredTerm};
use async_trait::async_trait;

const DEDUP_THRESHOLD: f32 = 0.6;
/// Cap on candidate phrases embedded per chunk, to bound the number of
/// embedding calls this strategy issues.
const MAX_CANDIDATES: usize = 24;

/// Embedding-cosine-ranked key phrase and topic extraction.
#[derive(Debug, Clone, Default)]
pub struct SimilarityOnlyExtractor;

#[async_trait]
impl ChunkSemanticExtractor for SimilarityOnlyExtractor {
    async fn extract(
        &self,
        text: &str,
        embedding: Option<&Embedding>,
        embedding_service: &dyn EmbeddingService,
    ) -> Result<ChunkSemantics> {
        let centroid = match embedding {
            Some(e) => e.clone(),
            None => Embedding {
                vector: embedding_service.embed(text).await?,
                model: embedding_service.capabilities().model_id,
                dimensions: embedding_service.dimensions(),
            },
        };

        let all = candidates(text);
        let grouped = group_similar(all, DEDUP_THRESHOLD);
        let mut top: Vec<_> = grouped.into_iter().collect();
        top.sort_by(|a, b| b.frequency.cmp(&a.frequency));
        top.truncate(MAX_CANDIDATES);

        if top.is_empty() {
            return Ok(ChunkSemantics {
                topics: Vec::new(),
                key_phrases: Vec::new(),
                readability: readability::score(text),
                confidence: 0.0,
                method: ExtractionMethod::SimilarityOnly,
            });
        }

        let phrase_texts: Vec<String> = top.iter().map(|c| c.text.clone()).collect();
        let phrase_vectors = embedding_service.embed_batch(&phrase_texts).await?;

        let dims = centroid.dimensions;
        let mut scored: Vec<ScoredTerm> = top
            .iter()
            .zip(phrase_vectors.into_iter())
            .map(|(candidate, vector)| {
                let phrase_embedding = Embedding {
                    vector,
                    model: centroid.model.clone(),
                    dimensions: dims,
                };
                ScoredTerm {
                    term: candidate.text.clone(),
                    score: centroid.cosine_similarity(&phrase_embedding).max(0.0),
                }
            })
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

        let key_phrases = scored.clone();
        let topics: Vec<ScoredTerm> = scored
            .into_iter()
            .filter(|t| t.term.split_whitespace().count() == 1)
            .take(15)
            .collect();
        let topics = if topics.is_empty() {
            key_phrases.iter().take(5).cloned().collect()
        } else {
            topics
        };

        let confidence = key_phrases
            .first()
            .map(|t| t.score.clamp(0.0, 1.0))
            .unwrap_or(0.0);

        Ok(ChunkSemantics {
            topics,
            key_phrases,
            readability: readability::score(text),
            confidence,
            method: ExtractionMethod::SimilarityOnly,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::providers::embedding::null::NullEmbeddingService;

    #[tokio::test]
    async fn ranks_candidates_by_cosine_similarity() {
        let extractor = SimilarityOnlyExtractor;
        let service = NullEmbeddingService::new(8);
        let text = "vector search vector search vector index folder watcher folder watcher";
        let out = extractor.extract(text, None, &service).await.unwrap();
        assert!(!out.key_phrases.is_empty());
        assert_eq!(out.method, ExtractionMethod::SimilarityOnly);
    }
}
