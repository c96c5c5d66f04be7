//! Rich extraction strategy: multi-word key phrases and domain-specific
//! topics with confidence scores, using only linguistic heuristics (no
//! embedding calls).

use super::keyphrase::{candidates, group_similar, Candidate};
use super::readability;
use super::{ChunkSemantics, ChunkSemanticExtractor};
use crate::domain::error::Result;
use crate::domain::ports::embedding::EmbeddingService;
use crate::domain::types::{Embedding, ExtractionMethod, ScoredTerm};
use async_trait::async_trait;

/// Phrases within this Jaccard distance are treated as the same phrase.
const DEDUP_THRESHOLD: f32 = 0.6;
/// Candidates with 3+ characters and an uppercase letter, a digit, or a
/// hyphen are treated as domain-specific topic candidates.
fn is_domain_specific(text: &str) -> bool {
    text.len() > 3
        && (text.chars().any(|c| c.is_numeric())
            || text.contains('-')
            || text
                .split_whitespace()
                .any(|w| w.chars().next().map(|c| c.is_uppercase()).unwrap_or(false)))
}

/// Multi-word-biased, stopword-aware key phrase and topic extraction.
#[derive(Debug, Clone, Default)]
pub struct RichExtractor;

impl RichExtractor {
    fn score(candidate: &Candidate, max_frequency: usize) -> f32 {
        let frequency_score = candidate.frequency as f32 / max_frequency.max(1) as f32;
        let length_bonus = (candidate.word_count as f32 - 1.0).max(0.0) * 0.15;
        (frequency_score + length_bonus).min(1.0)
    }
}

#[async_trait]
impl ChunkSemanticExtractor for RichExtractor {
    async fn extract(
        &self,
        text: &str,
        _embedding: Option<&Embedding>,
        _embedding_service: &dyn EmbeddingService,
    ) -> Result<ChunkSemantics> {
        let all = candidates(text);
        let grouped = group_similar(all, DEDUP_THRESHOLD);
        let max_frequency = grouped.iter().map(|c| c.frequency).max().unwrap_or(1);

        let mut phrases: Vec<ScoredTerm> = grouped
            .iter()
            .map(|c| ScoredTerm {
                term: c.text.clone(),
                score: Self::score(c, max_frequency),
            })
            .collect();
        phrases.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        phrases.truncate(30);

        let mut topics: Vec<ScoredTerm> = grouped
            .iter()
            .filter(|c| is_domain_specific(&c.text))
            .map(|c| ScoredTerm {
                term: c.text.clone(),
                score: Self::score(c, max_frequency),
            })
            .collect();
        topics.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        topics.truncate(15);
        if topics.is_empty() {
            // Fall back to the top phrases so a chunk never reports zero
            // topics purely because no token looked "domain-specific".
            topics = phrases.iter().take(5).cloned().collect();
        }

        let confidence = if phrases.is_empty() {
            0.0
        } else {
            (phrases.len() as f32 / 10.0).min(1.0) * 0.9 + 0.1
        };

        Ok(ChunkSemantics {
            topics,
            key_phrases: phrases,
            readability: readability::score(text),
            confidence,
            method: ExtractionMethod::Rich,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::providers::embedding::null::NullEmbeddingService;

    #[tokio::test]
    async fn produces_mostly_multi_word_phrases() {
        let extractor = RichExtractor;
        let service = NullEmbeddingService::new(4);
        let text = "The semantic search engine builds a vector index. \
            The vector index supports semantic search over chunked documents. \
            Document chunking respects sentence boundaries and paragraph structure.";
        let out = extractor.extract(text, None, &service).await.unwrap();
        assert!(!out.key_phrases.is_empty());
        let multi_word = out
            .key_phrases
            .iter()
            .filter(|p| p.term.contains(' '))
            .count();
        assert!(multi_word * 10 >= out.key_phrases.len() * 5);
    }
}
