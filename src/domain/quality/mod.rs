//! Document Aggregator (§4.6): merges per-chunk semantics into a
//! [`DocumentSemanticSummary`] and enforces the quality floor.
//!
//! Aggregation never edits a prior summary in place — every call recomputes
//! the summary from the document's current chunks.

use crate::domain::constants::{
    COHERENCE_SAMPLE_CAP, QUALITY_FLOOR_COVERAGE, QUALITY_FLOOR_PHRASE_RICHNESS,
    SUMMARY_PHRASES_MAX, SUMMARY_TOPICS_MAX,
};
use crate::domain::types::{Chunk, DocumentSemanticSummary, ExtractionMethod, ScoredTerm};
use std::collections::HashMap;

/// Outcome of aggregating a document's chunks.
pub enum AggregationOutcome {
    /// Coverage and phrase richness both cleared the quality floor.
    Ok(DocumentSemanticSummary),
    /// The quality floor was not met; carries the reasons so callers can
    /// report `failed_quality` without silently substituting a summary.
    FailedQuality {
        /// The summary that would have been produced, kept for outline display.
        summary: DocumentSemanticSummary,
        /// Human-readable reasons, e.g. `"coverage 0.70 < 0.80"`.
        reasons: Vec<String>,
    },
}

/// Aggregates `chunks` (content chunks only — the filename chunk at index
/// -1 is excluded by callers before this point) into a document-level
/// semantic summary, then checks the quality floor.
pub fn aggregate(chunks: &[Chunk], processing_time_ms: u64) -> AggregationOutcome {
    let total = chunks.len().max(1);
    let with_semantics: Vec<&Chunk> = chunks
        .iter()
        .filter(|c| !c.topics.is_empty() || !c.key_phrases.is_empty())
        .collect();
    let coverage = with_semantics.len() as f32 / total as f32;

    let top_topics = merge_terms(chunks.iter().flat_map(|c| c.topics.iter()), SUMMARY_TOPICS_MAX);
    let top_key_phrases = merge_terms(
        chunks.iter().flat_map(|c| c.key_phrases.iter()),
        SUMMARY_PHRASES_MAX,
    );

    let phrase_richness = richness(&top_key_phrases);
    let topic_diversity = shannon_entropy(chunks.iter().flat_map(|c| c.topics.iter()));
    let semantic_coherence = mean_pairwise_cosine(chunks);
    let confidence = weighted_confidence(chunks);
    let avg_readability = mean_readability(chunks);
    let extraction_method = dominant_method(chunks);
    let primary_theme = top_topics.first().map(|t| t.term.clone());

    let summary = DocumentSemanticSummary {
        top_topics,
        top_key_phrases,
        avg_readability,
        topic_diversity,
        phrase_richness,
        semantic_coherence,
        extraction_method,
        coverage,
        confidence,
        processing_time_ms,
        primary_theme,
    };

    let mut reasons = Vec::new();
    if coverage < QUALITY_FLOOR_COVERAGE {
        reasons.push(format!(
            "coverage {coverage:.2} < {QUALITY_FLOOR_COVERAGE:.2}"
        ));
    }
    if phrase_richness < QUALITY_FLOOR_PHRASE_RICHNESS {
        reasons.push(format!(
            "phrase_richness {phrase_richness:.2} < {QUALITY_FLOOR_PHRASE_RICHNESS:.2}"
        ));
    }

    if reasons.is_empty() {
        AggregationOutcome::Ok(summary)
    } else {
        AggregationOutcome::FailedQuality { summary, reasons }
    }
}

/// Merges terms by case-insensitive exact match, summing frequency
/// (occurrence count) and confidence (summed score), then keeps the top `n`.
fn merge_terms<'a>(terms: impl Iterator<Item = &'a ScoredTerm>, n: usize) -> Vec<ScoredTerm> {
    let mut merged: HashMap<String, (String, f32)> = HashMap::new();
    for term in terms {
        let key = term.term.to_lowercase();
        let entry = merged
            .entry(key)
            .or_insert_with(|| (term.term.clone(), 0.0));
        entry.1 += term.score;
    }
    let mut out: Vec<ScoredTerm> = merged
        .into_values()
        .map(|(term, score)| ScoredTerm { term, score })
        .collect();
    out.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    out.truncate(n);
    out
}

/// Fraction of `phrases` that contain more than one word.
fn richness(phrases: &[ScoredTerm]) -> f32 {
    if phrases.is_empty() {
        return 0.0;
    }
    let multi = phrases
        .iter()
        .filter(|p| p.term.split_whitespace().count() > 1)
        .count();
    multi as f32 / phrases.len() as f32
}

/// Shannon entropy of topic frequencies, in bits.
fn shannon_entropy<'a>(topics: impl Iterator<Item = &'a ScoredTerm>) -> f32 {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut total = 0usize;
    for t in topics {
        *counts.entry(t.term.to_lowercase()).or_insert(0) += 1;
        total += 1;
    }
    if total == 0 || counts.len() <= 1 {
        return 0.0;
    }
    let total = total as f32;
    -counts
        .values()
        .map(|&c| {
            let p = c as f32 / total;
            p * p.log2()
        })
        .sum::<f32>()
}

/// Mean pairwise cosine similarity between chunk embeddings, sampled down
/// to [`COHERENCE_SAMPLE_CAP`] chunks for large documents.
fn mean_pairwise_cosine(chunks: &[Chunk]) -> f32 {
    let embeddings: Vec<&crate::domain::types::Embedding> = chunks
        .iter()
        .filter_map(|c| c.embedding.as_ref())
        .take(COHERENCE_SAMPLE_CAP)
        .collect();
    if embeddings.len() < 2 {
        return 1.0;
    }
    let mut sum = 0.0f32;
    let mut count = 0usize;
    for i in 0..embeddings.len() {
        for j in (i + 1)..embeddings.len() {
            sum += embeddings[i].cosine_similarity(embeddings[j]);
            count += 1;
        }
    }
    if count == 0 {
        1.0
    } else {
        sum / count as f32
    }
}

/// Weighted mean of chunk confidences, weighted by chunk text length.
fn weighted_confidence(chunks: &[Chunk]) -> f32 {
    let mut weighted_sum = 0.0f32;
    let mut weight_total = 0.0f32;
    for chunk in chunks {
        let weight = chunk.text.len().max(1) as f32;
        weighted_sum += chunk.extraction_confidence * weight;
        weight_total += weight;
    }
    if weight_total <= f32::EPSILON {
        0.0
    } else {
        weighted_sum / weight_total
    }
}

fn mean_readability(chunks: &[Chunk]) -> f32 {
    let scores: Vec<f32> = chunks.iter().filter_map(|c| c.readability).collect();
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().sum::<f32>() / scores.len() as f32
}

/// The extraction method used by the majority of a document's chunks.
fn dominant_method(chunks: &[Chunk]) -> ExtractionMethod {
    let mut counts: HashMap<ExtractionMethod, usize> = HashMap::new();
    for c in chunks {
        *counts.entry(c.extraction_method).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by_key(|(_, n)| *n)
        .map(|(method, _)| method)
        .unwrap_or(ExtractionMethod::AggregationOnly)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Embedding;

    fn chunk(topics: &[&str], phrases: &[&str], confidence: f32) -> Chunk {
        Chunk {
            document_id: "doc".into(),
            chunk_index: 0,
            text: "some chunk text of moderate length".into(),
            span: Some((0, 10)),
            heading: None,
            topics: topics
                .iter()
                .map(|t| ScoredTerm {
                    term: t.to_string(),
                    score: 0.8,
                })
                .collect(),
            key_phrases: phrases
                .iter()
                .map(|t| ScoredTerm {
                    term: t.to_string(),
                    score: 0.8,
                })
                .collect(),
            readability: Some(55.0),
            embedding: Some(Embedding {
                vector: vec![0.1, 0.2, 0.3],
                model: "test".into(),
                dimensions: 3,
            }),
            extraction_method: ExtractionMethod::Rich,
            extraction_confidence: confidence,
        }
    }

    #[test]
    fn full_coverage_and_rich_phrases_pass_quality_floor() {
        let chunks = vec![
            chunk(&["vector search"], &["vector search", "folder watcher"], 0.9),
            chunk(&["vector search"], &["vector search", "chunk semantics"], 0.9),
        ];
        match aggregate(&chunks, 5) {
            AggregationOutcome::Ok(summary) => {
                assert!(summary.coverage >= 0.8);
                assert!(summary.phrase_richness >= 0.6);
                assert_eq!(summary.primary_theme.as_deref(), Some("vector search"));
            }
            AggregationOutcome::FailedQuality { reasons, .. } => {
                panic!("expected Ok, got failed_quality: {reasons:?}")
            }
        }
    }

    #[test]
    fn low_coverage_fails_quality_floor() {
        let mut without_semantics = chunk(&[], &[], 0.9);
        without_semantics.topics.clear();
        without_semantics.key_phrases.clear();
        let chunks = vec![
            chunk(&["topic"], &["rich phrase here"], 0.9),
            without_semantics.clone(),
            without_semantics.clone(),
            without_semantics,
        ];
        match aggregate(&chunks, 5) {
            AggregationOutcome::FailedQuality { reasons, .. } => {
                assert!(reasons.iter().any(|r| r.starts_with("coverage")));
            }
            AggregationOutcome::Ok(_) => panic!("expected failed_quality"),
        }
    }

    #[test]
    fn single_word_phrases_fail_richness_floor() {
        let chunks = vec![
            chunk(&["topic"], &["single", "word", "phrases", "only"], 0.9),
            chunk(&["topic"], &["single", "word", "phrases", "only"], 0.9),
        ];
        match aggregate(&chunks, 5) {
            AggregationOutcome::FailedQuality { reasons, .. } => {
                assert!(reasons.iter().any(|r| r.starts_with("phrase_richness")));
            }
            AggregationOutcome::Ok(_) => panic!("expected failed_quality"),
        }
    }

    #[test]
    fn entropy_is_zero_for_single_topic() {
        let terms = vec![
            ScoredTerm { term: "a".into(), score: 1.0 },
            ScoredTerm { term: "a".into(), score: 1.0 },
        ];
        assert_eq!(shannon_entropy(terms.iter()), 0.0);
    }
}
