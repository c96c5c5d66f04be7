//! Folder Aggregator (§4.10): rolls up direct-child documents' semantic
//! summaries into a folder-level [`SemanticPreview`].
//!
//! Aggregation is direct-children-only — a folder's preview reflects the
//! documents sitting immediately inside it, not its entire subtree, so a
//! deeply-nested folder doesn't drown out its siblings' previews. There is
//! no timer-based cache here; [`crate::infrastructure::cache`] is the layer
//! responsible for memoizing this call and invalidating on upsert/delete.

use crate::domain::types::{
    Document, ExtractionMethod, ParseStatus, PreviewQuality, SemanticPreview, TopicFrequencies,
};

/// Aggregates `documents` (expected to be the direct children of one
/// folder, as returned by `Storage::query_documents_under(path, true)`)
/// into a [`SemanticPreview`]. §7: documents in `failed`/`failed_quality`
/// are excluded from the frequency counts entirely.
pub fn aggregate(documents: &[Document]) -> SemanticPreview {
    let summaries: Vec<&crate::domain::types::DocumentSemanticSummary> = documents
        .iter()
        .filter(|d| {
            !matches!(
                d.status,
                ParseStatus::Failed | ParseStatus::Skipped | ParseStatus::FailedQuality
            )
        })
        .filter_map(|d| d.semantic_summary.as_ref())
        .collect();

    if summaries.is_empty() {
        return SemanticPreview::default();
    }

    let (mut order, frequencies) = topic_frequencies(&summaries);
    // Stable sort by descending frequency; `order` is already in
    // first-seen order, so equal-frequency topics keep that order
    // (earlier appearance wins ties) rather than being reshuffled.
    order.sort_by_key(|term| std::cmp::Reverse(frequencies.get(&term.to_lowercase()).copied().unwrap_or(0)));
    order.truncate(10);
    let top_topics = order;

    let avg_readability =
        summaries.iter().map(|s| s.avg_readability).sum::<f32>() / summaries.len() as f32;
    let phrase_diversity =
        summaries.iter().map(|s| s.phrase_richness).sum::<f32>() / summaries.len() as f32;
    let rich_count = summaries
        .iter()
        .filter(|s| s.extraction_method == ExtractionMethod::Rich)
        .count();
    let topic_specificity = rich_count as f32 / summaries.len() as f32;

    SemanticPreview {
        top_topics,
        avg_readability,
        quality: PreviewQuality {
            phrase_diversity,
            topic_specificity,
        },
    }
}

/// Raw per-folder topic frequency table, plus the order topics first
/// appeared in (used to tie-break equal-frequency topics toward the one
/// seen earliest, rather than an arbitrary hash order).
fn topic_frequencies(
    summaries: &[&crate::domain::types::DocumentSemanticSummary],
) -> (Vec<String>, TopicFrequencies) {
    let mut order = Vec::new();
    let mut frequencies = TopicFrequencies::new();
    for summary in summaries {
        for topic in &summary.top_topics {
            let key = topic.term.to_lowercase();
            if !frequencies.contains_key(&key) {
                order.push(topic.term.clone());
            }
            *frequencies.entry(key).or_insert(0) += 1;
        }
    }
    (order, frequencies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{DocumentSemanticSummary, ParseStatus, ScoredTerm};
    use chrono::Utc;
    use std::path::PathBuf;

    fn doc_with_topics(topics: &[&str], readability: f32) -> Document {
        Document {
            id: "id".into(),
            path: PathBuf::from("a.txt"),
            content_hash: 1,
            parser: "plain_text".into(),
            status: ParseStatus::Ok,
            semantic_summary: Some(DocumentSemanticSummary {
                top_topics: topics
                    .iter()
                    .map(|t| ScoredTerm { term: t.to_string(), score: 1.0 })
                    .collect(),
                top_key_phrases: Vec::new(),
                avg_readability: readability,
                topic_diversity: 0.0,
                phrase_richness: 0.7,
                semantic_coherence: 0.8,
                extraction_method: ExtractionMethod::Rich,
                coverage: 1.0,
                confidence: 0.9,
                processing_time_ms: 1,
                primary_theme: topics.first().map(|t| t.to_string()),
            }),
            last_processed_at: Utc::now(),
        }
    }

    #[test]
    fn empty_documents_yield_default_preview() {
        let preview = aggregate(&[]);
        assert!(preview.top_topics.is_empty());
    }

    #[test]
    fn more_frequent_topics_rank_first() {
        let docs = vec![
            doc_with_topics(&["budget", "forecast"], 50.0),
            doc_with_topics(&["budget"], 60.0),
        ];
        let preview = aggregate(&docs);
        assert_eq!(preview.top_topics.first().map(|s| s.as_str()), Some("budget"));
    }

    #[test]
    fn readability_is_averaged_across_documents() {
        let docs = vec![doc_with_topics(&["x"], 40.0), doc_with_topics(&["y"], 60.0)];
        let preview = aggregate(&docs);
        assert!((preview.avg_readability - 50.0).abs() < 1e-6);
    }
}
