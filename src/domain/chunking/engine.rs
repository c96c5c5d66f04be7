//! The paragraph/sentence-aware text chunker.
//!
//! Produces chunks that respect, in priority order: (1) never split inside a
//! sentence, (2) prefer paragraph boundaries, (3) target 200–500 tokens,
//! (4) overlap consecutive chunks by 10% of target size, (5) carry the
//! nearest preceding heading as a structural hint.

use super::sentence::{paragraph_spans, sentence_spans, Span};
use super::tokenizer::estimate_tokens;
use crate::domain::constants::{CHUNK_OVERLAP_RATIO, CHUNK_TOKENS_MAX, CHUNK_TOKENS_MIN};
use crate::domain::types::StructuralHint;

/// A chunk of text produced by the chunker, not yet enriched with semantics
/// or an embedding. The orchestrator fans this out to the Chunk Semantic
/// Extractor and the Embedding Worker Pool.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkDraft {
    /// Byte span within the document's parsed text.
    pub span: Span,
    /// The chunk's text, equal to `text[span.0..span.1]`.
    pub text: String,
    /// Nearest preceding section heading, if any.
    pub heading: Option<String>,
}

struct Sentence {
    span: Span,
    tokens: usize,
    paragraph_start: bool,
}

/// Splits `text` into semantic chunks, carrying structural hints from
/// `structure` (typically headings) onto every chunk within their section.
pub fn chunk_text(text: &str, structure: &[StructuralHint]) -> Vec<ChunkDraft> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let sentences = collect_sentences(text);
    if sentences.is_empty() {
        return Vec::new();
    }

    let target = (CHUNK_TOKENS_MIN + CHUNK_TOKENS_MAX) / 2;
    let overlap_tokens = ((target as f32) * CHUNK_OVERLAP_RATIO).round() as usize;

    let mut drafts = Vec::new();
    let mut idx = 0usize;

    while idx < sentences.len() {
        let start_idx = idx;
        let mut tokens = 0usize;

        while idx < sentences.len() {
            let candidate = tokens + sentences[idx].tokens;
            if tokens > 0 && candidate > CHUNK_TOKENS_MAX {
                break;
            }
            tokens = candidate;
            idx += 1;
            let reached_min = tokens >= CHUNK_TOKENS_MIN;
            let next_is_paragraph_start = sentences
                .get(idx)
                .map(|s| s.paragraph_start)
                .unwrap_or(false);
            if reached_min && next_is_paragraph_start {
                break;
            }
        }
        let end_idx = idx;

        let chunk_span = (
            sentences[start_idx].span.0,
            sentences[end_idx - 1].span.1,
        );
        let heading = nearest_heading(structure, chunk_span.0);
        drafts.push(ChunkDraft {
            span: chunk_span,
            text: text[chunk_span.0..chunk_span.1].to_string(),
            heading,
        });

        if end_idx >= sentences.len() {
            break;
        }

        // Step back to realize the configured overlap, never before start_idx + 1
        // so the window always makes forward progress.
        let mut back = end_idx;
        let mut budget = overlap_tokens;
        while back > start_idx + 1 && budget > 0 {
            back -= 1;
            budget = budget.saturating_sub(sentences[back].tokens);
        }
        idx = back.max(start_idx + 1);
    }

    drafts
}

fn collect_sentences(text: &str) -> Vec<Sentence> {
    let mut sentences = Vec::new();
    for paragraph in paragraph_spans(text) {
        let slice = &text[paragraph.0..paragraph.1];
        for (i, (s, e)) in sentence_spans(slice).into_iter().enumerate() {
            let span = (paragraph.0 + s, paragraph.0 + e);
            sentences.push(Sentence {
                span,
                tokens: estimate_tokens(&text[span.0..span.1]),
                paragraph_start: i == 0,
            });
        }
    }
    sentences
}

fn nearest_heading(structure: &[StructuralHint], before: usize) -> Option<String> {
    structure
        .iter()
        .filter(|h| h.kind == "heading" && h.span.0 <= before)
        .max_by_key(|h| h.span.0)
        .map(|h| h.label.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(chunk_text("", &[]).is_empty());
        assert!(chunk_text("   \n\n  ", &[]).is_empty());
    }

    #[test]
    fn never_splits_mid_sentence() {
        let text = "This is one sentence that is reasonably long for a test case. \
            And here is another sentence following right after the first one.";
        let drafts = chunk_text(text, &[]);
        for draft in &drafts {
            assert!(draft.text.trim_end().ends_with(['.', '!', '?']) || draft.text.len() == text.trim().len());
        }
    }

    #[test]
    fn attaches_nearest_preceding_heading() {
        let text = "Intro sentence one. Intro sentence two.\n\nBody sentence one. Body sentence two.";
        let structure = vec![StructuralHint {
            kind: "heading".to_string(),
            label: "Body".to_string(),
            span: (42, 42),
            level: Some(2),
        }];
        let drafts = chunk_text(text, &structure);
        assert!(drafts.iter().any(|d| d.heading.as_deref() == Some("Body")));
    }

    #[test]
    fn long_document_produces_overlapping_chunks() {
        let sentence = "The quick brown fox jumps over the lazy dog in the warm afternoon sun. ";
        let text = sentence.repeat(60);
        let drafts = chunk_text(&text, &[]);
        assert!(drafts.len() > 1);
        for w in drafts.windows(2) {
            assert!(w[1].span.0 < w[0].span.1, "consecutive chunks should overlap");
        }
    }

    proptest! {
        #[test]
        fn chunking_arbitrary_sentence_counts_never_splits_mid_sentence(sentence_count in 1usize..80) {
            let sentence = "Revenue grew in the quarter due to strong retention and new enterprise deals. ";
            let text = sentence.repeat(sentence_count);
            let drafts = chunk_text(&text, &[]);

            for draft in &drafts {
                let trimmed = draft.text.trim_end();
                prop_assert!(
                    trimmed.is_empty() || trimmed.ends_with(['.', '!', '?']),
                    "chunk did not end on a sentence boundary: {trimmed:?}"
                );
            }
            for draft in &drafts {
                prop_assert_eq!(&text[draft.span.0..draft.span.1], draft.text.as_str());
            }
        }
    }
}
