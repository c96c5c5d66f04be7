//! Readability scoring, normalized to a 0–100 scale.
//!
//! Implemented as a Flesch Reading Ease variant: technical prose (longer
//! words, longer sentences) lands in the 40–60 band that §4.4 expects.

use crate::domain::chunking::sentence::sentence_spans;
use crate::domain::chunking::tokenizer::tokenize;

/// Score the readability of `text`, normalized to `[0, 100]`.
///
/// Higher is easier to read. Empty or single-word text scores a neutral 50.
pub fn score(text: &str) -> f32 {
    let sentences = sentence_spans(text);
    let sentence_count = sentences.len().max(1) as f32;

    let words: Vec<&str> = tokenize(text)
        .into_iter()
        .filter(|t| t.chars().any(|c| c.is_alphanumeric()))
        .collect();
    if words.is_empty() {
        return 50.0;
    }
    let word_count = words.len() as f32;
    let syllable_count: usize = words.iter().map(|w| estimate_syllables(w)).sum();

    let words_per_sentence = word_count / sentence_count;
    let syllables_per_word = syllable_count as f32 / word_count;

    let raw = 206.835 - (1.015 * words_per_sentence) - (84.6 * syllables_per_word);
    raw.clamp(0.0, 100.0)
}

fn estimate_syllables(word: &str) -> usize {
    let lower = word.to_lowercase();
    let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
    let mut count = 0usize;
    let mut prev_was_vowel = false;
    for ch in lower.chars() {
        let v = is_vowel(ch);
        if v && !prev_was_vowel {
            count += 1;
        }
        prev_was_vowel = v;
    }
    if lower.ends_with('e') && count > 1 {
        count -= 1;
    }
    count.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_prose_scores_high() {
        let s = score("The cat sat on the mat. It was a sunny day.");
        assert!(s > 60.0, "expected easy prose to score high, got {s}");
    }

    #[test]
    fn technical_prose_scores_mid_range() {
        let s = score(
            "Implementations must instantiate a bounded concurrency primitive \
             to coordinate asynchronous embedding generation across workers.",
        );
        assert!((10.0..=70.0).contains(&s), "got {s}");
    }

    #[test]
    fn empty_text_is_neutral() {
        assert_eq!(score(""), 50.0);
    }
}
