//! Shared candidate-phrase generation used by both extraction strategies.

use crate::domain::chunking::tokenizer::tokenize;
use std::collections::HashSet;
use std::sync::LazyLock;

static STOPWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "a", "an", "the", "and", "or", "but", "if", "then", "else", "of", "in", "on", "at", "to",
        "for", "with", "by", "from", "as", "is", "are", "was", "were", "be", "been", "being",
        "this", "that", "these", "those", "it", "its", "their", "his", "her", "he", "she",
        "they", "we", "you", "i", "not", "no", "can", "will", "would", "should", "could", "may",
        "might", "must", "do", "does", "did", "have", "has", "had", "which", "who", "what",
        "when", "where", "why", "how", "also", "than", "into", "about", "such", "each", "more",
    ]
    .into_iter()
    .collect()
});

/// A candidate phrase with the number of words it contains.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// The candidate phrase text.
    pub text: String,
    /// Raw frequency within the chunk.
    pub frequency: usize,
    /// Number of words in the phrase.
    pub word_count: usize,
}

/// Generates unigram, bigram, and trigram candidates from `text`, dropping
/// candidates that start or end on a stopword (a standard RAKE-style
/// boundary rule that favors multi-word phrases over stray function words).
pub fn candidates(text: &str) -> Vec<Candidate> {
    let words: Vec<String> = tokenize(text)
        .into_iter()
        .filter(|t| t.chars().next().map(|c| c.is_alphanumeric()).unwrap_or(false))
        .map(|t| t.to_lowercase())
        .collect();

    let mut counts: std::collections::HashMap<String, (usize, usize)> =
        std::collections::HashMap::new();

    for n in 1..=3usize {
        if words.len() < n {
            continue;
        }
        for window in words.windows(n) {
            if STOPWORDS.contains(window[0].as_str()) || STOPWORDS.contains(window[n - 1].as_str())
            {
                continue;
            }
            if n == 1 && STOPWORDS.contains(window[0].as_str()) {
                continue;
            }
            let phrase = window.join(" ");
            let entry = counts.entry(phrase).or_insert((0, n));
            entry.0 += 1;
        }
    }

    let mut out: Vec<Candidate> = counts
        .into_iter()
        .map(|(text, (frequency, word_count))| Candidate {
            text,
            frequency,
            word_count,
        })
        .collect();
    out.sort_by(|a, b| b.frequency.cmp(&a.frequency).then(a.text.cmp(&b.text)));
    out
}

/// Jaccard similarity between the word sets of two phrases.
pub fn jaccard(a: &str, b: &str) -> f32 {
    let set_a: HashSet<&str> = a.split_whitespace().collect();
    let set_b: HashSet<&str> = b.split_whitespace().collect();
    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }
    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();
    intersection as f32 / union as f32
}

/// Groups near-duplicate candidates (Jaccard similarity above `threshold`)
/// and keeps only the highest-frequency representative of each group.
pub fn group_similar(mut candidates: Vec<Candidate>, threshold: f32) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    let mut kept: Vec<Candidate> = Vec::new();
    'outer: for candidate in candidates {
        for existing in &kept {
            if jaccard(&candidate.text, &existing.text) >= threshold {
                continue 'outer;
            }
        }
        kept.push(candidate);
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_multi_word_candidates() {
        let cands = candidates("semantic search engine indexes semantic search results");
        assert!(cands.iter().any(|c| c.text == "semantic search"));
    }

    #[test]
    fn jaccard_identical_phrases_is_one() {
        assert_eq!(jaccard("vector index", "vector index"), 1.0);
    }

    #[test]
    fn groups_near_duplicates() {
        let cands = vec![
            Candidate { text: "vector index".into(), frequency: 5, word_count: 2 },
            Candidate { text: "vector index search".into(), frequency: 2, word_count: 3 },
            Candidate { text: "folder watcher".into(), frequency: 3, word_count: 2 },
        ];
        let grouped = group_similar(cands, 0.5);
        assert_eq!(grouped.len(), 2);
    }
}
