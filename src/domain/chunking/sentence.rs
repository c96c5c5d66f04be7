//! Sentence and paragraph boundary detection.

use std::sync::LazyLock;

/// Common abbreviations whose trailing period is not a sentence boundary.
/// Matched case-insensitively against the word immediately preceding the period.
static ABBREVIATIONS: LazyLock<std::collections::HashSet<&'static str>> = LazyLock::new(|| {
    [
        "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "etc", "e.g", "i.e", "cf", "al",
        "fig", "eq", "no", "vol", "approx", "inc", "ltd", "co", "corp",
    ]
    .into_iter()
    .collect()
});

/// A byte span `[start, end)` within the source text.
pub type Span = (usize, usize);

/// Splits `text` into paragraphs: runs separated by two or more consecutive
/// newlines. Returns byte spans, not copies.
pub fn paragraph_spans(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut start = 0usize;
    let bytes = text.as_bytes();
    let mut i = 0usize;
    while i < bytes.len() {
        if bytes[i] == b'\n' {
            let mut j = i;
            let mut newline_count = 0;
            while j < bytes.len() && (bytes[j] == b'\n' || bytes[j] == b'\r') {
                if bytes[j] == b'\n' {
                    newline_count += 1;
                }
                j += 1;
            }
            if newline_count >= 2 {
                let trimmed_end = trim_end_ws(text, i);
                if trimmed_end > start {
                    spans.push((start, trimmed_end));
                }
                start = trim_start_ws(text, j);
                i = j;
                continue;
            }
        }
        i += 1;
    }
    let trimmed_end = trim_end_ws(text, text.len());
    if trimmed_end > start {
        spans.push((start, trimmed_end));
    }
    spans
}

fn trim_end_ws(text: &str, end: usize) -> usize {
    text[..end].trim_end().len()
}

fn trim_start_ws(text: &str, start: usize) -> usize {
    let slice = &text[start..];
    start + (slice.len() - slice.trim_start().len())
}

/// Splits `text` into sentences within `[0, text.len())`. A sentence ends at
/// `.`, `!`, or `?` followed by whitespace or end-of-text, unless the word
/// immediately preceding the punctuation is a known abbreviation.
pub fn sentence_spans(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut start = 0usize;
    let char_indices: Vec<(usize, char)> = text.char_indices().collect();

    for (i, (byte_idx, ch)) in char_indices.iter().enumerate() {
        if !matches!(ch, '.' | '!' | '?') {
            continue;
        }
        let end_of_punct = char_indices
            .get(i + 1)
            .map(|(idx, _)| *idx)
            .unwrap_or(text.len());
        let at_boundary = char_indices
            .get(i + 1)
            .map(|(_, next)| next.is_whitespace())
            .unwrap_or(true);
        if !at_boundary {
            continue;
        }
        if *ch == '.' && is_abbreviation(&text[start..*byte_idx]) {
            continue;
        }
        let trimmed_start = start + (text[start..end_of_punct].len()
            - text[start..end_of_punct].trim_start().len());
        if end_of_punct > trimmed_start {
            spans.push((trimmed_start, end_of_punct));
        }
        start = end_of_punct;
    }
    if start < text.len() {
        let trimmed_start =
            start + (text[start..].len() - text[start..].trim_start().len());
        let trimmed_end = trim_end_ws(text, text.len());
        if trimmed_end > trimmed_start {
            spans.push((trimmed_start, trimmed_end));
        }
    }
    spans
}

fn is_abbreviation(preceding: &str) -> bool {
    let last_word = preceding
        .rsplit(|c: char| c.is_whitespace() || c == '(' || c == '"')
        .next()
        .unwrap_or("");
    ABBREVIATIONS.contains(last_word.to_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_simple_sentences() {
        let text = "Hello world. How are you? I am fine!";
        let spans = sentence_spans(text);
        let rendered: Vec<&str> = spans.iter().map(|(s, e)| &text[*s..*e]).collect();
        assert_eq!(rendered, vec!["Hello world.", "How are you?", "I am fine!"]);
    }

    #[test]
    fn respects_abbreviation_stop_list() {
        let text = "Dr. Smith arrived late. He apologized.";
        let spans = sentence_spans(text);
        let rendered: Vec<&str> = spans.iter().map(|(s, e)| &text[*s..*e]).collect();
        assert_eq!(rendered, vec!["Dr. Smith arrived late.", "He apologized."]);
    }

    #[test]
    fn splits_paragraphs_on_blank_lines() {
        let text = "Para one.\nStill one.\n\nPara two.\n\n\nPara three.";
        let spans = paragraph_spans(text);
        let rendered: Vec<&str> = spans.iter().map(|(s, e)| &text[*s..*e]).collect();
        assert_eq!(
            rendered,
            vec!["Para one.\nStill one.", "Para two.", "Para three."]
        );
    }
}
