//! Whitespace + punctuation tokenizer used for chunk sizing.
//!
//! This is not a model tokenizer: it approximates token counts cheaply so
//! the chunker can target §4.3's 200–500 token window without depending on
//! the embedding model's actual vocabulary.

/// Splits `text` into tokens: maximal runs of alphanumerics, and single
/// punctuation characters, with whitespace discarded.
pub fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let bytes = text.as_bytes();
    let mut start = None;
    let char_indices: Vec<(usize, char)> = text.char_indices().collect();
    let _ = bytes;

    for (i, (byte_idx, ch)) in char_indices.iter().enumerate() {
        if ch.is_alphanumeric() || *ch == '_' {
            if start.is_none() {
                start = Some(*byte_idx);
            }
            continue;
        }
        if let Some(s) = start.take() {
            tokens.push(&text[s..*byte_idx]);
        }
        if !ch.is_whitespace() {
            let end = char_indices
                .get(i + 1)
                .map(|(idx, _)| *idx)
                .unwrap_or(text.len());
            tokens.push(&text[*byte_idx..end]);
        }
    }
    if let Some(s) = start {
        tokens.push(&text[s..]);
    }
    tokens
}

/// Cheap token count estimate, consistent with [`tokenize`].
pub fn estimate_tokens(text: &str) -> usize {
    tokenize(text).len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_words_and_punctuation() {
        let toks = tokenize("Hello, world! This is e5-large.");
        assert_eq!(
            toks,
            vec![
                "Hello", ",", "world", "!", "This", "is", "e5", "-", "large", "."
            ]
        );
    }

    #[test]
    fn handles_empty_and_whitespace() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \n\t  ").is_empty());
    }

    #[test]
    fn estimate_matches_tokenize_len() {
        let text = "The quick brown fox jumps over the lazy dog.";
        assert_eq!(estimate_tokens(text), tokenize(text).len());
    }
}
