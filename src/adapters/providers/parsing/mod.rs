//! Parser Dispatcher (§4.2): selects a format-specific [`Parser`] by
//! extension, short-circuiting unknown extensions and binary content before
//! any parser runs.

/// The plain-text/Markdown parser, the one concrete implementation shipped
/// with this crate.
pub mod plain_text;

use crate::domain::constants::BINARY_SNIFF_WINDOW;
use crate::domain::error::{Error, Result};
use crate::domain::ports::parsing::{ParsedDocument, Parser};
use std::collections::HashMap;
use std::path::Path;

/// Dispatches to a format-specific [`Parser`] by file extension.
///
/// Open/closed: additional formats register more [`Parser`] impls at
/// construction without touching dispatch logic.
pub struct ParserDispatcher {
    by_extension: HashMap<String, Box<dyn Parser>>,
}

impl ParserDispatcher {
    /// Build an empty dispatcher with no registered parsers.
    pub fn new() -> Self {
        Self {
            by_extension: HashMap::new(),
        }
    }

    /// Build a dispatcher with the plain-text/Markdown parser registered —
    /// the default for a freshly-constructed [`crate::infrastructure::services::Services`].
    pub fn with_defaults() -> Self {
        let mut dispatcher = Self::new();
        dispatcher.register(Box::new(plain_text::PlainTextParser));
        dispatcher
    }

    /// Register a parser for all the extensions it declares.
    pub fn register(&mut self, parser: Box<dyn Parser>) {
        let extensions: Vec<String> = parser.extensions().iter().map(|s| s.to_string()).collect();
        let parser: std::sync::Arc<dyn Parser> = parser.into();
        for ext in extensions {
            self.by_extension
                .insert(ext, Box::new(ArcParser(parser.clone())));
        }
    }

    /// Dispatch `path` to its registered parser, after binary-sniffing and
    /// extension lookup. `bytes` are the file's raw contents.
    pub fn parse(&self, path: &Path, bytes: &[u8]) -> Result<ParsedDocument> {
        let window = &bytes[..bytes.len().min(BINARY_SNIFF_WINDOW)];
        if window.contains(&0u8) {
            return Err(Error::skipped_binary(path.display().to_string()));
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .ok_or_else(|| Error::unsupported_format("<none>"))?;

        let parser = self
            .by_extension
            .get(&extension)
            .ok_or_else(|| Error::unsupported_format(extension.clone()))?;

        parser.parse(path, bytes)
    }
}

impl Default for ParserDispatcher {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Adapts a shared `Arc<dyn Parser>` so the same instance can be registered
/// under multiple extensions without cloning parser state.
struct ArcParser(std::sync::Arc<dyn Parser>);

impl Parser for ArcParser {
    fn extensions(&self) -> &[&str] {
        self.0.extensions()
    }

    fn parse(&self, path: &Path, bytes: &[u8]) -> Result<ParsedDocument> {
        self.0.parse(path, bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_extension_fails_loud() {
        let dispatcher = ParserDispatcher::with_defaults();
        let err = dispatcher
            .parse(Path::new("report.pdf"), b"whatever")
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { .. }));
    }

    #[test]
    fn binary_content_is_skipped_before_dispatch() {
        let dispatcher = ParserDispatcher::with_defaults();
        let mut bytes = b"some header".to_vec();
        bytes.push(0);
        bytes.extend_from_slice(b"more data");
        let err = dispatcher.parse(Path::new("image.txt"), &bytes).unwrap_err();
        assert!(matches!(err, Error::SkippedBinary { .. }));
    }

    #[test]
    fn dispatches_txt_to_plain_text_parser() {
        let dispatcher = ParserDispatcher::with_defaults();
        let out = dispatcher.parse(Path::new("a.txt"), b"hello").unwrap();
        assert_eq!(out.parser_name, "plain_text");
    }
}
