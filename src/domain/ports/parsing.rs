//! The parser dispatcher port: format-specific text extraction.
//!
//! Document parsing of specific formats (PDF, DOCX, …) is out of scope for
//! this engine; it is exposed only as a `Parser` capability returning text
//! and structural hints. One concrete implementation (plain text / Markdown)
//! ships with this crate; others are external collaborators.

use crate::domain::error::Result;
use crate::domain::types::StructuralHint;
use std::path::Path;

/// The text and structural hints extracted from a file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    /// Extracted plain text.
    pub text: String,
    /// Ordered structural hints (headings, tables, slides, …).
    pub structure: Vec<StructuralHint>,
    /// Name of the parser that produced this document, e.g. `"plain_text"`.
    pub parser_name: &'static str,
}

/// Selects and invokes a format-specific parser for a file.
///
/// Selection is by extension. Unknown extensions fail loud with
/// [`crate::domain::Error::unsupported_format`]. Binary content (a NUL byte
/// in the first kilobyte) short-circuits to
/// [`crate::domain::Error::skipped_binary`] before any parser runs.
pub trait Parser: Send + Sync {
    /// File extensions this parser accepts, lowercase, without a leading dot.
    fn extensions(&self) -> &[&str];

    /// Parse the file at `path`, already known not to be binary.
    fn parse(&self, path: &Path, bytes: &[u8]) -> Result<ParsedDocument>;
}
