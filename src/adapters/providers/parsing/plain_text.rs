//! Plain-text and Markdown parser (§4.2): the one concrete [`Parser`]
//! implementation shipped with this crate. Additional format parsers
//! (PDF, DOCX, ...) are out of scope (spec §1) and are expected to
//! register with the same dispatch table.

use crate::domain::error::Result;
use crate::domain::ports::parsing::{ParsedDocument, Parser};
use crate::domain::types::StructuralHint;
use pulldown_cmark::{Event, HeadingLevel, Options, Parser as CmarkParser, Tag, TagEnd};
use std::path::Path;

/// Parses `.txt` as-is and `.md`/`.markdown` into plain text plus heading
/// structural hints, using `pulldown-cmark`'s streaming event parser.
#[derive(Debug, Clone, Default)]
pub struct PlainTextParser;

impl Parser for PlainTextParser {
    fn extensions(&self) -> &[&str] {
        &["txt", "md", "markdown"]
    }

    fn parse(&self, path: &Path, bytes: &[u8]) -> Result<ParsedDocument> {
        let raw = String::from_utf8(bytes.to_vec())
            .map_err(|e| crate::domain::error::Error::parse_failed(path.display().to_string(), e.to_string()))?;

        let is_markdown = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("md") || e.eq_ignore_ascii_case("markdown"))
            .unwrap_or(false);

        if !is_markdown {
            return Ok(ParsedDocument {
                text: raw,
                structure: Vec::new(),
                parser_name: "plain_text",
            });
        }

        let (text, structure) = render_markdown(&raw);
        Ok(ParsedDocument {
            text,
            structure,
            parser_name: "markdown",
        })
    }
}

fn render_markdown(raw: &str) -> (String, Vec<StructuralHint>) {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    let parser = CmarkParser::new_ext(raw, options);

    let mut text = String::new();
    let mut structure = Vec::new();
    let mut heading_level: Option<HeadingLevel> = None;
    let mut heading_start: usize = 0;
    let mut in_table = false;
    let mut table_start: usize = 0;

    for event in parser {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                heading_level = Some(level);
                heading_start = text.len();
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(level) = heading_level.take() {
                    let label = text[heading_start..].trim().to_string();
                    structure.push(StructuralHint {
                        kind: "heading".to_string(),
                        label,
                        span: (heading_start, text.len()),
                        level: Some(heading_level_to_u8(level)),
                    });
                }
                text.push('\n');
                text.push('\n');
            }
            Event::Start(Tag::Table(_)) => {
                in_table = true;
                table_start = text.len();
            }
            Event::End(TagEnd::Table) => {
                in_table = false;
                structure.push(StructuralHint {
                    kind: "table".to_string(),
                    label: "table".to_string(),
                    span: (table_start, text.len()),
                    level: None,
                });
                text.push('\n');
                text.push('\n');
            }
            Event::Start(Tag::Paragraph) => {}
            Event::End(TagEnd::Paragraph) => {
                text.push('\n');
                text.push('\n');
            }
            Event::Start(Tag::Item) => text.push_str("- "),
            Event::End(TagEnd::Item) => text.push('\n'),
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            Event::TableCell if in_table => text.push_str(" | "),
            _ => {}
        }
    }

    (text.trim().to_string(), structure)
}

fn heading_level_to_u8(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn parses_plain_text_verbatim() {
        let parser = PlainTextParser;
        let out = parser
            .parse(&PathBuf::from("notes.txt"), b"hello world")
            .unwrap();
        assert_eq!(out.text, "hello world");
        assert!(out.structure.is_empty());
        assert_eq!(out.parser_name, "plain_text");
    }

    #[test]
    fn extracts_headings_from_markdown() {
        let parser = PlainTextParser;
        let md = b"# Title\n\nIntro paragraph.\n\n## Section\n\nBody text.";
        let out = parser.parse(&PathBuf::from("doc.md"), md).unwrap();
        assert_eq!(out.parser_name, "markdown");
        let headings: Vec<&str> = out
            .structure
            .iter()
            .filter(|h| h.kind == "heading")
            .map(|h| h.label.as_str())
            .collect();
        assert_eq!(headings, vec!["Title", "Section"]);
        assert!(out.text.contains("Intro paragraph."));
    }

    #[test]
    fn rejects_non_utf8_as_parse_failed() {
        let parser = PlainTextParser;
        let bytes = vec![0xFF, 0xFE, 0xFD];
        let err = parser.parse(&PathBuf::from("bad.txt"), &bytes).unwrap_err();
        matches!(err, crate::domain::error::Error::ParseFailed { .. });
    }
}
