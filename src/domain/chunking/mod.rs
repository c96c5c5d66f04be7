//! Paragraph/sentence-aware text chunker (§4.3).
//!
//! Splits parsed document text into 200–500 token chunks, preferring
//! paragraph boundaries, never splitting mid-sentence, overlapping
//! consecutive chunks by 10% of target size, and carrying the nearest
//! preceding section heading onto every chunk within that section.

/// The chunking algorithm itself.
pub mod engine;
/// Sentence and paragraph boundary detection.
pub mod sentence;
/// The approximate tokenizer used for chunk sizing.
pub mod tokenizer;

pub use engine::{chunk_text, ChunkDraft};
