//! Embedding service adapters.
//!
//! This crate ships exactly one concrete [`crate::domain::ports::EmbeddingService`]
//! implementation: a deterministic hash-based service used for tests and as
//! the default when no real model hosting backend is wired up. Model
//! hosting (ONNX/Python runtimes, ...) is out of scope (spec §1) and is
//! expected to be supplied by the embedding daemon this engine is vendored
//! into, via the same port.

/// Deterministic hash-based [`crate::domain::ports::EmbeddingService`].
pub mod null;

pub use null::NullEmbeddingService;
