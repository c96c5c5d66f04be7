//! Consumed-port adapters: embedding and parsing.
//!
//! These are the crate's own implementations of the external interfaces
//! described in spec §6. Storage, fingerprinting, and the file watcher live
//! one level up, under [`crate::adapters`], since they aren't "consumed
//! from outside" ports but are genuinely owned by this engine.

/// Embedding service adapters.
pub mod embedding;
/// Parser dispatcher adapters.
pub mod parsing;
