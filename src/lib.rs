//! folder-semantic-index — per-folder semantic indexing and retrieval.
//!
//! Fingerprints, chunks, embeds, stores, and searches the documents under a
//! folder root, independently per folder. See `SPEC_FULL.md` for the full
//! component design; the short version:
//!
//! - [`domain`] — types, ports, and the pure pipeline stages (chunking,
//!   semantic extraction, quality aggregation) that don't touch I/O.
//! - [`adapters`] — concrete implementations of the domain's ports: storage,
//!   fingerprinting, the file watcher, parsers, and the embedding service.
//! - [`application`] — the orchestrator, retrieval engine, and folder
//!   aggregator built on top of the domain and adapters.
//! - [`infrastructure`] — ambient concerns: configuration, the explicit
//!   services container, the folder preview cache, retry/backoff, metrics.

/// Adapter implementations of the domain's port traits.
pub mod adapters;
/// Orchestration and retrieval built on the domain and adapter layers.
pub mod application;
/// Core types, ports, and pure pipeline stages.
pub mod domain;
/// Ambient infrastructure: config, services, cache, resilience, metrics.
pub mod infrastructure;

// Re-export core types for public API
pub use domain::error::{Error, Result};
pub use domain::types::*;

// Re-export the collaborators most callers need to wire up a folder.
pub use application::{FolderOrchestrator, FolderRetrieval};
pub use domain::ports::admin::FolderAdmin;
pub use domain::ports::retrieval::RetrievalEngine;
pub use infrastructure::{FolderHandle, Services};
