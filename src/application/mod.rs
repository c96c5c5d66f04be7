//! Application layer: orchestration and retrieval built on top of the
//! domain and adapter layers.
//!
//! - **embedding_pool** — the Embedding Worker Pool (§4.5).
//! - **orchestrator** — the per-folder pipeline driver (§4.9).
//! - **retrieval** — the five navigation/search operations (§4.8).
//! - **folder_aggregator** — folder-level semantic roll-ups (§4.10).

/// The Embedding Worker Pool: prefixing, normalization, batching, retries.
pub mod embedding_pool;
/// Direct-child-only folder semantic roll-ups.
pub mod folder_aggregator;
/// The per-folder pipeline driver.
pub mod orchestrator;
/// The five retrieval operations.
pub mod retrieval;

pub use crate::domain::types::ReindexSummary;
pub use embedding_pool::EmbeddingWorkerPool;
pub use orchestrator::FolderOrchestrator;
pub use retrieval::FolderRetrieval;
