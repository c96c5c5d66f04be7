//! Domain port interfaces
//!
//! Boundary contracts between the domain/application layers and their
//! external collaborators. Ports are trait-based abstractions that let
//! implementations be swapped (or mocked in tests) without touching the
//! pipeline or retrieval logic.
//!
//! ## Organization
//!
//! - **embedding.rs** — `EmbeddingService`, the opaque model-hosting boundary.
//! - **parsing.rs** — `Parser`, the format-specific text extraction boundary.
//! - **storage.rs** — `Storage`, the per-folder document/chunk/vector store.
//! - **retrieval.rs** — `RetrievalEngine`, the five navigation/search operations.
//! - **watcher.rs** — `FolderWatcher`, the debounced filesystem observer.
//! - **events.rs** — `EventPublisher`, change-event subscription for `subscribe()`.
//! - **admin.rs** — `FolderAdmin`, the `reindex`/`status`/`subscribe` control surface.

/// The `reindex`/`status`/`subscribe` control surface.
pub mod admin;
/// Change-event publication for `subscribe()`.
pub mod events;
/// The opaque embedding-model boundary.
pub mod embedding;
/// Format-specific text extraction boundary.
pub mod parsing;
/// The five retrieval operations.
pub mod retrieval;
/// Per-folder document/chunk/vector storage.
pub mod storage;
/// Debounced filesystem observation.
pub mod watcher;

pub use admin::FolderAdmin;
pub use embedding::EmbeddingService;
pub use events::{ChangeEvent, EventPublisher, SharedEventPublisher};
pub use parsing::{ParsedDocument, Parser};
pub use retrieval::RetrievalEngine;
pub use storage::Storage;
pub use watcher::{FolderWatcher, WatchBatch};
