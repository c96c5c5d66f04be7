//! Adapter implementations of the domain's port traits.
//!
//! - **providers** — consumed-from-outside ports: embedding, parsing.
//! - **storage** — the per-folder embedded database (§4.7).
//! - **fingerprint** — the Fingerprint & Change Detector (§4.1).
//! - **watcher** — the File Watcher (§4.11).
//! - **events** — change-event publication backing `subscribe()`.

/// Change-event publication: broadcast + null adapters.
pub mod events;
/// Fingerprint & Change Detector: folder snapshot + diff.
pub mod fingerprint;
/// Consumed-port adapters: embedding, parsing.
pub mod providers;
/// Per-folder embedded store and vector index.
pub mod storage;
/// Debounced `notify`-backed file watcher.
pub mod watcher;
