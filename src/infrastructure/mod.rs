//! Ambient infrastructure: configuration, the explicit services container,
//! the folder preview cache, retry/backoff, and metrics — the concerns
//! spec.md's Non-goals scope features out of, but never take the ambient
//! stack out of (spec §9, §2).
//!
//! - **config** — layered `Config` loading + validation.
//! - **services** — the `Services`/`FolderHandle` container (replaces the
//!   teacher's `shaku` DI container, per spec §9's redesign note).
//! - **cache** — the moka-backed folder preview cache.
//! - **resilience** — `retry_with_backoff`, shared by embedding and storage.
//! - **metrics** — ambient `metrics` crate counters/histograms.

/// The moka-backed folder preview cache.
pub mod cache;
/// Layered configuration loading + validation.
pub mod config;
/// Structured `tracing` subscriber setup.
pub mod logging;
/// Ambient `metrics` crate instrumentation.
pub mod metrics;
/// Exponential-backoff retry helper.
pub mod resilience;
/// The explicit services container.
pub mod services;

pub use config::Config;
pub use services::{FolderHandle, Services};
