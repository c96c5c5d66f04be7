//! Configuration types.
//!
//! Mirrors the teacher's `Config`/nested-`#[validate(nested)]` shape, scoped
//! down to this crate's much smaller surface: which folders to index, the
//! embedding pool's concurrency knobs, the watcher, the preview cache, and
//! ambient logging/metrics toggles. There is no provider/auth/database
//! surface here — a real deployment supplies its `EmbeddingService` and
//! `Storage` through [`crate::infrastructure::services::Services`], not
//! through config.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

/// One folder root this engine indexes.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FolderConfig {
    /// Absolute or working-directory-relative path to the folder root.
    pub path: PathBuf,
    /// File extensions (without the leading dot) eligible for indexing.
    /// Empty means "use the Parser Dispatcher's registered defaults".
    #[serde(default)]
    pub include_extensions: Vec<String>,
}

/// Embedding Worker Pool concurrency knobs (§4.5).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EmbeddingPoolConfig {
    /// Number of long-lived embedding workers.
    #[validate(range(min = 1, max = 64))]
    pub workers: usize,
    /// Intra-worker thread count.
    #[validate(range(min = 1, max = 64))]
    pub threads_per_worker: usize,
    /// Passages embedded per batch.
    #[validate(range(min = 1, max = 256))]
    pub batch_size: usize,
}

impl Default for EmbeddingPoolConfig {
    fn default() -> Self {
        Self {
            workers: crate::domain::constants::DEFAULT_EMBEDDING_WORKERS,
            threads_per_worker: crate::domain::constants::DEFAULT_EMBEDDING_THREADS_PER_WORKER,
            batch_size: crate::domain::constants::DEFAULT_EMBEDDING_BATCH_SIZE,
        }
    }
}

/// Orchestrator concurrency knobs (§5).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ConcurrencyConfig {
    /// Files parsed concurrently per folder.
    #[validate(range(min = 1, max = 256))]
    pub file_concurrency: usize,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            file_concurrency: crate::domain::constants::DEFAULT_FILE_CONCURRENCY,
        }
    }
}

/// File watcher configuration (§4.11).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WatcherConfig {
    /// Whether to start the background watcher alongside the startup scan.
    pub enabled: bool,
    /// Debounce window, in milliseconds.
    #[validate(range(min = 1))]
    pub debounce_ms: u64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: crate::domain::constants::WATCHER_DEBOUNCE.as_millis() as u64,
        }
    }
}

/// Folder preview cache configuration ([`crate::infrastructure::cache`]).
///
/// No TTL: eviction is size-based only (`max_capacity`); freshness comes
/// from event-driven invalidation on document upsert/delete, per spec §9's
/// redesign note against timer-based cache invalidation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CacheConfig {
    /// Whether folder previews are cached at all.
    pub enabled: bool,
    /// Maximum number of cached folder previews.
    #[validate(range(min = 1))]
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_capacity: 512,
        }
    }
}

/// Ambient metrics toggle.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct MetricsConfig {
    /// Whether pipeline/retrieval stages record `metrics` counters and
    /// histograms. No HTTP exporter is started either way (out of scope).
    pub enabled: bool,
}

/// Ambient logging configuration, consumed by
/// [`crate::infrastructure::logging::init`].
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive, e.g. `"info"` or
    /// `"folder_semantic_index=debug,warn"`.
    pub level: String,
    /// Emit structured JSON log lines instead of the human-readable format.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Top-level configuration: the result of layering embedded defaults, an
/// optional user config file, and `FSI__`-prefixed environment variables.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Config {
    /// Folders this engine indexes.
    #[validate(nested)]
    pub folders: Vec<FolderConfig>,
    /// Embedding Worker Pool knobs.
    #[serde(default)]
    #[validate(nested)]
    pub embedding: EmbeddingPoolConfig,
    /// Orchestrator concurrency knobs.
    #[serde(default)]
    #[validate(nested)]
    pub concurrency: ConcurrencyConfig,
    /// File watcher settings.
    #[serde(default)]
    #[validate(nested)]
    pub watcher: WatcherConfig,
    /// Folder preview cache settings.
    #[serde(default)]
    #[validate(nested)]
    pub cache: CacheConfig,
    /// Ambient metrics toggle.
    #[serde(default)]
    #[validate(nested)]
    pub metrics: MetricsConfig,
    /// Ambient logging settings.
    #[serde(default)]
    #[validate(nested)]
    pub logging: LoggingConfig,
}
