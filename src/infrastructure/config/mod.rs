//! Layered configuration: embedded TOML defaults, an optional user config
//! file, and `FSI__`-prefixed environment variables, in that precedence
//! order (teacher pattern: `infrastructure::config::loader::ConfigLoader`).

/// Loading and layering logic.
pub mod loader;
/// Configuration value types.
pub mod types;

pub use loader::ConfigLoader;
pub use types::{
    CacheConfig, Config, ConcurrencyConfig, EmbeddingPoolConfig, FolderConfig, LoggingConfig,
    MetricsConfig, WatcherConfig,
};
