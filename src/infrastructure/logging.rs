//! Structured logging setup: `tracing_subscriber` with an `EnvFilter`
//! (`RUST_LOG` takes precedence over the configured level) and a choice of
//! human-readable or JSON output.

use crate::infrastructure::config::LoggingConfig;

/// Initialize the process-wide `tracing` subscriber from `config`. Call
/// once, at the very start of `main`.
pub fn init(config: &LoggingConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false);

    if config.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
