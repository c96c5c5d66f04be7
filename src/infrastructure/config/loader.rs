//! Layered configuration loading: embedded defaults, an optional user
//! config file, then environment variables, in that precedence order —
//! mirroring the teacher's `ConfigLoader`.

use crate::domain::error::{Error, Result};
use config::{Config as ConfigBuilder, Environment, FileFormat};
use std::path::Path;
use validator::Validate;

use super::types::Config;

/// Embedded default configuration, compiled into the binary so it works
/// from any working directory.
const DEFAULT_CONFIG_TOML: &str = include_str!("../../../config/default.toml");

/// Returns the embedded default config TOML, exposed for tests that verify
/// the shipped defaults parse and validate.
pub fn get_default_config_toml() -> &'static str {
    DEFAULT_CONFIG_TOML
}

/// Loads configuration from embedded defaults, an optional user file, and
/// `FSI__`-prefixed environment variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// Create a new loader.
    pub fn new() -> Self {
        Self
    }

    /// Load configuration without a user file: embedded defaults overridden
    /// by environment variables only.
    pub fn load(&self) -> Result<Config> {
        self.build(None)
    }

    /// Load configuration layering a user config file between the embedded
    /// defaults and environment variables.
    pub fn load_from_file(&self, path: &Path) -> Result<Config> {
        self.build(Some(path))
    }

    fn build(&self, user_file: Option<&Path>) -> Result<Config> {
        let mut builder = ConfigBuilder::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG_TOML, FileFormat::Toml));

        if let Some(path) = user_file {
            builder = builder.add_source(config::File::from(path.to_path_buf()));
        }

        builder = builder.add_source(
            Environment::with_prefix("FSI")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| Error::config(format!("failed to build configuration: {e}")))?;

        let config: Config = config
            .try_deserialize()
            .map_err(|e| Error::config(format!("failed to deserialize configuration: {e}")))?;

        config
            .validate()
            .map_err(|e| Error::config(format!("configuration validation failed: {e}")))?;

        if config.folders.is_empty() {
            return Err(Error::config(
                "no folders configured: set at least one [[folders]] entry, pass --folder, \
                 or set FSI__FOLDERS",
            ));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_defaults_parse_and_validate_structurally() {
        let config: Config = ConfigBuilder::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG_TOML, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        config.validate().unwrap();
        assert!(config.folders.is_empty());
        assert_eq!(config.embedding.workers, 2);
        assert_eq!(config.watcher.debounce_ms, 1000);
    }

    #[test]
    fn load_without_folders_fails_with_a_clear_error() {
        let err = ConfigLoader::new().load().unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn load_from_file_layers_a_folder_over_the_embedded_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, "[[folders]]\npath = \"/tmp/docs\"\n").unwrap();

        let config = ConfigLoader::new().load_from_file(&config_path).unwrap();
        assert_eq!(config.folders.len(), 1);
        assert_eq!(config.folders[0].path, std::path::PathBuf::from("/tmp/docs"));
    }
}
