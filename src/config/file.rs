//! Configuration file loading
//!
//! Handles loading configuration from YAML files.

use crate::config::Config;
use crate::error::ConfigError;

use std::path::Path;

/// Config file looked up when none is given
pub const DEFAULT_CONFIG_FILE: &str = "fenn.yaml";

/// Configuration file handler
pub struct ConfigFile;

impl ConfigFile {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref();

        if !path.is_file() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yml::from_str(&content)?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}
