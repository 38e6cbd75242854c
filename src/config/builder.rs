//! Configuration builder
//!
//! Builds a [`Config`] in code, for programs that do not ship a YAML file.

use crate::config::{Config, LoggerConfig};
use crate::session::generate_session_id;
use serde_yml::{Mapping, Value};
use std::path::PathBuf;

/// Builder for [`Config`]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Start from defaults for `project` with a fresh session id
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            config: Config {
                project: project.into(),
                session_id: generate_session_id(),
                logger: LoggerConfig::default(),
                wandb: None,
                tensorboard: None,
                extra: Mapping::new(),
            },
        }
    }

    /// Pin the session id
    pub fn session_id(mut self, id: impl Into<String>) -> Self {
        self.config.session_id = id.into();
        self
    }

    /// Root directory for session logs
    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.logger.dir = dir.into();
        self
    }

    pub fn log_system_messages(mut self, enabled: bool) -> Self {
        self.config.logger.log_system_messages = enabled;
        self
    }

    pub fn wandb(mut self, block: Value) -> Self {
        self.config.wandb = Some(block);
        self
    }

    pub fn tensorboard(mut self, block: Value) -> Self {
        self.config.tensorboard = Some(block);
        self
    }

    /// Set a top-level user key
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config
            .extra
            .insert(Value::String(key.into()), value.into());
        self
    }

    /// Build the final configuration
    pub fn build(self) -> Config {
        self.config
    }
}
