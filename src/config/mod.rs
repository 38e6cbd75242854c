//! Configuration system
//!
//! Handles YAML config file parsing. Only the keys fenn itself needs are
//! typed; everything else is kept, in file order, for user code.

pub mod builder;
pub mod file;

pub use builder::ConfigBuilder;
pub use file::{ConfigFile, DEFAULT_CONFIG_FILE};

use crate::error::ConfigError;
use crate::session::generate_session_id;
use serde::{Deserialize, Serialize};
use serde_yml::{Mapping, Value};
use std::path::PathBuf;

/// Tracker blocks recognised in the configuration, in start order
pub const TRACKER_BACKENDS: [&str; 2] = ["wandb", "tensorboard"];

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Project name; also the log subdirectory
    pub project: String,
    /// Session id; generated when the file does not pin one
    #[serde(default = "generate_session_id")]
    pub session_id: String,
    /// Log file settings
    #[serde(default)]
    pub logger: LoggerConfig,
    /// Weights & Biases tracker block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wandb: Option<Value>,
    /// TensorBoard tracker block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tensorboard: Option<Value>,
    /// Every other key in the file
    #[serde(flatten)]
    pub extra: Mapping,
}

/// Log file configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Root directory for session logs
    pub dir: PathBuf,
    /// Also write fenn's own status messages to the log file
    pub log_system_messages: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logger"),
            log_system_messages: false,
        }
    }
}

impl Config {
    /// Look up a user or tracker value by `/`-separated path, e.g. `train/lr`
    ///
    /// The typed keys (`project`, `session_id`, `logger`) are fields of
    /// [`Config`]; use [`Config::value`] to read any path that
    /// [`Config::flatten`] prints.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('/');
        let first = segments.next()?;

        let mut current = match first {
            "wandb" => self.wandb.as_ref()?,
            "tensorboard" => self.tensorboard.as_ref()?,
            key => self.extra.get(key)?,
        };

        for segment in segments {
            current = current.get(segment)?;
        }

        Some(current)
    }

    /// Owned lookup covering every key, typed ones included
    pub fn value(&self, path: &str) -> Option<Value> {
        let root = serde_yml::to_value(self).ok()?;
        let mut current = &root;
        for segment in path.split('/') {
            current = current.get(segment)?;
        }
        Some(current.clone())
    }

    /// Tracker blocks that are present and non-empty
    pub fn tracker_blocks(&self) -> Vec<(&'static str, &Value)> {
        TRACKER_BACKENDS
            .iter()
            .zip([&self.wandb, &self.tensorboard])
            .filter_map(|(name, block)| match block {
                Some(value) if is_enabled(value) => Some((*name, value)),
                _ => None,
            })
            .collect()
    }

    /// Remove a `wandb.key` entry, which belongs in the credential store
    pub fn take_deprecated_wandb_key(&mut self) -> Option<String> {
        let Some(Value::Mapping(block)) = self.wandb.as_mut() else {
            return None;
        };

        match block.get("key") {
            Some(Value::String(_)) => match block.remove("key") {
                Some(Value::String(key)) => Some(key),
                _ => None,
            },
            _ => None,
        }
    }

    /// Flatten into `path/to/key` and rendered value pairs, in file order
    pub fn flatten(&self) -> Result<Vec<(String, String)>, ConfigError> {
        let value = serde_yml::to_value(self)?;
        let mut entries = Vec::new();
        flatten_into(&value, String::new(), &mut entries);
        Ok(entries)
    }
}

fn is_enabled(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::Mapping(m) => !m.is_empty(),
        _ => true,
    }
}

fn flatten_into(value: &Value, prefix: String, entries: &mut Vec<(String, String)>) {
    match value {
        Value::Mapping(map) if !map.is_empty() => {
            for (key, child) in map {
                let key = render(key);
                let path = if prefix.is_empty() {
                    key
                } else {
                    format!("{}/{}", prefix, key)
                };
                flatten_into(child, path, entries);
            }
        }
        leaf => entries.push((prefix, render(leaf))),
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Sequence(items) => {
            let items: Vec<String> = items.iter().map(render).collect();
            format!("[{}]", items.join(", "))
        }
        other => serde_yml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}
