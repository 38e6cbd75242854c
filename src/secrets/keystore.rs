//! Key store backed by the environment and a dotenv file

use crate::error::SecretError;
use std::collections::HashMap;
use std::path::Path;

/// Default dotenv file, relative to the working directory
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Source of named secrets
///
/// Notification services and tracker backends depend on this trait rather
/// than on [`KeyStore`], so tests can hand them an isolated store.
pub trait CredentialStore: Send + Sync {
    /// Look up a secret by name
    fn get(&self, name: &str) -> Result<String, SecretError>;
}

/// Secret lookup: environment first, then the dotenv file
#[derive(Debug, Clone, Default)]
pub struct KeyStore {
    keys: HashMap<String, String>,
    read_env: bool,
}

impl KeyStore {
    /// Load keys from a dotenv file
    ///
    /// A missing file yields an empty store; a malformed one is an error.
    pub fn from_env_file<P: AsRef<Path>>(path: P) -> Result<Self, SecretError> {
        let path = path.as_ref();
        let mut keys = HashMap::new();

        match dotenvy::from_path_iter(path) {
            Ok(iter) => {
                for item in iter {
                    let (key, value) = item.map_err(|e| {
                        SecretError::EnvFile(format!("{}: {}", path.display(), e))
                    })?;
                    keys.insert(key, value);
                }
                log::debug!("Loaded {} keys from {}", keys.len(), path.display());
            }
            Err(e) if e.not_found() => {
                log::debug!("No env file at {}", path.display());
            }
            Err(e) => return Err(SecretError::EnvFile(format!("{}: {}", path.display(), e))),
        }

        Ok(Self {
            keys,
            read_env: true,
        })
    }

    /// Create a store that never consults the process environment
    pub fn in_memory() -> Self {
        Self {
            keys: HashMap::new(),
            read_env: false,
        }
    }

    /// Set or replace a key
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.keys.insert(name.into(), value.into());
    }

    /// Builder-style [`KeyStore::set`]
    pub fn with_key(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }
}

impl CredentialStore for KeyStore {
    fn get(&self, name: &str) -> Result<String, SecretError> {
        if self.read_env {
            if let Ok(value) = std::env::var(name) {
                if !value.is_empty() {
                    return Ok(value);
                }
            }
        }

        self.keys
            .get(name)
            .cloned()
            .ok_or_else(|| SecretError::KeyNotFound(name.to_string()))
    }
}
