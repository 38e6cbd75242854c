//! Unified error types for fenn
//!
//! This module defines all error types used throughout the crate.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Boxed error returned by a user entrypoint
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from configuration loading
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from the credential store
    #[error("Credential error: {0}")]
    Secret(#[from] SecretError),

    /// Error from the notification system
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    /// Error from the session logger
    #[error("Logger error: {0}")]
    Logger(#[from] LoggerError),

    /// The user entrypoint returned an error
    #[error("Entrypoint failed: {0}")]
    Entrypoint(#[source] BoxError),

    /// IO error (console or file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from credential lookup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SecretError {
    /// Key absent from both the environment and the dotenv file
    #[error("Key {0} not found in .env or environment")]
    KeyNotFound(String),

    /// The dotenv file exists but could not be parsed
    #[error("Failed to read env file: {0}")]
    EnvFile(String),
}

/// Errors from notification services and the dispatcher
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// A service could not be built because a credential is missing
    #[error("{service} requires credential {key}, which is not set")]
    CredentialMissing { service: String, key: String },

    /// A single delivery attempt failed
    #[error("Failed to send {provider} notification: {detail}")]
    DeliveryFailed { provider: String, detail: String },

    /// No registered service matches
    #[error("Service {0} not found in services list")]
    NotFound(String),

    /// The HTTP client could not be built
    #[error("HTTP transport error: {0}")]
    Transport(String),
}

impl NotifyError {
    pub(crate) fn delivery(provider: &str, detail: impl Into<String>) -> Self {
        NotifyError::DeliveryFailed {
            provider: provider.to_string(),
            detail: detail.into(),
        }
    }
}

/// Errors from configuration loading
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Configuration file {0} was not found")]
    FileNotFound(String),

    /// YAML parsing error
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yml::Error),

    /// Config file exists but could not be read
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the session logger and tracking backends
#[derive(Error, Debug)]
pub enum LoggerError {
    /// Operation not valid in the logger's current state
    #[error("Logger cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    /// Another interceptor is already installed on the output
    #[error("Output is already intercepted by another logger")]
    SinkBusy,

    /// A configured tracking backend failed to start
    #[error("Failed to initialize {backend} tracker: {detail}")]
    TrackerInitFailed { backend: String, detail: String },

    /// A running tracking backend rejected metrics
    #[error("{backend} tracker error: {detail}")]
    Tracker { backend: String, detail: String },

    /// IO error (log directory or file)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_missing_display() {
        let err = NotifyError::CredentialMissing {
            service: "Discord".to_string(),
            key: "DISCORD_WEBHOOK_URL".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Discord requires credential DISCORD_WEBHOOK_URL, which is not set"
        );
    }

    #[test]
    fn test_delivery_failed_display() {
        let err = NotifyError::delivery("Slack", "status 500");
        assert!(err.to_string().contains("Slack"));
        assert!(err.to_string().contains("status 500"));
    }

    #[test]
    fn test_invalid_state_display() {
        let err = LoggerError::InvalidState {
            operation: "start",
            state: "started",
        };
        assert_eq!(err.to_string(), "Logger cannot start while started");
    }

    #[test]
    fn test_error_conversion() {
        let app_err: AppError = SecretError::KeyNotFound("X".to_string()).into();
        assert!(matches!(app_err, AppError::Secret(_)));

        let app_err: AppError = NotifyError::NotFound("Slack".to_string()).into();
        assert!(matches!(app_err, AppError::Notify(_)));
    }
}
