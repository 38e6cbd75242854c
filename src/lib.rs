//! fenn - session logging and notifications for training scripts
//!
//! This library wraps a program's entrypoint in a logging session: printed
//! output is mirrored, timestamped and color-free, into a per-session log
//! file, and messages can be fanned out to chat and e-mail providers.
//!
//! # Modules
//!
//! - [`app`]: Application runner
//! - [`config`]: Configuration system
//! - [`error`]: Error types
//! - [`logging`]: Output interception and tracker backends
//! - [`notification`]: Notification dispatcher and providers
//! - [`secrets`]: Credential store
//! - [`session`]: Session ids

pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod notification;
pub mod secrets;
pub mod session;

#[cfg(test)]
pub mod mock;

pub use app::{App, Context};
pub use config::Config;
pub use error::{AppError, Result};
pub use logging::{Logger, Output};
pub use notification::{Notifier, ServiceKind};
pub use secrets::KeyStore;
