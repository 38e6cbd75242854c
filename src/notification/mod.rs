//! Notification system
//!
//! Sends free-text messages to chat webhooks (Discord, Slack, Telegram) and
//! email (Resend) through a single dispatcher.

mod notifier;
mod service;
pub mod services;

pub use notifier::{DeliveryOutcome, DeliveryReport, Notifier};
pub use service::{Service, ServiceKind, REQUEST_TIMEOUT};
pub use services::{Discord, ParseMode, Resend, Slack, Telegram};
