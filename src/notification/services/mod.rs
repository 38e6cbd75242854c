//! Provider integrations
//!
//! One module per messaging provider. Each type resolves its credentials on
//! construction and sends a single message per call.

mod discord;
mod resend;
mod slack;
mod telegram;

pub use discord::Discord;
pub use resend::Resend;
pub use slack::Slack;
pub use telegram::{ParseMode, Telegram};
