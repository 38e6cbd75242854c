//! Telegram bot notifications

use crate::error::NotifyError;
use crate::notification::service::{http_client, post_json, require};
use crate::secrets::CredentialStore;
use reqwest::blocking::Client;
use serde_json::{json, Value};
use std::fmt;

/// Message formatting understood by the Bot API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Markdown,
    Html,
}

impl ParseMode {
    /// Value of the `parse_mode` field
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseMode::Markdown => "Markdown",
            ParseMode::Html => "HTML",
        }
    }
}

impl fmt::Display for ParseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Telegram notification service
///
/// Sends through a bot's `sendMessage` method to a single chat.
#[derive(Debug, Clone)]
pub struct Telegram {
    bot_token: String,
    chat_id: String,
    parse_mode: Option<ParseMode>,
    api_base: String,
    client: Client,
}

impl Telegram {
    pub const NAME: &'static str = "Telegram";
    pub const TOKEN_KEY: &'static str = "TELEGRAM_BOT_TOKEN";
    pub const CHAT_ID_KEY: &'static str = "TELEGRAM_CHAT_ID";
    pub const DEFAULT_API_BASE: &'static str = "https://api.telegram.org";

    /// Create a service from `TELEGRAM_BOT_TOKEN` and `TELEGRAM_CHAT_ID`
    pub fn new(
        credentials: &dyn CredentialStore,
        parse_mode: Option<ParseMode>,
    ) -> Result<Self, NotifyError> {
        let bot_token = require(credentials, Self::NAME, Self::TOKEN_KEY)?;
        let chat_id = require(credentials, Self::NAME, Self::CHAT_ID_KEY)?;

        Ok(Self {
            bot_token,
            chat_id,
            parse_mode,
            api_base: Self::DEFAULT_API_BASE.to_string(),
            client: http_client()?,
        })
    }

    /// Point the service at another Bot API server
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// The `sendMessage` endpoint for this bot
    pub fn endpoint(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_base.trim_end_matches('/'),
            self.bot_token
        )
    }

    /// Request body for a message
    pub fn payload(&self, message: &str) -> Value {
        let mut data = json!({
            "chat_id": self.chat_id,
            "text": message,
            "disable_notification": false,
        });

        if let Some(mode) = self.parse_mode {
            data["parse_mode"] = Value::from(mode.as_str());
        }

        data
    }

    pub fn send(&self, message: &str) -> Result<(), NotifyError> {
        post_json(
            &self.client,
            Self::NAME,
            &self.endpoint(),
            &self.payload(message),
            None,
        )?;
        Ok(())
    }
}
