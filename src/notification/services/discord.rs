//! Discord webhook notifications

use crate::error::NotifyError;
use crate::notification::service::{http_client, post_json, require};
use crate::secrets::CredentialStore;
use reqwest::blocking::Client;
use serde_json::{json, Value};

/// Discord notification service using a channel webhook
#[derive(Debug, Clone)]
pub struct Discord {
    webhook_url: String,
    client: Client,
}

impl Discord {
    pub const NAME: &'static str = "Discord";
    pub const WEBHOOK_KEY: &'static str = "DISCORD_WEBHOOK_URL";
    /// Display name the webhook posts under
    pub const USERNAME: &'static str = "fenn";

    /// Create a service from `DISCORD_WEBHOOK_URL`
    pub fn new(credentials: &dyn CredentialStore) -> Result<Self, NotifyError> {
        let webhook_url = require(credentials, Self::NAME, Self::WEBHOOK_KEY)?;
        Ok(Self {
            webhook_url,
            client: http_client()?,
        })
    }

    /// Request body for a message
    pub fn payload(message: &str) -> Value {
        json!({
            "content": message,
            "username": Self::USERNAME,
        })
    }

    /// Post the message to the webhook
    pub fn send(&self, message: &str) -> Result<(), NotifyError> {
        post_json(
            &self.client,
            Self::NAME,
            &self.webhook_url,
            &Self::payload(message),
            None,
        )?;
        Ok(())
    }
}
