//! Slack incoming-webhook notifications

use crate::error::NotifyError;
use crate::notification::service::{http_client, post_json, require};
use crate::secrets::CredentialStore;
use reqwest::blocking::Client;
use serde_json::{json, Value};

/// Slack notification service
#[derive(Debug, Clone)]
pub struct Slack {
    webhook_url: String,
    client: Client,
}

impl Slack {
    pub const NAME: &'static str = "Slack";
    pub const WEBHOOK_KEY: &'static str = "SLACK_WEBHOOK_URL";

    pub fn new(credentials: &dyn CredentialStore) -> Result<Self, NotifyError> {
        let webhook_url = require(credentials, Self::NAME, Self::WEBHOOK_KEY)?;
        Ok(Self {
            webhook_url,
            client: http_client()?,
        })
    }

    pub fn payload(message: &str) -> Value {
        json!({ "text": message })
    }

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
