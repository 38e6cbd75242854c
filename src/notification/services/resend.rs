//! Resend email notifications

use crate::error::NotifyError;
use crate::notification::service::{http_client, post_json, require};
use crate::secrets::CredentialStore;
use reqwest::blocking::Client;
use serde_json::{json, Value};

/// Resend email notification service
///
/// Sends one email per message to every configured recipient. The Resend API
/// may answer with an `error` object; that counts as a failed delivery even
/// when the HTTP status is a success.
#[derive(Debug, Clone)]
pub struct Resend {
    api_key: String,
    from_email: String,
    to_emails: Vec<String>,
    subject: String,
    endpoint: String,
    client: Client,
}

impl Resend {
    pub const NAME: &'static str = "Resend";
    pub const API_KEY: &'static str = "RESEND_API_KEY";
    pub const FROM_KEY: &'static str = "RESEND_FROM_EMAIL";
    pub const TO_KEY: &'static str = "RESEND_TO_EMAILS";
    pub const DEFAULT_SUBJECT: &'static str = "Notification from fenn";
    pub const DEFAULT_ENDPOINT: &'static str = "https://api.resend.com/emails";

    /// Create a service from `RESEND_API_KEY`, `RESEND_FROM_EMAIL` and
    /// `RESEND_TO_EMAILS` (comma separated)
    pub fn new(credentials: &dyn CredentialStore) -> Result<Self, NotifyError> {
        let api_key = require(credentials, Self::NAME, Self::API_KEY)?;
        let from_email = require(credentials, Self::NAME, Self::FROM_KEY)?;
        let to_raw = require(credentials, Self::NAME, Self::TO_KEY)?;

        Ok(Self {
            api_key,
            from_email,
            to_emails: parse_recipients(&to_raw),
            subject: Self::DEFAULT_SUBJECT.to_string(),
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
            client: http_client()?,
        })
    }

    /// Use a custom subject line
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Send to another API endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn recipients(&self) -> &[String] {
        &self.to_emails
    }

    /// Request body for a message
    pub fn payload(&self, message: &str) -> Value {
        json!({
            "from": self.from_email,
            "to": self.to_emails,
            "subject": self.subject,
            "html": format!("<p>{}</p>", message),
        })
    }

    pub fn send(&self, message: &str) -> Result<(), NotifyError> {
        let response = post_json(
            &self.client,
            Self::NAME,
            &self.endpoint,
            &self.payload(message),
            Some(&self.api_key),
        )?;

        let body = response
            .text()
            .map_err(|e| NotifyError::delivery(Self::NAME, e.to_string()))?;

        if let Ok(reply) = serde_json::from_str::<Value>(&body) {
            if let Some(error) = reply.get("error") {
                return Err(NotifyError::delivery(
                    Self::NAME,
                    format!("Resend API error: {}", error),
                ));
            }
        }

        Ok(())
    }
}

fn parse_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .map(str::to_string)
        .collect()
}
