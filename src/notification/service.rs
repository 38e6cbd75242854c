//! Notification service variants
//!
//! Every provider integration is one variant of [`Service`]. The dispatcher
//! only ever calls [`Service::send`], so adding a provider means adding a
//! variant and the compiler points at every match that needs it.

use super::services::{Discord, ParseMode, Resend, Slack, Telegram};
use crate::error::NotifyError;
use crate::secrets::CredentialStore;
use reqwest::blocking::{Client, Response};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Per-request timeout for every provider
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Which provider to build, plus its construction options
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceKind {
    /// Discord channel webhook
    Discord,
    /// Slack incoming webhook
    Slack,
    /// Telegram bot message
    Telegram {
        /// Optional formatting mode for the message text
        parse_mode: Option<ParseMode>,
    },
    /// Resend transactional email
    Resend {
        /// Subject line; the provider default is used when `None`
        subject: Option<String>,
    },
}

impl ServiceKind {
    /// Telegram without a parse mode
    pub fn telegram() -> Self {
        ServiceKind::Telegram { parse_mode: None }
    }

    /// Resend with the default subject
    pub fn resend() -> Self {
        ServiceKind::Resend { subject: None }
    }

    /// Provider name, as reported in delivery outcomes
    pub fn name(&self) -> &'static str {
        match self {
            ServiceKind::Discord => Discord::NAME,
            ServiceKind::Slack => Slack::NAME,
            ServiceKind::Telegram { .. } => Telegram::NAME,
            ServiceKind::Resend { .. } => Resend::NAME,
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A constructed, ready-to-send notification service
#[derive(Debug, Clone)]
pub enum Service {
    Discord(Discord),
    Slack(Slack),
    Telegram(Telegram),
    Resend(Resend),
}

impl Service {
    /// Build the service for `kind`, resolving its credentials
    pub fn build(
        kind: &ServiceKind,
        credentials: &dyn CredentialStore,
    ) -> Result<Self, NotifyError> {
        let service = match kind {
            ServiceKind::Discord => Service::Discord(Discord::new(credentials)?),
            ServiceKind::Slack => Service::Slack(Slack::new(credentials)?),
            ServiceKind::Telegram { parse_mode } => {
                Service::Telegram(Telegram::new(credentials, *parse_mode)?)
            }
            ServiceKind::Resend { subject } => {
                let service = Resend::new(credentials)?;
                match subject {
                    Some(subject) => Service::Resend(service.with_subject(subject.clone())),
                    None => Service::Resend(service),
                }
            }
        };
        Ok(service)
    }

    /// Provider name
    pub fn name(&self) -> &'static str {
        match self {
            Service::Discord(_) => Discord::NAME,
            Service::Slack(_) => Slack::NAME,
            Service::Telegram(_) => Telegram::NAME,
            Service::Resend(_) => Resend::NAME,
        }
    }

    /// Whether this service is the provider named by `kind`
    pub fn matches(&self, kind: &ServiceKind) -> bool {
        self.name() == kind.name()
    }

    /// Transmit one message
    pub fn send(&self, message: &str) -> Result<(), NotifyError> {
        match self {
            Service::Discord(s) => s.send(message),
            Service::Slack(s) => s.send(message),
            Service::Telegram(s) => s.send(message),
            Service::Resend(s) => s.send(message),
        }
    }
}

impl From<Discord> for Service {
    fn from(service: Discord) -> Self {
        Service::Discord(service)
    }
}

impl From<Slack> for Service {
    fn from(service: Slack) -> Self {
        Service::Slack(service)
    }
}

impl From<Telegram> for Service {
    fn from(service: Telegram) -> Self {
        Service::Telegram(service)
    }
}

impl From<Resend> for Service {
    fn from(service: Resend) -> Self {
        Service::Resend(service)
    }
}

/// Resolve a credential required by `service`
pub(crate) fn require(
    credentials: &dyn CredentialStore,
    service: &str,
    key: &str,
) -> Result<String, NotifyError> {
    credentials
        .get(key)
        .map_err(|_| NotifyError::CredentialMissing {
            service: service.to_string(),
            key: key.to_string(),
        })
}

/// Build the blocking HTTP client a service owns
pub(crate) fn http_client() -> Result<Client, NotifyError> {
    http_client_with(REQUEST_TIMEOUT)
}

pub(crate) fn http_client_with(timeout: Duration) -> Result<Client, NotifyError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| NotifyError::Transport(e.to_string()))
}

/// POST a JSON payload and require a 2xx status
pub(crate) fn post_json(
    client: &Client,
    provider: &str,
    url: &str,
    payload: &Value,
    bearer: Option<&str>,
) -> Result<Response, NotifyError> {
    let mut request = client.post(url).json(payload);
    if let Some(token) = bearer {
        request = request.bearer_auth(token);
    }

    let response = request.send().map_err(|e| {
        log::debug!("HTTP request to {} failed: {}", provider, e);
        NotifyError::delivery(provider, e.to_string())
    })?;

    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().unwrap_or_default();
        Err(NotifyError::delivery(
            provider,
            format!("status {}, body: {}", status, body),
        ))
    }
}
