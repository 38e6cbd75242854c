//! Notification dispatcher
//!
//! Fans a message out to every registered service. A failing service never
//! prevents the others from receiving the message; every outcome is returned
//! to the caller in a [`DeliveryReport`].

use super::service::{Service, ServiceKind};
use crate::error::NotifyError;
use crate::secrets::CredentialStore;
use std::sync::Arc;

/// Result of one service's delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    /// Provider name
    pub service: &'static str,
    /// Delivery result
    pub result: Result<(), NotifyError>,
}

impl DeliveryOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcomes of a single `notify` call, in registration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    outcomes: Vec<DeliveryOutcome>,
}

impl DeliveryReport {
    /// All outcomes
    pub fn outcomes(&self) -> &[DeliveryOutcome] {
        &self.outcomes
    }

    /// Names of services that delivered the message
    pub fn succeeded(&self) -> Vec<&'static str> {
        self.outcomes
            .iter()
            .filter(|o| o.is_success())
            .map(|o| o.service)
            .collect()
    }

    /// Services that failed, with the error detail
    pub fn failed(&self) -> Vec<(&'static str, String)> {
        self.outcomes
            .iter()
            .filter_map(|o| match &o.result {
                Ok(()) => None,
                Err(e) => Some((o.service, e.to_string())),
            })
            .collect()
    }

    /// True when no service failed (also true for an empty registry)
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(DeliveryOutcome::is_success)
    }

    /// True when no service was notified
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Notification dispatcher
///
/// Holds an ordered registry of services. Duplicates are allowed: registering
/// the same provider twice delivers every message twice.
pub struct Notifier {
    services: Vec<Service>,
    credentials: Arc<dyn CredentialStore>,
}

impl Notifier {
    /// Create an empty dispatcher resolving credentials from `credentials`
    pub fn new(credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            services: Vec::new(),
            credentials,
        }
    }

    /// Build and register a service
    ///
    /// Fails with [`NotifyError::CredentialMissing`] if the provider's
    /// credentials cannot be resolved; nothing is registered in that case.
    pub fn add(&mut self, kind: ServiceKind) -> Result<(), NotifyError> {
        let service = Service::build(&kind, self.credentials.as_ref())?;
        log::debug!("Registered {} notification service", service.name());
        self.services.push(service);
        Ok(())
    }

    /// Register several services, stopping at the first failure
    pub fn add_all<I>(&mut self, kinds: I) -> Result<(), NotifyError>
    where
        I: IntoIterator<Item = ServiceKind>,
    {
        for kind in kinds {
            self.add(kind)?;
        }
        Ok(())
    }

    /// Register an already-built service
    pub fn add_service(&mut self, service: impl Into<Service>) {
        let service = service.into();
        log::debug!("Registered {} notification service", service.name());
        self.services.push(service);
    }

    /// Remove the first service of the given provider
    pub fn remove(&mut self, kind: &ServiceKind) -> Result<(), NotifyError> {
        let index = self
            .services
            .iter()
            .position(|s| s.matches(kind))
            .ok_or_else(|| NotifyError::NotFound(kind.name().to_string()))?;

        self.services.remove(index);
        Ok(())
    }

    /// Send a message to every registered service
    pub fn notify(&self, message: &str) -> DeliveryReport {
        let mut report = DeliveryReport::default();

        for service in &self.services {
            let result = service.send(message);

            match &result {
                Ok(()) => log::info!("Sent notification via {}", service.name()),
                Err(e) => log::warn!("Failed to notify via {}: {}", service.name(), e),
            }

            report.outcomes.push(DeliveryOutcome {
                service: service.name(),
                result,
            });
        }

        report
    }

    /// Names of registered services, in order
    pub fn list(&self) -> Vec<&'static str> {
        self.services.iter().map(Service::name).collect()
    }

    /// Remove every service
    pub fn clear(&mut self) {
        self.services.clear();
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::services::{Discord, Slack, Telegram};
    use crate::secrets::KeyStore;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn notifier_with(store: KeyStore) -> Notifier {
        Notifier::new(Arc::new(store))
    }

    fn webhook_store(server: &Server) -> KeyStore {
        KeyStore::in_memory()
            .with_key(Discord::WEBHOOK_KEY, format!("{}/discord", server.url()))
            .with_key(Slack::WEBHOOK_KEY, format!("{}/slack", server.url()))
    }

    #[test]
    fn test_notifier_creation() {
        let notifier = notifier_with(KeyStore::in_memory());
        assert!(notifier.is_empty());
        assert!(notifier.list().is_empty());
    }

    #[test]
    fn test_notify_empty_registry() {
        let notifier = notifier_with(KeyStore::in_memory());
        let report = notifier.notify("nobody listens");
        assert!(report.is_empty());
        assert!(report.is_success());
    }

    #[test]
    fn test_add_missing_credentials() {
        let mut notifier = notifier_with(KeyStore::in_memory());
        let err = notifier.add(ServiceKind::Discord).unwrap_err();
        assert!(matches!(err, NotifyError::CredentialMissing { .. }));
        assert!(notifier.is_empty());
    }

    #[test]
    fn test_add_all_stops_at_first_failure() {
        let store = KeyStore::in_memory().with_key(Slack::WEBHOOK_KEY, "http://localhost/slack");
        let mut notifier = notifier_with(store);

        let result =
            notifier.add_all([ServiceKind::Slack, ServiceKind::Discord, ServiceKind::Slack]);

        assert!(result.is_err());
        assert_eq!(notifier.list(), vec!["Slack"]);
    }

    #[test]
    fn test_add_then_remove_restores_registry() {
        let server = Server::new();
        let mut notifier = notifier_with(webhook_store(&server));
        notifier.add(ServiceKind::Slack).unwrap();
        let before = notifier.list();

        notifier.add(ServiceKind::Discord).unwrap();
        notifier.remove(&ServiceKind::Discord).unwrap();

        assert_eq!(notifier.list(), before);
    }

    #[test]
    fn test_remove_takes_first_match() {
        let server = Server::new();
        let mut notifier = notifier_with(webhook_store(&server));
        notifier
            .add_all([ServiceKind::Slack, ServiceKind::Discord, ServiceKind::Slack])
            .unwrap();

        notifier.remove(&ServiceKind::Slack).unwrap();
        assert_eq!(notifier.list(), vec!["Discord", "Slack"]);
    }

    #[test]
    fn test_remove_not_found() {
        let server = Server::new();
        let mut notifier = notifier_with(webhook_store(&server));

        assert_eq!(
            notifier.remove(&ServiceKind::Slack),
            Err(NotifyError::NotFound("Slack".to_string()))
        );

        notifier.add(ServiceKind::Discord).unwrap();
        assert!(notifier.remove(&ServiceKind::telegram()).is_err());
        assert_eq!(notifier.len(), 1);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let server = Server::new();
        let mut notifier = notifier_with(webhook_store(&server));
        notifier.add(ServiceKind::Slack).unwrap();

        notifier.clear();
        notifier.clear();
        assert!(notifier.is_empty());
    }

    #[test]
    fn test_notify_single_success() {
        let mut server = Server::new();
        let mock = server
            .mock("POST", "/discord")
            .match_body(Matcher::Json(json!({"content": "hello", "username": "fenn"})))
            .with_status(204)
            .expect(1)
            .create();

        let mut notifier = notifier_with(webhook_store(&server));
        notifier.add(ServiceKind::Discord).unwrap();

        let report = notifier.notify("hello");

        mock.assert();
        assert!(report.is_success());
        assert_eq!(report.succeeded(), vec!["Discord"]);
    }

    #[test]
    fn test_failure_does_not_stop_dispatch() {
        let mut server = Server::new();
        let discord = server
            .mock("POST", "/discord")
            .with_status(400)
            .expect(1)
            .create();
        let slack = server
            .mock("POST", "/slack")
            .match_body(Matcher::Json(json!({"text": "x"})))
            .with_status(204)
            .expect(1)
            .create();

        let mut notifier = notifier_with(webhook_store(&server));
        notifier
            .add_all([ServiceKind::Discord, ServiceKind::Slack])
            .unwrap();

        let report = notifier.notify("x");

        discord.assert();
        slack.assert();
        assert!(!report.is_success());
        assert_eq!(report.succeeded(), vec!["Slack"]);

        let failed = report.failed();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].0, "Discord");
        assert!(failed[0].1.contains("400"));
    }

    #[test]
    fn test_outcomes_follow_registration_order() {
        let mut server = Server::new();
        let _slack = server.mock("POST", "/slack").with_status(500).create();
        let _discord = server.mock("POST", "/discord").with_status(204).create();

        let mut notifier = notifier_with(webhook_store(&server));
        notifier
            .add_all([ServiceKind::Slack, ServiceKind::Discord, ServiceKind::Slack])
            .unwrap();

        let report = notifier.notify("m");
        let order: Vec<_> = report.outcomes().iter().map(|o| (o.service, o.is_success())).collect();
        assert_eq!(
            order,
            vec![("Slack", false), ("Discord", true), ("Slack", false)]
        );
    }

    #[test]
    fn test_duplicates_deliver_twice() {
        let mut server = Server::new();
        let mock = server
            .mock("POST", "/slack")
            .with_status(200)
            .expect(2)
            .create();

        let mut notifier = notifier_with(webhook_store(&server));
        notifier.add(ServiceKind::Slack).unwrap();
        notifier.add(ServiceKind::Slack).unwrap();

        let report = notifier.notify("twice");
        mock.assert();
        assert_eq!(report.succeeded(), vec!["Slack", "Slack"]);
    }

    #[test]
    fn test_add_prebuilt_service() {
        let mut server = Server::new();
        let mock = server
            .mock("POST", "/bottok/sendMessage")
            .with_status(200)
            .create();

        let store = KeyStore::in_memory()
            .with_key(Telegram::TOKEN_KEY, "tok")
            .with_key(Telegram::CHAT_ID_KEY, "42");
        let telegram = Telegram::new(&store, None).unwrap().with_api_base(server.url());

        let mut notifier = notifier_with(KeyStore::in_memory());
        notifier.add_service(telegram);

        assert!(notifier.notify("hi").is_success());
        mock.assert();
    }
}
