//! Push provider trait and service.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::{Notification, ParseProvider, PushConfig, PushError, Result, UrbanAirship};

/// Outcome of a send for a single app.
#[derive(Debug, Clone, PartialEq)]
pub enum AppOutcome {
    /// The vendor accepted the push; holds the decoded response body.
    Sent(Value),
    /// The app has incomplete credentials and was not contacted.
    Skipped,
}

/// Per-app send result.
#[derive(Debug, Clone, PartialEq)]
pub struct AppResult {
    /// App name within the active group.
    pub app: String,
    /// What happened.
    pub outcome: AppOutcome,
}

impl AppResult {
    pub(crate) fn sent(app: impl Into<String>, response: Value) -> Self {
        Self {
            app: app.into(),
            outcome: AppOutcome::Sent(response),
        }
    }

    pub(crate) fn skipped(app: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            outcome: AppOutcome::Skipped,
        }
    }

    /// Check if the push was accepted.
    pub fn is_sent(&self) -> bool {
        matches!(self.outcome, AppOutcome::Sent(_))
    }

    /// Check if the app was skipped.
    pub fn is_skipped(&self) -> bool {
        matches!(self.outcome, AppOutcome::Skipped)
    }

    /// Vendor response body, if sent.
    pub fn response(&self) -> Option<&Value> {
        match &self.outcome {
            AppOutcome::Sent(body) => Some(body),
            AppOutcome::Skipped => None,
        }
    }
}

/// Push provider trait.
#[async_trait]
pub trait PushProvider: Send + Sync {
    /// Provider name as used in configuration.
    fn name(&self) -> &'static str;

    /// Create a fresh draft carrying the provider defaults.
    fn notification(&self) -> Result<Notification>;

    /// Request body that `send` would POST for this draft.
    fn request_data(&self, notification: &Notification) -> Result<Value>;

    /// Send a notification to every app of its group.
    async fn send(&self, notification: &Notification) -> Result<Vec<AppResult>>;
}

/// Push service wrapping the configured provider.
#[derive(Clone)]
pub struct PushService {
    provider: Arc<dyn PushProvider>,
}

impl PushService {
    /// Create a service around a provider.
    pub fn new(provider: impl PushProvider + 'static) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }

    /// Create the provider named by the configuration.
    pub fn from_config(config: PushConfig) -> Result<Self> {
        debug!(provider = %config.provider, "Creating push provider");

        match config.provider.as_str() {
            "urban-airship" | "urban_airship" => {
                let ua = config.urban_airship.ok_or_else(|| {
                    PushError::Config("Missing urban-airship config".to_string())
                })?;
                Ok(Self::new(UrbanAirship::new(ua)?))
            }
            "parse" => {
                let parse = config
                    .parse
                    .ok_or_else(|| PushError::Config("Missing parse config".to_string()))?;
                Ok(Self::new(ParseProvider::new(parse)?))
            }
            other => Err(PushError::InvalidPushProvider(other.to_string())),
        }
    }

    /// Get the provider.
    pub fn provider(&self) -> &dyn PushProvider {
        self.provider.as_ref()
    }

    /// Provider name.
    pub fn name(&self) -> &'static str {
        self.provider.name()
    }

    /// Create a fresh draft.
    pub fn notification(&self) -> Result<Notification> {
        self.provider.notification()
    }

    /// Request body for a draft.
    pub fn request_data(&self, notification: &Notification) -> Result<Value> {
        self.provider.request_data(notification)
    }

    /// Send a draft.
    pub async fn send(&self, notification: &Notification) -> Result<Vec<AppResult>> {
        self.provider.send(notification).await
    }
}

impl std::fmt::Debug for PushService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushService")
            .field("provider", &self.provider.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AppGroup, AppGroups, Credentials, UrbanAirshipConfig};
    use serde_json::json;

    struct Recording;

    #[async_trait]
    impl PushProvider for Recording {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn notification(&self) -> Result<Notification> {
            Notification::new(["default"], "default")
        }

        fn request_data(&self, notification: &Notification) -> Result<Value> {
            Ok(json!({"alert": notification.message()}))
        }

        async fn send(&self, notification: &Notification) -> Result<Vec<AppResult>> {
            Ok(vec![AppResult::sent("app-1", self.request_data(notification)?)])
        }
    }

    #[tokio::test]
    async fn test_service_delegates() {
        let service = PushService::new(Recording);
        assert_eq!(service.name(), "recording");

        let mut n = service.notification().unwrap();
        n.set_message("hello");

        let results = service.send(&n).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].is_sent());
        assert_eq!(results[0].response(), Some(&json!({"alert": "hello"})));
    }

    #[test]
    fn test_from_config_unknown_provider() {
        let mut config = PushConfig::urban_airship(UrbanAirshipConfig::new(
            "default",
            AppGroups::new().with_group(
                "default",
                AppGroup::new().with_app("app-1", Credentials::new("k", "s", "m")),
            ),
        ));
        config.provider = "carrier-pigeon".to_string();

        let err = PushService::from_config(config).unwrap_err();
        assert!(matches!(err, PushError::InvalidPushProvider(name) if name == "carrier-pigeon"));
    }

    #[test]
    fn test_from_config_missing_section() {
        let mut config = PushConfig::urban_airship(UrbanAirshipConfig::new(
            "default",
            AppGroups::new(),
        ));
        config.provider = "parse".to_string();

        let err = PushService::from_config(config).unwrap_err();
        assert!(matches!(err, PushError::Config(_)));
    }

    #[test]
    fn test_from_config_urban_airship() {
        let config = PushConfig::urban_airship(UrbanAirshipConfig::new(
            "default",
            AppGroups::new().with_group(
                "default",
                AppGroup::new().with_app("app-1", Credentials::new("k", "s", "m")),
            ),
        ));

        let service = PushService::from_config(config).unwrap();
        assert_eq!(service.name(), "urban-airship");
        assert_eq!(service.notification().unwrap().app_group(), "default");
    }

    #[test]
    fn test_app_result() {
        let skipped = AppResult::skipped("app-2");
        assert!(skipped.is_skipped());
        assert!(!skipped.is_sent());
        assert!(skipped.response().is_none());
    }
}
