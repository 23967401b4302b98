//! Parse push provider.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::{
    AppResult, Extra, IosBadge, Notification, ParseApplication, ParseConfig, PushError,
    PushProvider, Result, SendFailure, Validate,
};

/// Parse provider.
///
/// The notification's app group names the Parse application to send from.
#[derive(Debug, Clone)]
pub struct ParseProvider {
    config: Arc<ParseConfig>,
    client: Client,
}

impl ParseProvider {
    /// Create a provider from a validated configuration.
    pub fn new(config: ParseConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PushError::Config(e.to_string()))?;

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &ParseConfig {
        &self.config
    }

    fn push_url(&self) -> String {
        format!("{}/push", self.config.server_url.trim_end_matches('/'))
    }

    fn application(&self, name: &str) -> Result<&ParseApplication> {
        self.config.applications.get(name).ok_or_else(|| {
            PushError::ApplicationNotFound(format!("Parse application [{}] not found.", name))
        })
    }
}

/// Parse push request body.
#[derive(Debug, Serialize)]
struct ParsePush<'a> {
    channels: Vec<&'a str>,
    data: ParseData<'a>,
}

#[derive(Debug, Serialize)]
struct ParseData<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    alert: Option<&'a str>,
    /// Silent pushes carry the text as `message` so no alert is shown.
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(skip_serializing_if = "Extra::is_empty")]
    extra: &'a Extra,
    #[serde(skip_serializing_if = "Option::is_none")]
    badge: Option<&'a IosBadge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sound: Option<&'a str>,
    #[serde(rename = "content-available", skip_serializing_if = "Option::is_none")]
    content_available: Option<bool>,
}

impl<'a> ParsePush<'a> {
    fn compile(notification: &'a Notification) -> Self {
        let channels = if notification.channels().is_empty() {
            vec!["all"]
        } else {
            notification.channels().iter().map(String::as_str).collect()
        };

        let silent = notification.is_ios_content_available();
        let (alert, message) = if silent {
            (None, notification.message())
        } else {
            (notification.message(), None)
        };

        Self {
            channels,
            data: ParseData {
                alert,
                message,
                extra: notification.extra(),
                badge: notification.ios_badge(),
                sound: notification.sound(),
                content_available: silent.then_some(true),
            },
        }
    }
}

#[async_trait]
impl PushProvider for ParseProvider {
    fn name(&self) -> &'static str {
        "parse"
    }

    fn notification(&self) -> Result<Notification> {
        Notification::new(
            self.config.applications.keys(),
            &self.config.default_application,
        )
    }

    fn request_data(&self, notification: &Notification) -> Result<Value> {
        Ok(serde_json::to_value(ParsePush::compile(notification))?)
    }

    async fn send(&self, notification: &Notification) -> Result<Vec<AppResult>> {
        if notification.message().is_none_or(str::is_empty) {
            return Err(PushError::MissingArgument(
                "You have to set a message before sending push".to_string(),
            ));
        }

        let name = notification.app_group();
        let application = self.application(name)?;
        let body = self.request_data(notification)?;
        let failure = |reason: String| SendFailure::new(name, name, reason, body.clone());

        debug!(application = name, "Sending Parse push");

        let mut request = self
            .client
            .post(self.push_url())
            .header("X-Parse-Application-Id", &application.app_id)
            .header("X-Parse-REST-API-Key", &application.rest_key)
            .json(&body);
        if let Some(master_key) = &application.master_key {
            request = request.header("X-Parse-Master-Key", master_key);
        }

        let response = request.send().await.map_err(|e| failure(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| failure(e.to_string()))?;

        if !status.is_success() {
            return Err(failure(format!("Unexpected status {}", status))
                .with_response(status.as_u16(), text)
                .into());
        }

        let decoded: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
        if decoded.get("result").and_then(Value::as_bool) != Some(true) {
            return Err(failure("Response did not report a result".to_string())
                .with_response(status.as_u16(), text)
                .into());
        }

        info!(application = name, "Parse push sent");
        Ok(vec![AppResult::sent(name, decoded)])
    }
}
