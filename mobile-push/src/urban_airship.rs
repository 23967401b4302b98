//! Urban Airship v3 provider.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::{
    AppResult, Credentials, Notification, PushError, PushPayload, PushProvider, Result,
    SendFailure, SizeLimits, UrbanAirshipConfig, Validate, validate_before_push,
};

const ACCEPT_V3: &str = "application/vnd.urbanairship+json; version=3";

/// Urban Airship provider.
///
/// Sends every notification to each app of the notification's app group,
/// one app at a time in configuration order.
#[derive(Clone)]
pub struct UrbanAirship {
    config: Arc<UrbanAirshipConfig>,
    client: Client,
    limits: SizeLimits,
}

impl UrbanAirship {
    /// Create a provider from a validated configuration.
    pub fn new(config: UrbanAirshipConfig) -> Result<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_V3));

        let mut builder = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers);

        if let Some(proxy) = config.proxy_url() {
            let proxy = reqwest::Proxy::all(&proxy)
                .map_err(|e| PushError::Config(format!("Invalid proxy: {}", e)))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| PushError::Config(e.to_string()))?;

        Ok(Self {
            config: Arc::new(config),
            client,
            limits: SizeLimits::default(),
        })
    }

    /// Override the payload size ceilings.
    pub fn with_limits(mut self, limits: SizeLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &UrbanAirshipConfig {
        &self.config
    }

    fn push_url(&self) -> String {
        format!("{}/api/push", self.config.base_url.trim_end_matches('/'))
    }

    /// One full attempt: validate, then deliver to every app of the group.
    async fn send_once(&self, notification: &Notification) -> Result<Vec<AppResult>> {
        let payload = validate_before_push(notification, &self.limits)?;
        let body = serde_json::to_value(&payload)?;

        let app_group = notification.app_group();
        let group = self.config.app_groups.get(app_group).ok_or_else(|| {
            PushError::ApplicationNotFound(format!(
                "The app group [{}] was not found in list of app-groups",
                app_group
            ))
        })?;

        let mut results = Vec::with_capacity(group.len());
        for (app, credentials) in group.iter() {
            if credentials.is_empty() {
                warn!(app_group, app, "Push skipped - empty credentials");
                results.push(AppResult::skipped(app));
                continue;
            }

            let response = match self.post(app_group, app, credentials, &body).await {
                Ok(response) => response,
                Err(PushError::SendPushFailed(mut failure)) => {
                    failure.delivered = results
                        .iter()
                        .filter(|r| r.is_sent())
                        .map(|r| r.app.clone())
                        .collect();
                    return Err(PushError::SendPushFailed(failure));
                }
                Err(err) => return Err(err),
            };
            results.push(AppResult::sent(app, response));
        }

        let sent = results.iter().filter(|r| r.is_sent()).count();
        info!(
            app_group,
            sent,
            skipped = results.len() - sent,
            "Push notification sent"
        );

        Ok(results)
    }

    async fn post(
        &self,
        app_group: &str,
        app: &str,
        credentials: &Credentials,
        body: &Value,
    ) -> Result<Value> {
        let failure = |reason: String| SendFailure::new(app_group, app, reason, body.clone());

        let (app_key, master_secret) = credentials
            .basic_auth()
            .ok_or_else(|| failure("empty credentials".to_string()))?;

        debug!(app_group, app, "Sending Urban Airship push");

        let response = self
            .client
            .post(self.push_url())
            .basic_auth(app_key, Some(master_secret))
            .json(body)
            .send()
            .await
            .map_err(|e| failure(e.to_string()))?;

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
        if decoded.get("ok").and_then(Value::as_bool) != Some(true) {
            return Err(failure("Response was not ok".to_string())
                .with_response(status.as_u16(), text)
                .into());
        }

        Ok(decoded)
    }
}

#[async_trait]
impl PushProvider for UrbanAirship {
    fn name(&self) -> &'static str {
        "urban-airship"
    }

    fn notification(&self) -> Result<Notification> {
        let mut notification = Notification::new(
            self.config.app_groups.names(),
            &self.config.default_app_group,
        )?;
        notification.set_platforms(self.config.default_platforms.clone());
        Ok(notification)
    }

    fn request_data(&self, notification: &Notification) -> Result<Value> {
        Ok(serde_json::to_value(PushPayload::compile(notification)?)?)
    }

    async fn send(&self, notification: &Notification) -> Result<Vec<AppResult>> {
        let policy = &self.config.retry;
        let mut retries = 0;

        loop {
            match self.send_once(notification).await {
                Err(err)
                    if err
                        .status_code()
                        .is_some_and(|status| policy.should_retry_status(status))
                        && policy.allows_retry(retries) =>
                {
                    let delay = policy.delay_for_attempt(retries);
                    retries += 1;
                    warn!(
                        attempt = retries,
                        status = err.status_code(),
                        delay_ms = delay.as_millis() as u64,
                        "Retrying push after transient failure"
                    );
                    tokio::time::sleep(delay).await;
                }
                result => return result,
            }
        }
    }
}

impl std::fmt::Debug for UrbanAirship {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrbanAirship")
            .field("config", &self.config)
            .field("limits", &self.limits)
            .finish()
    }
}
