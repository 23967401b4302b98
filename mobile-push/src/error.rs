//! Push notification error types.

use serde_json::Value;
use thiserror::Error;

use crate::Platform;

/// Result type for push operations.
pub type Result<T> = std::result::Result<T, PushError>;

/// Push notification errors.
#[derive(Debug, Error)]
pub enum PushError {
    /// Missing or malformed provider configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The requested app group (or Parse application) is not configured.
    #[error("Application not found: {0}")]
    ApplicationNotFound(String),

    /// A required field was not set before sending.
    #[error("Missing argument: {0}")]
    MissingArgument(String),

    /// A compiled platform payload exceeds the vendor ceiling.
    #[error("Limit of {platform} is {limit}b, {size}b was sent")]
    PushSizeLimit {
        /// Platform whose payload is too large.
        platform: Platform,
        /// Serialized size in bytes.
        size: usize,
        /// Maximum allowed size in bytes.
        limit: usize,
    },

    /// A field value has the wrong shape.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The vendor rejected the push, or the request never completed.
    #[error("{0}")]
    SendPushFailed(Box<SendFailure>),

    /// The configured provider name does not map to a known provider.
    #[error("Invalid push provider: {0}")]
    InvalidPushProvider(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PushError {
    /// Check if this error carries a 503 or 504 status.
    ///
    /// This mirrors the default [`RetryPolicy`](crate::RetryPolicy) only. A
    /// policy with custom status codes decides retries through
    /// [`RetryPolicy::should_retry_status`](crate::RetryPolicy::should_retry_status)
    /// and [`status_code`](Self::status_code).
    pub fn is_retryable(&self) -> bool {
        matches!(self.status_code(), Some(503 | 504))
    }

    /// Get the vendor HTTP status if the failure carried one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::SendPushFailed(failure) => failure.status,
            _ => None,
        }
    }

    /// Get the send failure context, if this is a send failure.
    pub fn send_failure(&self) -> Option<&SendFailure> {
        match self {
            Self::SendPushFailed(failure) => Some(failure),
            _ => None,
        }
    }
}

impl From<SendFailure> for PushError {
    fn from(failure: SendFailure) -> Self {
        Self::SendPushFailed(Box::new(failure))
    }
}

impl From<serde_json::Error> for PushError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for PushError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Diagnostic context for a failed send.
///
/// Carries everything a caller needs to report the failure upstream: where
/// the push was going, what was sent and what came back.
#[derive(Debug, Clone)]
pub struct SendFailure {
    /// Active app group.
    pub app_group: String,
    /// App within the group that failed.
    pub app: String,
    /// Human readable reason.
    pub reason: String,
    /// Vendor HTTP status, when a response was received.
    pub status: Option<u16>,
    /// Raw vendor response body, when a response was received.
    pub response_body: Option<String>,
    /// The request body that was sent.
    pub request: Value,
    /// Apps of the group that accepted the push before this failure.
    pub delivered: Vec<String>,
}

impl SendFailure {
    pub(crate) fn new(
        app_group: impl Into<String>,
        app: impl Into<String>,
        reason: impl Into<String>,
        request: Value,
    ) -> Self {
        Self {
            app_group: app_group.into(),
            app: app.into(),
            reason: reason.into(),
            status: None,
            response_body: None,
            request,
            delivered: Vec::new(),
        }
    }

    pub(crate) fn with_response(mut self, status: u16, body: impl Into<String>) -> Self {
        self.status = Some(status);
        self.response_body = Some(body.into());
        self
    }

    /// Check if some apps received the push before the failure.
    pub fn is_partial(&self) -> bool {
        !self.delivered.is_empty()
    }
}

impl std::fmt::Display for SendFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] - [{}] Could not send push message. Reason: {}",
            self.app_group, self.app, self.reason
        )?;
        if let Some(status) = self.status {
            write!(f, " (status {})", status)?;
        }
        Ok(())
    }
}
