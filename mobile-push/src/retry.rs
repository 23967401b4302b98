//! Retry policy for transient vendor failures.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry policy.
///
/// A retry restarts the whole send operation, validation included, and
/// delivers to every app of the group again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Backoff strategy.
    pub backoff: BackoffStrategy,
    /// Status codes treated as transient.
    pub retry_status_codes: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            backoff: BackoffStrategy::Constant { delay_ms: 1000 },
            retry_status_codes: vec![503, 504],
        }
    }
}

impl RetryPolicy {
    /// Create a policy with a constant delay.
    pub fn constant(max_retries: u32, delay: Duration) -> Self {
        Self {
            max_retries,
            backoff: BackoffStrategy::Constant {
                delay_ms: delay.as_millis() as u64,
            },
            ..Default::default()
        }
    }

    /// Create a policy with exponential backoff.
    pub fn exponential(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            backoff: BackoffStrategy::Exponential {
                initial_ms: initial_delay.as_millis() as u64,
                max_ms: 30_000,
                multiplier: 2.0,
            },
            ..Default::default()
        }
    }

    /// Create a policy with no delay.
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: BackoffStrategy::None,
            ..Default::default()
        }
    }

    /// Never retry.
    pub fn disabled() -> Self {
        Self::immediate(0)
    }

    /// Replace the transient status codes.
    pub fn with_status_codes(mut self, codes: Vec<u16>) -> Self {
        self.retry_status_codes = codes;
        self
    }

    /// Check if another attempt is allowed after `retries` retries.
    pub fn allows_retry(&self, retries: u32) -> bool {
        retries < self.max_retries
    }

    /// Check if a status code is transient.
    pub fn should_retry_status(&self, status: u16) -> bool {
        self.retry_status_codes.contains(&status)
    }

    /// Delay before retry number `attempt` (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff.delay_for_attempt(attempt)
    }
}

/// Backoff strategy for retries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackoffStrategy {
    /// No delay between retries.
    None,
    /// Constant delay between retries.
    Constant {
        /// Delay in milliseconds.
        delay_ms: u64,
    },
    /// Exponential backoff.
    Exponential {
        /// Initial delay in milliseconds.
        initial_ms: u64,
        /// Maximum delay in milliseconds.
        max_ms: u64,
        /// Multiplier (typically 2.0).
        multiplier: f64,
    },
}

impl BackoffStrategy {
    /// Calculate delay for a given attempt (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        match self {
            Self::None => Duration::ZERO,
            Self::Constant { delay_ms } => Duration::from_millis(*delay_ms),
            Self::Exponential {
                initial_ms,
                max_ms,
                multiplier,
            } => {
                let factor = multiplier.powi(attempt as i32);
                let millis = (*initial_ms as f64 * factor) as u64;
                Duration::from_millis(millis.min(*max_ms))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert!(policy.allows_retry(0));
        assert!(!policy.allows_retry(1));
        assert!(policy.should_retry_status(503));
        assert!(policy.should_retry_status(504));
        assert!(!policy.should_retry_status(500));
        assert_eq!(policy.delay_for_attempt(0), Duration::from_secs(1));
    }

    #[test]
    fn test_exponential_backoff() {
        let strategy = BackoffStrategy::Exponential {
            initial_ms: 100,
            max_ms: 10_000,
            multiplier: 2.0,
        };

        assert_eq!(strategy.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(strategy.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(strategy.delay_for_attempt(2), Duration::from_millis(400));
        assert_eq!(strategy.delay_for_attempt(10), Duration::from_secs(10));
    }

    #[test]
    fn test_disabled() {
        let policy = RetryPolicy::disabled();
        assert!(!policy.allows_retry(0));
        assert_eq!(policy.delay_for_attempt(0), Duration::ZERO);
    }

    #[test]
    fn test_deserialize() {
        let policy: RetryPolicy = serde_json::from_str(
            r#"{"max_retries": 3, "backoff": {"type": "exponential", "initial_ms": 50, "max_ms": 500, "multiplier": 3.0}}"#,
        )
        .unwrap();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.retry_status_codes, vec![503, 504]);
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(150));

        let policy: RetryPolicy = toml::from_str("max_retries = 0").unwrap();
        assert_eq!(policy, RetryPolicy::disabled().with_status_codes(vec![503, 504]));
    }
}
