//! Retry policy for summarization requests.

use super::error::ApiError;
use crate::config::MedlitConfig;
use std::time::Duration;

/// How many times to try a request and how long to wait between tries.
///
/// Backoff is linear: after failed attempt `n` (1-based) the client waits
/// `n * backoff_step` before attempt `n + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Always at least 1.
    pub max_attempts: u32,

    /// Linear backoff step.
    pub backoff_step: Duration,

    /// Retry 4xx and other non-retryable failures too.
    pub retry_client_errors: bool,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_step: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_step,
            retry_client_errors: false,
        }
    }

    /// Builds the policy from application configuration.
    pub fn from_config(config: &MedlitConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            backoff_step: config.backoff_step(),
            retry_client_errors: config.retry_client_errors,
        }
    }

    /// Delay to wait after failed attempt `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff_step * attempt
    }

    /// Whether to try again after `error` on attempt `attempt` (1-based).
    pub fn should_retry(&self, error: &ApiError, attempt: u32) -> bool {
        attempt < self.max_attempts && (self.retry_client_errors || error.is_retryable())
    }
}

impl Default for RetryPolicy {
    /// Three attempts, 300 ms linear backoff.
    fn default() -> Self {
        Self::new(3, Duration::from_millis(300))
    }
}
