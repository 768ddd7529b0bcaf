//! Retry and backoff policy for the HTTP client
//!
//! The policy is a plain value injected into [`HttpClient`](super::HttpClient),
//! so the retry decision and the delay schedule can be tested on their own.

use crate::config::RetryConfig;
use std::time::Duration;

/// Largest exponent applied to the backoff factor; beyond this the cap wins anyway
const MAX_BACKOFF_EXPONENT: u32 = 30;

/// Decides which failures are retried and how long to wait between attempts
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | Status in `retry_statuses` | Retry with backoff |
/// | Connection failure / timeout | Retry with backoff |
/// | Any other non-2xx | Fail immediately |
/// | Any other transport error | Fail immediately |
///
/// Retry `n` (1-based) waits `backoff_factor * 2^(n-1)`, capped at `max_backoff`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt
    pub max_retries: u32,

    pub backoff_factor: Duration,

    pub max_backoff: Duration,

    /// Status codes considered transient
    pub retry_statuses: Vec<u16>,
}

impl RetryPolicy {
    /// Builds a policy from configuration
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff_factor: Duration::from_millis(config.backoff_factor_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
            retry_statuses: config.retry_statuses.clone(),
        }
    }

    /// A policy that never retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff_factor: Duration::ZERO,
            max_backoff: Duration::ZERO,
            retry_statuses: Vec::new(),
        }
    }

    /// Total number of attempts a request may take
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Returns true if a response with this status should be retried
    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retry_statuses.contains(&status)
    }

    /// Returns true if another attempt is allowed after `attempts` have been made
    pub fn should_retry(&self, attempts: u32) -> bool {
        attempts < self.max_attempts()
    }

    /// Delay before retry number `retry` (1-based)
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(MAX_BACKOFF_EXPONENT);
        let delay = self.backoff_factor.saturating_mul(2_u32.pow(exponent));
        delay.min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}
