//! Retry budget and backoff schedule for transient download failures.

use std::time::Duration;

/// HTTP statuses worth retrying: rate limiting and transient server-side
/// failures. Everything else fails the attempt immediately.
const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Retry configuration for one download session.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Base delay; doubles with every further retry.
    pub backoff_factor: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_factor: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Whether a response status counts as transient.
    #[must_use]
    pub fn is_retryable_status(status: u16) -> bool {
        RETRYABLE_STATUSES.contains(&status)
    }

    /// Delay before the given 1-based attempt: 1s, 2s, 4s, ... for the
    /// default factor. Only meaningful for `attempt >= 2`.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_factor * 2u32.pow(attempt.saturating_sub(2))
    }
}
