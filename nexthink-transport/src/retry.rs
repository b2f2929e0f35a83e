//! Retry policy for API requests.

use std::time::Duration;

use crate::error::TransportError;

/// Default number of retries after the first attempt.
pub const DEFAULT_RETRY_COUNT: u32 = 3;

/// Upper bound accepted for the retry count.
pub const MAX_RETRY_COUNT: u32 = 10;

/// Default base wait between attempts.
pub const DEFAULT_RETRY_WAIT: Duration = Duration::from_secs(2);

/// Default cap on the wait between attempts.
pub const DEFAULT_RETRY_MAX_WAIT: Duration = Duration::from_secs(10);

/// Strategy for retrying failed requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryStrategy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Base wait between attempts.
    pub wait: Duration,
    /// Cap on the wait between attempts.
    pub max_wait: Duration,
    /// Double the wait on every attempt instead of growing it linearly.
    pub exponential_backoff: bool,
}

impl RetryStrategy {
    /// Creates a strategy with default waits.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            wait: DEFAULT_RETRY_WAIT,
            max_wait: DEFAULT_RETRY_MAX_WAIT,
            exponential_backoff: false,
        }
    }

    /// Disables retries.
    pub fn no_retry() -> Self {
        Self::new(0)
    }

    /// Sets the base and maximum wait.
    pub fn with_wait(mut self, wait: Duration, max_wait: Duration) -> Self {
        self.wait = wait;
        self.max_wait = max_wait;
        self
    }

    /// Enables or disables exponential backoff.
    pub fn with_exponential_backoff(mut self, enabled: bool) -> Self {
        self.exponential_backoff = enabled;
        self
    }

    /// Wait before the retry that follows failed attempt number `attempt`
    /// (1-based), clamped to `[wait, max_wait]`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let attempt = attempt.max(1);
        let delay = if self.exponential_backoff {
            self.wait.saturating_mul(2u32.saturating_pow(attempt - 1))
        } else {
            self.wait.saturating_mul(attempt)
        };

        let ceiling = self.max_wait.max(self.wait);
        delay.clamp(self.wait, ceiling)
    }

    /// Returns true for network failures without a response and 5xx
    /// responses. Client errors are never retried.
    pub fn should_retry(&self, error: &TransportError) -> bool {
        match error {
            TransportError::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            TransportError::Api(e) => e.is_server_error(),
            _ => false,
        }
    }
}

impl Default for RetryStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_COUNT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;

    fn api(status: u16) -> TransportError {
        TransportError::Api(ApiError {
            status,
            status_text: String::new(),
            method: "GET".into(),
            endpoint: "/".into(),
            code: None,
            message: String::new(),
            details: None,
        })
    }

    #[test]
    fn test_linear_backoff() {
        let strategy = RetryStrategy::default();

        assert_eq!(strategy.delay_for_attempt(1), Duration::from_secs(2));
        assert_eq!(strategy.delay_for_attempt(2), Duration::from_secs(4));
        assert_eq!(strategy.delay_for_attempt(3), Duration::from_secs(6));
        // Capped at max wait
        assert_eq!(strategy.delay_for_attempt(9), Duration::from_secs(10));
    }

    #[test]
    fn test_exponential_backoff() {
        let strategy = RetryStrategy::new(5)
            .with_wait(Duration::from_secs(1), Duration::from_secs(60))
            .with_exponential_backoff(true);

        assert_eq!(strategy.delay_for_attempt(1), Duration::from_secs(1));
        assert_eq!(strategy.delay_for_attempt(2), Duration::from_secs(2));
        assert_eq!(strategy.delay_for_attempt(3), Duration::from_secs(4));
        assert_eq!(strategy.delay_for_attempt(10), Duration::from_secs(60));
    }

    #[test]
    fn test_max_wait_below_wait() {
        let strategy =
            RetryStrategy::new(3).with_wait(Duration::from_secs(5), Duration::from_secs(1));
        assert_eq!(strategy.delay_for_attempt(3), Duration::from_secs(5));
    }

    #[test]
    fn test_should_retry_classification() {
        let strategy = RetryStrategy::default();
        assert!(strategy.should_retry(&api(500)));
        assert!(strategy.should_retry(&api(503)));
        assert!(!strategy.should_retry(&api(404)));
        assert!(!strategy.should_retry(&api(429)));
        assert!(!strategy.should_retry(&TransportError::Cancelled));
        assert!(!strategy.should_retry(&TransportError::InvalidInput("x".into())));
    }
}
