//! Retry policy and error classification.

use std::time::Duration;

/// Exponential backoff for rate-limited and transient failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt.
    pub max_retries: u32,

    /// Delay before the first retry.
    pub initial_backoff: Duration,

    /// Upper bound for any single delay.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (0-based): the initial delay
    /// doubled `attempt` times, capped at `max_backoff`.
    #[must_use]
    pub fn backoff_duration(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.initial_backoff
            .checked_mul(factor)
            .map_or(self.max_backoff, |delay| delay.min(self.max_backoff))
    }

    /// Delay for a retry decision, honouring server hints up to the cap.
    #[must_use]
    pub fn delay_for(&self, decision: RetryDecision, attempt: u32) -> Duration {
        match decision {
            RetryDecision::RetryAfter(hint) => hint.min(self.max_backoff),
            _ => self.backoff_duration(attempt),
        }
    }
}

/// How a failed call should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry with exponential backoff.
    Retry,
    /// Retry after the server-provided delay.
    RetryAfter(Duration),
    /// Permanent failure.
    NoRetry,
}

/// Errors that know whether the failed call is worth repeating.
pub trait RetryableError: Sized {
    /// Classifies this error.
    fn retry_decision(&self) -> RetryDecision;

    /// Wraps the last error once the retry ceiling is reached.
    fn exhausted(self, operation: &str, attempts: u32) -> Self;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_until_capped() {
        let policy = RetryPolicy {
            max_retries: 10,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(60),
        };

        assert_eq!(policy.backoff_duration(0), Duration::from_secs(1));
        assert_eq!(policy.backoff_duration(1), Duration::from_secs(2));
        assert_eq!(policy.backoff_duration(2), Duration::from_secs(4));
        assert_eq!(policy.backoff_duration(5), Duration::from_secs(32));
        assert_eq!(policy.backoff_duration(6), Duration::from_secs(60));
        assert_eq!(policy.backoff_duration(40), Duration::from_secs(60));
    }

    #[test]
    fn retry_after_is_capped() {
        let policy = RetryPolicy::default();

        assert_eq!(
            policy.delay_for(RetryDecision::RetryAfter(Duration::from_secs(5)), 3),
            Duration::from_secs(5)
        );
        assert_eq!(
            policy.delay_for(RetryDecision::RetryAfter(Duration::from_secs(3600)), 0),
            Duration::from_secs(60)
        );
        assert_eq!(
            policy.delay_for(RetryDecision::Retry, 2),
            Duration::from_secs(4)
        );
    }
}
