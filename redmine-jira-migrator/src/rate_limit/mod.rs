//! Shared throttling for Redmine and Jira calls.
//!
//! A single [`RateLimiter`] is built at startup and handed by reference to
//! both the extractor and the importer, so their combined call rate stays
//! under one limit. Every call, retries included, first waits for a free
//! slot; consecutive slots are at least `min_interval` apart. Retryable
//! failures back off exponentially up to the policy's retry ceiling.

mod policy;
mod stats;

pub use policy::{RetryDecision, RetryPolicy, RetryableError};
pub use stats::RateLimiterStats;

use crate::config::RateLimitSettings;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, sleep_until, Instant};
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct LimiterState {
    next_slot: Option<Instant>,
    stats: RateLimiterStats,
}

/// Fixed-interval throttle with exponential backoff on retryable failures.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    policy: RetryPolicy,
    state: Mutex<LimiterState>,
}

impl RateLimiter {
    /// Creates a limiter admitting one call per `min_interval`.
    pub fn new(min_interval: Duration, policy: RetryPolicy) -> Self {
        Self {
            min_interval,
            policy,
            state: Mutex::new(LimiterState::default()),
        }
    }

    /// Creates a limiter from the `[rate-limit]` settings.
    pub fn from_settings(settings: &RateLimitSettings) -> Self {
        Self::new(
            Duration::from_millis(settings.min_interval_ms),
            RetryPolicy {
                max_retries: settings.max_retries,
                initial_backoff: Duration::from_millis(settings.initial_backoff_ms),
                max_backoff: Duration::from_millis(settings.max_backoff_ms),
            },
        )
    }

    /// Returns the retry policy.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Returns a snapshot of the counters.
    pub async fn stats(&self) -> RateLimiterStats {
        self.state.lock().await.stats
    }

    /// Waits until the next call slot is available and claims it.
    pub async fn acquire(&self) {
        let slot = {
            let mut state = self.state.lock().await;
            let now = Instant::now();
            let slot = match state.next_slot {
                Some(next) if next > now => next,
                _ => now,
            };
            state.next_slot = Some(slot + self.min_interval);
            state.stats.calls += 1;
            slot
        };

        if slot > Instant::now() {
            debug!(
                wait_ms = (slot - Instant::now()).as_millis() as u64,
                "Throttling API call"
            );
            sleep_until(slot).await;
        }
    }

    /// Runs `call` under the limiter, retrying retryable failures.
    ///
    /// # Errors
    ///
    /// Returns the call's error when it is not retryable, or the error
    /// wrapped by [`RetryableError::exhausted`] once the retry ceiling is
    /// reached.
    pub async fn execute<F, Fut, T, E>(&self, operation: &str, mut call: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: RetryableError + Display,
    {
        let mut attempt = 0;

        loop {
            self.acquire().await;

            let error = match call().await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            let decision = error.retry_decision();
            if decision == RetryDecision::NoRetry {
                debug!(operation, error = %error, "Call failed with non-retryable error");
                return Err(error);
            }

            if attempt >= self.policy.max_retries {
                warn!(
                    operation,
                    attempts = attempt + 1,
                    error = %error,
                    "Giving up after retry ceiling"
                );
                self.state.lock().await.stats.exhausted += 1;
                return Err(error.exhausted(operation, attempt + 1));
            }

            let delay = self.policy.delay_for(decision, attempt);
            warn!(
                operation,
                attempt = attempt + 1,
                max_attempts = self.policy.max_retries + 1,
                backoff_ms = delay.as_millis() as u64,
                error = %error,
                "Retrying after backoff"
            );
            self.state.lock().await.stats.backoffs += 1;
            sleep(delay).await;
            attempt += 1;
        }
    }
}
