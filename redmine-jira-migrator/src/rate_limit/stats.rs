//! Rate limiter counters.

/// Counters kept by the [`RateLimiter`](super::RateLimiter).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimiterStats {
    /// Calls admitted, retries included.
    pub calls: u64,

    /// Backoff delays taken after a retryable failure.
    pub backoffs: u64,

    /// Operations that gave up after the retry ceiling.
    pub exhausted: u64,
}
