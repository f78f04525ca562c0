//! Tracker API error types.

use crate::rate_limit::{RetryDecision, RetryableError};
use std::time::Duration;
use thiserror::Error;

/// Errors returned by the Redmine and Jira clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connect failure, timeout).
    #[error("Network error calling {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server is temporarily unavailable (HTTP 502, 503, 504).
    #[error("Server unavailable (HTTP {status}) at {url}")]
    Unavailable { url: String, status: u16 },

    /// The server asked us to slow down (HTTP 429).
    #[error("Rate limited by {url}")]
    RateLimited {
        url: String,
        retry_after: Option<Duration>,
    },

    /// Credentials were rejected (HTTP 401, 403).
    #[error("Authentication rejected (HTTP {status}) by {url}")]
    Auth { url: String, status: u16 },

    /// The server refused the request (validation error, missing resource).
    #[error("Request to {url} rejected (HTTP {status}): {body}")]
    Rejected {
        url: String,
        status: u16,
        body: String,
    },

    /// The response body could not be understood.
    #[error("Malformed response from {url}: {message}")]
    MalformedResponse { url: String, message: String },

    /// A retryable error persisted past the retry ceiling.
    #[error("{operation} failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        operation: String,
        attempts: u32,
        #[source]
        source: Box<ApiError>,
    },
}

impl ApiError {
    /// Returns true for errors that must abort the whole run.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Auth { .. } | Self::RetriesExhausted { .. })
    }
}

impl RetryableError for ApiError {
    fn retry_decision(&self) -> RetryDecision {
        match self {
            Self::Network { .. } | Self::Unavailable { .. } => RetryDecision::Retry,
            Self::RateLimited {
                retry_after: Some(delay),
                ..
            } => RetryDecision::RetryAfter(*delay),
            Self::RateLimited { .. } => RetryDecision::Retry,
            _ => RetryDecision::NoRetry,
        }
    }

    fn exhausted(self, operation: &str, attempts: u32) -> Self {
        Self::RetriesExhausted {
            operation: operation.to_string(),
            attempts,
            source: Box::new(self),
        }
    }
}
