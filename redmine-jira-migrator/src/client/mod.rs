//! HTTP clients for the source (Redmine) and destination (Jira) trackers.

mod error;
pub mod jira;
pub mod redmine;

pub use error::ApiError;
pub use jira::JiraClient;
pub use redmine::RedmineClient;

use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Builds the HTTP client shared by both trackers.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .build()
}

/// Joins `path` onto `base` without dropping the base's last segment.
pub(crate) fn endpoint(base: &Url, path: &str) -> String {
    format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Maps a send failure to [`ApiError::Network`].
pub(crate) fn network_error(url: &str) -> impl FnOnce(reqwest::Error) -> ApiError + '_ {
    move |source| ApiError::Network {
        url: url.to_string(),
        source,
    }
}

/// Turns non-success statuses into the matching [`ApiError`].
pub(crate) async fn check_status(url: &str, response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = url.to_string();
    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs);
            Err(ApiError::RateLimited { url, retry_after })
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ApiError::Auth {
            url,
            status: status.as_u16(),
        }),
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
            Err(ApiError::Unavailable {
                url,
                status: status.as_u16(),
            })
        }
        _ => {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::Rejected {
                url,
                status: status.as_u16(),
                body,
            })
        }
    }
}

/// Decodes a JSON body, reporting decode failures as malformed responses.
pub(crate) async fn decode_json<T: DeserializeOwned>(
    url: &str,
    response: Response,
) -> Result<T, ApiError> {
    let body = response.text().await.map_err(network_error(url))?;
    serde_json::from_str(&body).map_err(|e| ApiError::MalformedResponse {
        url: url.to_string(),
        message: e.to_string(),
    })
}
