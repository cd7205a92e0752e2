//! Error types for the remote API and the trusted-account list.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for remote API calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced by the Twitter API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The API signalled throttling (HTTP 429).
    #[error("Rate limited, retry after {}", retry_after_display(.retry_after_secs))]
    RateLimited { retry_after_secs: Option<u64> },

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body could not be decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Request signing failed.
    #[error("Authentication error: {0}")]
    Auth(String),
}

impl ApiError {
    /// Whether this error is the throttling signal.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

fn retry_after_display(secs: &Option<u64>) -> String {
    match secs {
        Some(s) => format!("{s}s"),
        None => "an unknown delay".to_string(),
    }
}

/// Errors reading the trusted-account list.
#[derive(Debug, Error)]
pub enum TrustedListError {
    /// The list file could not be read.
    #[error("Failed to read trusted list {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
