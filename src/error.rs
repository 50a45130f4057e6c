//! Custom error types for scholar-profile.
//!
//! [`ScholarError`] covers everything that can go wrong while talking to the
//! scholarly-metadata provider. [`FetchError`] is what the profile fetcher hands
//! back to its callers and is the only error that crosses the HTTP boundary.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Provider-side error type.
///
/// Uses `thiserror` for ergonomic error handling and automatic `Display` implementation.
#[derive(Debug, Error)]
pub enum ScholarError {
    /// Network/HTTP request error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// HTML parsing error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Rate limited by Google Scholar
    #[error("Rate limited, retry after {0}s")]
    RateLimited(u64),

    /// Scholar returned a non-success status
    #[error("API error: {code} - {message}")]
    Api {
        /// HTTP status code
        code: u16,
        /// Error message
        message: String,
    },

    /// CAPTCHA detected
    #[error("CAPTCHA detected, please refresh cookies")]
    Captcha,

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

/// Result type alias using `ScholarError`
pub type Result<T> = std::result::Result<T, ScholarError>;

/// Extension trait for adding context to Option types
pub trait OptionExt<T> {
    /// Convert Option to Result with a parse error message
    fn ok_or_parse(self, msg: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_parse(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| ScholarError::Parse(msg.to_string()))
    }
}

/// Failure of a whole profile fetch.
///
/// Per-publication failures never show up here; they are logged and the
/// publication is dropped.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Name search returned no candidates
    #[error("No results found for professor: {name}")]
    NotFound {
        /// The name that was searched for
        name: String,
    },

    /// Author search or author fill failed
    #[error(transparent)]
    Upstream(#[from] ScholarError),
}

impl FetchError {
    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Body shape shared by every error response.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorDetail {
    pub detail: String,
}

impl IntoResponse for FetchError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorDetail {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
