//! Summarization API error types.
//!
//! This module defines the errors a summarization request can fail with,
//! and which of them are worth retrying.

use std::fmt;

/// Errors that can occur while calling the summarization backend.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Network error occurred during request execution.
    ///
    /// Connection failures, DNS resolution errors, resets mid-body and other
    /// transport-level issues.
    Network(String),

    /// Request timed out before completion.
    Timeout,

    /// The endpoint URL could not be parsed.
    InvalidUrl(String),

    /// The backend answered with a non-success status.
    Http {
        status: u16,
        status_text: String,
    },

    /// The response body was not the expected JSON document.
    Decode(String),

    /// The HTTP client or request could not be constructed.
    Build(String),
}

impl ApiError {
    /// Whether a later attempt could plausibly succeed.
    ///
    /// Network failures, timeouts, 5xx responses, 408 and 429 are retryable.
    /// Other 4xx responses, decode failures and configuration errors are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Network(_) | ApiError::Timeout => true,
            ApiError::Http { status, .. } => *status >= 500 || *status == 408 || *status == 429,
            ApiError::InvalidUrl(_) | ApiError::Decode(_) | ApiError::Build(_) => false,
        }
    }

    /// Whether this is a 4xx response.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ApiError::Http { status, .. } if (400..500).contains(status))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(msg) => write!(f, "Network error: {}", msg),
            ApiError::Timeout => write!(f, "Request timed out"),
            ApiError::InvalidUrl(url) => write!(f, "Invalid URL: {}", url),
            ApiError::Http {
                status,
                status_text,
            } => write!(f, "API Error: {} {}", status, status_text),
            ApiError::Decode(msg) => write!(f, "Invalid response body: {}", msg),
            ApiError::Build(msg) => write!(f, "Request build error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

/// Convert reqwest errors to ApiError.
impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_builder() {
            ApiError::Build(err.to_string())
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Convert URL parsing errors to ApiError.
impl From<url::ParseError> for ApiError {
    fn from(err: url::ParseError) -> Self {
        ApiError::InvalidUrl(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}
