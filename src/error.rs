//! Error types for extraction requests

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors raised while parsing extraction requests
///
/// Retrieval itself never fails; these only come from adapter input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// Duration expression could not be parsed
    #[error("invalid duration '{input}': {reason}")]
    InvalidDurationFormat { input: String, reason: String },

    /// Timestamp path segment could not be parsed
    #[error("invalid timestamp '{input}': {reason}")]
    InvalidTimestamp { input: String, reason: String },
}

impl ExtractError {
    pub fn invalid_duration(input: &str, reason: impl ToString) -> Self {
        Self::InvalidDurationFormat {
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_timestamp(input: &str, reason: impl ToString) -> Self {
        Self::InvalidTimestamp {
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

impl IntoResponse for ExtractError {
    fn into_response(self) -> Response {
        (self.status_code(), format!("Error: {}", self)).into_response()
    }
}

/// Result type for extraction parsing
pub type Result<T> = std::result::Result<T, ExtractError>;
