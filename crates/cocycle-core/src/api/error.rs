use serde::Deserialize;
use thiserror::Error;

/// Failure of a single request to the ride service.
///
/// `Clone` so one pending result can be handed to every reader that joined
/// the same in-flight fetch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Request failed with status {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Invalid response: {0}")]
    Decode(String),
}

/// Maximum length for error messages taken from response bodies
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Message used when an error body carries nothing readable
const GENERIC_ERROR_MESSAGE: &str = "Request failed";

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ApiError {
    /// Truncate a message to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    /// Best-effort extraction of `{"message": "..."}` from an error body.
    fn message_from_body(body: &str) -> String {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty())
            .map(|m| Self::truncate_body(&m))
            .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string())
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = Self::message_from_body(body);
        match status.as_u16() {
            404 => ApiError::NotFound(message),
            code => ApiError::Http {
                status: code,
                message,
            },
        }
    }

    /// HTTP status behind this error, if the service answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound(_) => Some(404),
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Network(_) | ApiError::Decode(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}
