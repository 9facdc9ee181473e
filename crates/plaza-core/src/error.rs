//! Error taxonomy for calls against the Plaza service.

use std::fmt;

/// Fallback message when the server does not supply one.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";

/// Failure of a single HTTP exchange with the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Non-2xx response. `message` is the server-supplied `message` field
    /// or [`GENERIC_ERROR_MESSAGE`].
    Http { status: u16, message: String },
    /// Transport failure, no response received.
    Network(String),
    /// A 2xx response whose body did not have the expected shape.
    Decode(String),
    /// The request could not be built (bad header value, unserializable body).
    InvalidRequest(String),
}

impl ApiError {
    /// Builds an HTTP error from a status and an optional JSON error body.
    pub fn from_status(status: u16, body: Option<&serde_json::Value>) -> Self {
        let message = body
            .and_then(|json| json.get("message"))
            .and_then(|v| v.as_str())
            .filter(|msg| !msg.is_empty())
            .unwrap_or(GENERIC_ERROR_MESSAGE)
            .to_string();
        ApiError::Http { status, message }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// One-line message suitable for a notification.
    pub fn message(&self) -> &str {
        match self {
            ApiError::Http { message, .. }
            | ApiError::Network(message)
            | ApiError::Decode(message)
            | ApiError::InvalidRequest(message) => message,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

pub(crate) fn classify_reqwest_error(e: &reqwest::Error) -> ApiError {
    if e.is_builder() {
        ApiError::InvalidRequest(format!("Request error: {e}"))
    } else if e.is_decode() {
        ApiError::Decode(format!("Invalid response body: {e}"))
    } else if e.is_connect() {
        ApiError::Network(format!("Connection failed: {e}"))
    } else {
        ApiError::Network(format!("Network error: {e}"))
    }
}

/// Result type for service calls.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_from_status_uses_server_message() {
        let body = json!({"message": "Email already registered"});
        let err = ApiError::from_status(409, Some(&body));
        assert_eq!(
            err,
            ApiError::Http {
                status: 409,
                message: "Email already registered".to_string()
            }
        );
        assert_eq!(err.to_string(), "Email already registered");
    }

    #[test]
    fn test_from_status_falls_back_without_message() {
        let body = json!({"error": "nope"});
        assert_eq!(
            ApiError::from_status(500, Some(&body)).message(),
            GENERIC_ERROR_MESSAGE
        );
        assert_eq!(
            ApiError::from_status(502, None).message(),
            GENERIC_ERROR_MESSAGE
        );
    }

    #[test]
    fn test_non_string_message_falls_back() {
        let body = json!({"message": 42});
        assert_eq!(
            ApiError::from_status(400, Some(&body)).message(),
            GENERIC_ERROR_MESSAGE
        );
    }
}
