//! Domain error types

use serde_json::Value;
use thiserror::Error;

/// Errors produced while obtaining a new token pair.
///
/// Cloneable because a single refresh outcome is handed to every caller
/// that was waiting on it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// There is no refresh token to exchange.
    #[error("no refresh token available")]
    NoRefreshToken,

    /// The backend answered the refresh call with a non-success status.
    #[error("token refresh rejected with status {status}: {message}")]
    RefreshRejected {
        /// HTTP status returned by the refresh endpoint.
        status: u16,
        /// Server-provided or generic message.
        message: String,
    },

    /// The refresh call never produced a response.
    #[error("network error during token refresh: {message}")]
    Network {
        /// Error description.
        message: String,
    },

    /// The refresh call exceeded the request timeout.
    #[error("token refresh timed out")]
    Timeout,

    /// The refresh response could not be decoded.
    #[error("invalid refresh response: {message}")]
    InvalidResponse {
        /// Error description.
        message: String,
    },
}

/// Errors surfaced to callers of the authenticated client.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("request failed with status {status}{}", format_message(.message.as_deref()))]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message decoded from the response body, if any.
        message: Option<String>,
        /// The decoded JSON body, if the body was JSON.
        body: Option<Value>,
    },

    /// The session could not be renewed and has been destroyed.
    #[error("session expired: {0}")]
    SessionExpired(AuthError),

    /// The request exceeded the configured timeout.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// The timeout that elapsed.
        timeout_ms: u64,
    },

    /// Connection-level failure; no response was received.
    #[error("network error: {0}")]
    Network(String),

    /// The request URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A response body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

fn format_message(message: Option<&str>) -> String {
    message.map(|m| format!(": {m}")).unwrap_or_default()
}

impl ApiError {
    /// Builds a status error from a raw response body.
    #[must_use]
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        let body: Option<Value> = serde_json::from_slice(body).ok();
        let message = body.as_ref().and_then(extract_server_message);
        Self::Status {
            status,
            message,
            body,
        }
    }

    /// Returns the HTTP status if the server responded.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::SessionExpired(_) => Some(401),
            _ => None,
        }
    }

    /// Returns the server-provided message, if one was decoded.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Returns true for a 401 response or a destroyed session.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401))
    }

    /// Returns true for a 403 response.
    #[must_use]
    pub const fn is_forbidden(&self) -> bool {
        matches!(self.status(), Some(403))
    }
}

/// Pulls a human-readable message out of an error body.
///
/// Accepts `{"message": "..."}`, `{"message": ["a", "b"]}` (validation
/// errors), and falls back to `error` or `detail` string fields.
#[must_use]
pub fn extract_server_message(body: &Value) -> Option<String> {
    let object = body.as_object()?;
    for key in ["message", "error", "detail"] {
        match object.get(key) {
            Some(Value::String(text)) if !text.trim().is_empty() => {
                return Some(text.clone());
            }
            Some(Value::Array(items)) => {
                let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
                if !parts.is_empty() {
                    return Some(parts.join(", "));
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_extract_message_string() {
        let body = json!({"statusCode": 403, "message": "Admins only"});
        assert_eq!(extract_server_message(&body), Some("Admins only".to_string()));
    }

    #[test]
    fn test_extract_message_array() {
        let body = json!({"message": ["email must be an email", "password is too short"]});
        assert_eq!(
            extract_server_message(&body),
            Some("email must be an email, password is too short".to_string())
        );
    }

    #[test]
    fn test_extract_message_fallbacks() {
        assert_eq!(
            extract_server_message(&json!({"error": "Forbidden"})),
            Some("Forbidden".to_string())
        );
        assert_eq!(extract_server_message(&json!({"message": "  "})), None);
        assert_eq!(extract_server_message(&json!("plain")), None);
        assert_eq!(extract_server_message(&json!({"message": 42})), None);
    }

    #[test]
    fn test_from_status_with_non_json_body() {
        let error = ApiError::from_status(502, b"<html>Bad Gateway</html>");
        assert_eq!(
            error,
            ApiError::Status {
                status: 502,
                message: None,
                body: None,
            }
        );
        assert_eq!(error.to_string(), "request failed with status 502");
    }

    #[test]
    fn test_from_status_with_message() {
        let error = ApiError::from_status(403, br#"{"message":"Not your workshop"}"#);
        assert!(error.is_forbidden());
        assert_eq!(error.server_message(), Some("Not your workshop"));
        assert_eq!(
            error.to_string(),
            "request failed with status 403: Not your workshop"
        );
    }

    #[test]
    fn test_session_expired_is_unauthorized() {
        let error = ApiError::SessionExpired(AuthError::NoRefreshToken);
        assert!(error.is_unauthorized());
        assert!(!error.is_forbidden());
        assert_eq!(error.server_message(), None);
    }
}
