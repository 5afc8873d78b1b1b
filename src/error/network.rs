//! Network-related error types.
//!
//! This module defines errors that occur while talking to the chat backend
//! over HTTP, including non-success statuses and undecodable bodies.

use std::fmt;

use crate::traits::HttpError;

/// Network-specific error variants.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// Connection to the server failed.
    ConnectionFailed { url: String, message: String },

    /// Request timed out.
    Timeout { message: String },

    /// Non-2xx response. `message` is the best detail the server gave:
    /// the body's `detail` field, or `HTTP <status>`.
    HttpStatus { status: u16, message: String },

    /// Response body could not be decoded.
    InvalidResponse { message: String },

    /// Generic network error.
    Other { message: String },
}

impl NetworkError {
    /// Check if this error is likely transient and can be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            NetworkError::ConnectionFailed { .. } => true,
            NetworkError::Timeout { .. } => true,
            NetworkError::HttpStatus { status, .. } => {
                *status >= 500 || *status == 429 || *status == 408
            }
            NetworkError::InvalidResponse { .. } => false,
            NetworkError::Other { .. } => false,
        }
    }

    /// Detail text suitable for embedding in a chat message
    pub fn detail(&self) -> String {
        match self {
            NetworkError::HttpStatus { message, .. } => message.clone(),
            NetworkError::ConnectionFailed { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            NetworkError::ConnectionFailed { url, .. } => {
                format!("Unable to connect to the chat server at {}.", url)
            }
            NetworkError::Timeout { .. } => {
                "The request timed out. The server may be slow or unreachable.".to_string()
            }
            NetworkError::HttpStatus { status, message } => match *status {
                401 => "Authentication required. Please sign in again.".to_string(),
                403 => "Access denied.".to_string(),
                404 => "The requested resource was not found.".to_string(),
                429 => "Too many requests. Please wait a moment and try again.".to_string(),
                500..=599 => format!("The server is experiencing issues: {}", message),
                _ => format!("The server rejected the request: {}", message),
            },
            NetworkError::InvalidResponse { .. } => {
                "Received an invalid response from the server.".to_string()
            }
            NetworkError::Other { message } => format!("Network error: {}", message),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed { .. } => "E_NET_CONN",
            NetworkError::Timeout { .. } => "E_NET_TIMEOUT",
            NetworkError::HttpStatus { .. } => "E_NET_HTTP",
            NetworkError::InvalidResponse { .. } => "E_NET_INVALID",
            NetworkError::Other { .. } => "E_NET_OTHER",
        }
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::ConnectionFailed { url, message } => {
                write!(f, "Connection failed to '{}': {}", url, message)
            }
            NetworkError::Timeout { message } => write!(f, "Request timed out: {}", message),
            NetworkError::HttpStatus { status, message } => {
                write!(f, "HTTP {} error: {}", status, message)
            }
            NetworkError::InvalidResponse { message } => {
                write!(f, "Invalid response: {}", message)
            }
            NetworkError::Other { message } => write!(f, "Network error: {}", message),
        }
    }
}

impl std::error::Error for NetworkError {}

/// Pull the best detail text out of an error response body.
///
/// Uses the JSON `detail` field when present, otherwise `HTTP <status>`.
pub fn status_detail(status: u16, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| match json.get("detail") {
            Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(serde_json::Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        })
        .unwrap_or_else(|| format!("HTTP {}", status))
}

/// Classify an HTTP-seam error, attributing it to `url`.
pub fn classify_http_error(err: HttpError, url: &str) -> NetworkError {
    match err {
        HttpError::ConnectionFailed(message) => NetworkError::ConnectionFailed {
            url: url.to_string(),
            message,
        },
        HttpError::Timeout(message) => NetworkError::Timeout { message },
        HttpError::ServerError { status, message } => NetworkError::HttpStatus {
            status,
            message: status_detail(status, &message),
        },
        HttpError::Io(message) | HttpError::InvalidUrl(message) | HttpError::Other(message) => {
            NetworkError::Other { message }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_detail_uses_detail_field() {
        assert_eq!(
            status_detail(503, r#"{"detail": "Agent system not initialized"}"#),
            "Agent system not initialized"
        );
    }

    #[test]
    fn test_status_detail_falls_back_to_status() {
        assert_eq!(status_detail(502, "<html>Bad Gateway</html>"), "HTTP 502");
        assert_eq!(status_detail(500, r#"{"error": "x"}"#), "HTTP 500");
        assert_eq!(status_detail(500, r#"{"detail": null}"#), "HTTP 500");
    }

    #[test]
    fn test_status_detail_non_string_detail() {
        // FastAPI validation errors carry a list
        let detail = status_detail(422, r#"{"detail": [{"msg": "field required"}]}"#);
        assert!(detail.contains("field required"));
    }

    #[test]
    fn test_classify_server_error() {
        let err = classify_http_error(
            HttpError::ServerError {
                status: 500,
                message: r#"{"detail": "boom"}"#.to_string(),
            },
            "http://localhost/api/chat",
        );
        assert_eq!(
            err,
            NetworkError::HttpStatus {
                status: 500,
                message: "boom".to_string()
            }
        );
        assert_eq!(err.detail(), "boom");
        assert!(err.is_retryable());
    }

    #[test]
    fn test_classify_connection_failure() {
        let err = classify_http_error(
            HttpError::ConnectionFailed("refused".to_string()),
            "http://localhost:1",
        );
        assert!(matches!(err, NetworkError::ConnectionFailed { .. }));
        assert_eq!(err.detail(), "refused");
        assert_eq!(err.error_code(), "E_NET_CONN");
    }

    #[test]
    fn test_http_status_retryable() {
        let status = |status| NetworkError::HttpStatus {
            status,
            message: String::new(),
        };
        assert!(status(503).is_retryable());
        assert!(status(429).is_retryable());
        assert!(!status(400).is_retryable());
        assert!(!status(401).is_retryable());
    }

    #[test]
    fn test_user_message_for_unauthorized() {
        let err = NetworkError::HttpStatus {
            status: 401,
            message: "Not authenticated".to_string(),
        };
        assert!(err.user_message().contains("sign in"));
    }
}
