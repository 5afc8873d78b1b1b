//! Unified error type for the chat client.

use std::fmt;

use super::category::ErrorCategory;
use super::network::NetworkError;
use super::stream::StreamError;

/// Error returned by every fallible chat operation.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatError {
    /// Request-level failure talking to the backend.
    Network(NetworkError),

    /// The response stream broke after it was opened.
    Stream(StreamError),

    /// A turn is already running for this session.
    TurnInProgress { session_id: String },
}

impl ChatError {
    /// High-level category for handling decisions.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ChatError::Network(NetworkError::HttpStatus { status, .. }) => match *status {
                401 | 403 => ErrorCategory::Auth,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Client,
            },
            ChatError::Network(NetworkError::InvalidResponse { .. }) => ErrorCategory::Server,
            ChatError::Network(_) => ErrorCategory::Network,
            ChatError::Stream(_) => ErrorCategory::Network,
            ChatError::TurnInProgress { .. } => ErrorCategory::User,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            ChatError::Network(e) => e.is_retryable(),
            ChatError::Stream(e) => e.is_retryable(),
            ChatError::TurnInProgress { .. } => false,
        }
    }

    /// Whether the session token was rejected and the user must sign in again.
    pub fn requires_reauth(&self) -> bool {
        matches!(
            self,
            ChatError::Network(NetworkError::HttpStatus { status: 401, .. })
        )
    }

    /// Best available detail text, as shown in a synthetic error message.
    pub fn detail(&self) -> String {
        match self {
            ChatError::Network(e) => e.detail(),
            ChatError::Stream(e) => e.detail(),
            ChatError::TurnInProgress { .. } => self.to_string(),
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            ChatError::Network(e) => e.user_message(),
            ChatError::Stream(e) => e.user_message(),
            ChatError::TurnInProgress { .. } => {
                "A reply is still being generated for this conversation.".to_string()
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ChatError::Network(e) => e.error_code(),
            ChatError::Stream(e) => e.error_code(),
            ChatError::TurnInProgress { .. } => "E_TURN_BUSY",
        }
    }

    /// Suggested next step for the user.
    pub fn recovery_hint(&self) -> &'static str {
        self.category().recovery_hint()
    }
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatError::Network(e) => write!(f, "{}", e),
            ChatError::Stream(e) => write!(f, "{}", e),
            ChatError::TurnInProgress { session_id } => {
                write!(f, "A turn is already in flight for session '{}'", session_id)
            }
        }
    }
}

impl std::error::Error for ChatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChatError::Network(e) => Some(e),
            ChatError::Stream(e) => Some(e),
            ChatError::TurnInProgress { .. } => None,
        }
    }
}

impl From<NetworkError> for ChatError {
    fn from(err: NetworkError) -> Self {
        ChatError::Network(err)
    }
}

impl From<StreamError> for ChatError {
    fn from(err: StreamError) -> Self {
        ChatError::Stream(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: u16, message: &str) -> ChatError {
        NetworkError::HttpStatus {
            status,
            message: message.to_string(),
        }
        .into()
    }

    #[test]
    fn test_unauthorized_requires_reauth() {
        let err = status(401, "Not authenticated");
        assert!(err.requires_reauth());
        assert_eq!(err.category(), ErrorCategory::Auth);
        assert!(err.recovery_hint().contains("HYDROGEN_SESSION_TOKEN"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_server_error_category() {
        let err = status(500, "HTTP 500");
        assert!(!err.requires_reauth());
        assert_eq!(err.category(), ErrorCategory::Server);
        assert!(err.is_retryable());
        assert_eq!(err.detail(), "HTTP 500");
    }

    #[test]
    fn test_turn_in_progress() {
        let err = ChatError::TurnInProgress {
            session_id: "default".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::User);
        assert_eq!(err.recovery_hint(), "wait for the current reply to finish");
        assert_eq!(err.error_code(), "E_TURN_BUSY");
        assert!(err.to_string().contains("default"));
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn test_stream_error_conversion() {
        let err: ChatError = StreamError::ConnectionLost {
            message: "eof".to_string(),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(err.detail(), "eof");
        assert!(std::error::Error::source(&err).is_some());
    }
}
