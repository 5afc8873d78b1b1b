//! Streaming-related error types.
//!
//! Errors raised while reading a response stream after it was opened.

use std::fmt;

/// Stream-specific error variants.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamError {
    /// The body failed mid-read.
    ConnectionLost { message: String },
}

impl StreamError {
    /// Stream failures are transport hiccups; the turn can be resent.
    pub fn is_retryable(&self) -> bool {
        true
    }

    /// Detail text suitable for embedding in a chat message
    pub fn detail(&self) -> String {
        match self {
            StreamError::ConnectionLost { message } => message.clone(),
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            StreamError::ConnectionLost { .. } => {
                "Connection to the server was lost while the reply was streaming.".to_string()
            }
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::ConnectionLost { .. } => "E_STREAM_LOST",
        }
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::ConnectionLost { message } => {
                write!(f, "Stream connection lost: {}", message)
            }
        }
    }
}

impl std::error::Error for StreamError {}
