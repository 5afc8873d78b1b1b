//! Result type alias for chat operations.

use super::ChatError;

/// Result type used throughout the crate's public API.
pub type ChatResult<T> = Result<T, ChatError>;
