//! Coarse error grouping used to pick what the user is told to do next.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Backend unreachable, timed out, or the stream dropped
    Network,
    /// Session token missing or rejected
    Auth,
    /// 5xx or an undecodable body
    Server,
    /// Any other rejected request
    Client,
    /// The user has to wait for the reply in progress
    User,
}

impl ErrorCategory {
    /// What to try next, phrased for the chat prompt.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "is the chat backend running? check HYDROGEN_API_URL",
            ErrorCategory::Auth => "set HYDROGEN_SESSION_TOKEN to a valid session token",
            ErrorCategory::Server => "the backend failed; /history shows what it stored",
            ErrorCategory::Client => "the backend rejected the request",
            ErrorCategory::User => "wait for the current reply to finish",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Auth => "auth",
            ErrorCategory::Server => "server",
            ErrorCategory::Client => "client",
            ErrorCategory::User => "user",
        };
        f.write_str(name)
    }
}
