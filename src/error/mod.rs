//! Error handling for the chat client.
//!
//! | Category | Description | Retryable |
//! |----------|-------------|-----------|
//! | Network | Connection, timeout, dropped stream | Yes |
//! | Auth | Session token rejected (401/403) | No |
//! | Server | Backend errors (5xx), undecodable bodies | Yes |
//! | Client | Other 4xx | No |
//! | User | Turn already in flight | No |

mod category;
mod chat_error;
mod network;
mod result;
mod stream;

pub use category::ErrorCategory;
pub use chat_error::ChatError;
pub use network::{classify_http_error, status_detail, NetworkError};
pub use result::ChatResult;
pub use stream::StreamError;
