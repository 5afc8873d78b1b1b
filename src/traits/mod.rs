//! Trait abstractions for dependency injection and testability.
//!
//! - [`HttpClient`] - HTTP client operations (GET, POST, DELETE, streaming POST)
//! - [`ChatApi`] - the chat backend's REST surface

pub mod chat_api;
pub mod http;

pub use chat_api::ChatApi;
pub use http::{ByteStream, Headers, HttpClient, HttpError, Response};
