//! Chat backend trait abstraction.
//!
//! [`ChatApi`] is the collaborator surface the orchestrator, recovery and
//! conversation layers depend on. [`crate::client::ChatClient`] implements it
//! over any [`super::HttpClient`].

use async_trait::async_trait;

use super::http::ByteStream;
use crate::error::ChatResult;
use crate::models::{ActiveAgent, ChatRequest, ChatResponse, Message, SessionSummary};

#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Open the event stream for one turn. Non-2xx statuses are errors.
    async fn open_stream(&self, request: &ChatRequest) -> ChatResult<ByteStream>;

    /// Run one turn without streaming.
    async fn send(&self, request: &ChatRequest) -> ChatResult<ChatResponse>;

    /// Authoritative message history for a session, oldest first.
    async fn fetch_history(&self, session_id: &str) -> ChatResult<Vec<Message>>;

    /// Authoritative active agent for a session.
    async fn fetch_active_agent(&self, session_id: &str) -> ChatResult<ActiveAgent>;

    async fn list_sessions(&self) -> ChatResult<Vec<SessionSummary>>;

    async fn delete_message(&self, message_id: i64) -> ChatResult<()>;

    async fn clear_history(&self, session_id: &str) -> ChatResult<()>;
}
