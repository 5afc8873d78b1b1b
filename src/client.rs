//! HTTP client for the chat backend.
//!
//! Maps the backend's REST surface onto [`ChatApi`]. Every request carries
//! the `session_token` cookie when one is configured.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::error::{classify_http_error, status_detail, ChatResult, NetworkError};
use crate::models::{
    ActiveAgent, ActiveAgentResponse, ChatRequest, ChatResponse, HistoryResponse, Message,
    SessionSummary, SessionsResponse, DEFAULT_SESSION_ID,
};
use crate::traits::{ByteStream, ChatApi, Headers, HttpClient, Response};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Name of the auth cookie issued by the backend's login flow
pub const SESSION_COOKIE: &str = "session_token";

/// Client for the chat backend API.
#[derive(Clone)]
pub struct ChatClient {
    /// Base URL, without a trailing slash
    pub base_url: String,
    session_token: Option<String>,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.session_token.is_some())
            .finish()
    }
}

impl ChatClient {
    pub fn new(base_url: impl Into<String>, http: Arc<dyn HttpClient>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_token: None,
            http,
        }
    }

    /// Send `session_token=<token>` with every request
    pub fn with_session_token(mut self, token: Option<String>) -> Self {
        self.session_token = token.filter(|t| !t.is_empty());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    /// `path` plus `?session_id=..`, omitted for the default session
    fn session_scoped_url(&self, path: &str, session_id: &str) -> String {
        if session_id == DEFAULT_SESSION_ID {
            self.url(path)
        } else {
            self.session_query_url(path, session_id)
        }
    }

    fn session_query_url(&self, path: &str, session_id: &str) -> String {
        format!(
            "{}?session_id={}",
            self.url(path),
            urlencoding::encode(session_id)
        )
    }

    fn headers(&self) -> Headers {
        let mut headers = Headers::new();
        if let Some(token) = &self.session_token {
            headers.insert("Cookie".to_string(), format!("{}={}", SESSION_COOKIE, token));
        }
        headers
    }

    fn json_headers(&self) -> Headers {
        let mut headers = self.headers();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers
    }

    fn encode(request: &ChatRequest) -> ChatResult<String> {
        serde_json::to_string(request).map_err(|e| {
            NetworkError::Other {
                message: format!("failed to encode request: {}", e),
            }
            .into()
        })
    }

    /// Turn a non-2xx response into an error carrying its detail text
    fn check(response: Response) -> ChatResult<Response> {
        if response.is_success() {
            return Ok(response);
        }
        let message = status_detail(response.status, &response.text_lossy());
        Err(NetworkError::HttpStatus {
            status: response.status,
            message,
        }
        .into())
    }

    fn decode<T: DeserializeOwned>(response: &Response) -> ChatResult<T> {
        response.json().map_err(|e| {
            NetworkError::InvalidResponse {
                message: e.to_string(),
            }
            .into()
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> ChatResult<T> {
        let response = self
            .http
            .get(url, &self.headers())
            .await
            .map_err(|e| classify_http_error(e, url))?;
        Self::decode(&Self::check(response)?)
    }

    async fn delete_url(&self, url: &str) -> ChatResult<()> {
        let response = self
            .http
            .delete(url, &self.headers())
            .await
            .map_err(|e| classify_http_error(e, url))?;
        Self::check(response)?;
        Ok(())
    }
}

#[async_trait]
impl ChatApi for ChatClient {
    async fn open_stream(&self, request: &ChatRequest) -> ChatResult<ByteStream> {
        let url = self.url("/chat/stream");
        let body = Self::encode(request)?;
        let mut headers = self.json_headers();
        headers.insert("Accept".to_string(), "text/event-stream".to_string());

        tracing::debug!(%url, session_id = %request.session_id, "opening chat stream");
        let stream = self
            .http
            .post_stream(&url, &body, &headers)
            .await
            .map_err(|e| classify_http_error(e, &url))?;
        Ok(stream)
    }

    async fn send(&self, request: &ChatRequest) -> ChatResult<ChatResponse> {
        let url = self.url("/chat");
        let body = Self::encode(request)?;
        let response = self
            .http
            .post(&url, &body, &self.json_headers())
            .await
            .map_err(|e| classify_http_error(e, &url))?;
        Self::decode(&Self::check(response)?)
    }

    async fn fetch_history(&self, session_id: &str) -> ChatResult<Vec<Message>> {
        let url = self.session_scoped_url("/chat/history", session_id);
        let history: HistoryResponse = self.get_json(&url).await?;
        Ok(history.into_messages())
    }

    async fn fetch_active_agent(&self, session_id: &str) -> ChatResult<ActiveAgent> {
        let url = self.session_query_url("/chat/active-agent", session_id);
        let response: ActiveAgentResponse = self.get_json(&url).await?;
        Ok(response.into())
    }

    async fn list_sessions(&self) -> ChatResult<Vec<SessionSummary>> {
        let url = self.url("/chat/sessions");
        let response: SessionsResponse = self.get_json(&url).await?;
        Ok(response.sessions)
    }

    async fn delete_message(&self, message_id: i64) -> ChatResult<()> {
        let url = self.url(&format!("/chat/history/{}", message_id));
        self.delete_url(&url).await
    }

    async fn clear_history(&self, session_id: &str) -> ChatResult<()> {
        let url = self.session_query_url("/chat/history", session_id);
        self.delete_url(&url).await
    }
}
