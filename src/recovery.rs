//! History resync for turns whose terminal event never arrived.
//!
//! Replaces the session's messages and active agent with what the backend
//! has stored. Each fetch is independent: a failed fetch is logged and leaves
//! that part of the session untouched.

use crate::error::ChatError;
use crate::models::Session;
use crate::traits::ChatApi;

/// What a resync managed to restore
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryOutcome {
    /// Number of messages restored, or the history fetch error
    pub history: Result<usize, ChatError>,
    /// Whether the active agent was restored, or the fetch error
    pub active_agent: Result<(), ChatError>,
}

impl RecoveryOutcome {
    /// Both fetches succeeded
    pub fn is_complete(&self) -> bool {
        self.history.is_ok() && self.active_agent.is_ok()
    }
}

/// Overwrite `session` with the backend's authoritative state.
pub async fn resync(api: &dyn ChatApi, session: &mut Session) -> RecoveryOutcome {
    tracing::warn!(session_id = %session.id, "stream ended without a terminal event, resyncing");

    let (history, active_agent) = futures::join!(
        api.fetch_history(&session.id),
        api.fetch_active_agent(&session.id)
    );

    let history = history.map(|messages| {
        let count = messages.len();
        session.messages = messages;
        count
    });
    if let Err(err) = &history {
        tracing::warn!(session_id = %session.id, error = %err, "history resync failed");
    }

    let active_agent = active_agent.map(|active| session.set_active(active));
    if let Err(err) = &active_agent {
        tracing::warn!(session_id = %session.id, error = %err, "active agent resync failed");
    }

    RecoveryOutcome {
        history,
        active_agent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MockHttpClient, MockResponse};
    use crate::client::ChatClient;
    use crate::models::Message;
    use serde_json::json;
    use std::sync::Arc;

    fn api(mock: &MockHttpClient) -> ChatClient {
        ChatClient::new("http://test", Arc::new(mock.clone()))
    }

    fn stale_session() -> Session {
        let mut session = Session::new("s1");
        session.messages.push(Message::user(1, "speculative"));
        session.active_agent = "beryllium".to_string();
        session
    }

    #[tokio::test]
    async fn test_resync_overwrites_session() {
        let mock = MockHttpClient::new();
        mock.set_response(
            "http://test/api/chat/history",
            MockResponse::json(
                200,
                json!({"items": [
                    {"id": 10, "data": {"role": "user", "content": "q"}},
                    {"id": 11, "data": {"role": "assistant", "content": "a"}}
                ]}),
            ),
        );
        mock.set_response(
            "http://test/api/chat/active-agent",
            MockResponse::json(
                200,
                json!({"active_agent": "helium", "active_agent_label": "Helium (Life Goals)"}),
            ),
        );

        let mut session = stale_session();
        let outcome = resync(&api(&mock), &mut session).await;

        assert!(outcome.is_complete());
        assert_eq!(outcome.history, Ok(2));
        let ids: Vec<i64> = session.messages.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![10, 11]);
        assert_eq!(session.active_agent, "helium");
        assert_eq!(session.active_agent_label, "Helium (Life Goals)");
    }

    #[tokio::test]
    async fn test_failed_history_fetch_keeps_messages() {
        let mock = MockHttpClient::new();
        mock.set_response(
            "http://test/api/chat/history",
            MockResponse::json(500, json!({"detail": "db down"})),
        );
        mock.set_response(
            "http://test/api/chat/active-agent",
            MockResponse::json(200, json!({"active_agent": "lithium"})),
        );

        let mut session = stale_session();
        let outcome = resync(&api(&mock), &mut session).await;

        assert!(!outcome.is_complete());
        assert!(outcome.history.is_err());
        assert_eq!(session.messages.len(), 1);
        assert_eq!(session.messages[0].content, "speculative");
        assert_eq!(session.active_agent, "lithium");
        assert_eq!(session.active_agent_label, "Lithium (State Check)");
    }

    #[tokio::test]
    async fn test_failed_agent_fetch_keeps_agent() {
        let mock = MockHttpClient::new();
        mock.set_response(
            "http://test/api/chat/history",
            MockResponse::json(200, json!({"items": []})),
        );

        let mut session = stale_session();
        let outcome = resync(&api(&mock), &mut session).await;

        assert_eq!(outcome.history, Ok(0));
        assert!(outcome.active_agent.is_err());
        assert!(session.messages.is_empty());
        assert_eq!(session.active_agent, "beryllium");
    }
}
