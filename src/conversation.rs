//! Conversation state and session-level operations
//!
//! A [`Conversation`] is the session plus the per-turn streaming state and
//! the `sending` flag. Turns are driven by
//! [`crate::orchestrator::StreamOrchestrator`]; everything else a client does
//! with a session lives here.

use crate::error::ChatResult;
use crate::models::{Session, SessionSummary};
use crate::state::StreamingState;
use crate::traits::ChatApi;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    pub session: Session,
    pub streaming: StreamingState,
    /// Whether a turn is in flight
    pub sending: bool,
}

impl Conversation {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session: Session::new(session_id),
            ..Self::default()
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session.id
    }

    /// Nothing left over from a previous turn
    pub fn is_idle(&self) -> bool {
        !self.sending && self.streaming.is_neutral()
    }

    /// Replace the message list with the stored history.
    ///
    /// On failure the list is emptied and the error returned.
    pub async fn load_history(&mut self, api: &dyn ChatApi) -> ChatResult<usize> {
        match api.fetch_history(&self.session.id).await {
            Ok(messages) => {
                let count = messages.len();
                self.session.messages = messages;
                tracing::debug!(session_id = %self.session.id, count, "loaded history");
                Ok(count)
            }
            Err(err) => {
                tracing::warn!(session_id = %self.session.id, error = %err, "failed to load history");
                self.session.messages.clear();
                Err(err)
            }
        }
    }

    /// Refresh the active agent. On failure nothing changes.
    pub async fn load_active_agent(&mut self, api: &dyn ChatApi) -> ChatResult<()> {
        let active = api.fetch_active_agent(&self.session.id).await?;
        self.session.set_active(active);
        Ok(())
    }

    /// Point the conversation at `session_id` and load its state.
    ///
    /// Both loads are attempted; the first failure is returned.
    pub async fn switch_session(
        &mut self,
        api: &dyn ChatApi,
        session_id: impl Into<String>,
    ) -> ChatResult<()> {
        let session_id = session_id.into();
        tracing::info!(%session_id, "switching session");
        self.session.id = session_id;
        self.streaming.reset();

        let history = self.load_history(api).await;
        let agent = self.load_active_agent(api).await;
        history?;
        agent
    }

    /// Start a new, empty session owned by the manager agent
    pub fn new_session(&mut self) -> &str {
        self.session = Session::fresh();
        self.streaming.reset();
        tracing::info!(session_id = %self.session.id, "started new session");
        &self.session.id
    }

    pub async fn list_sessions(&self, api: &dyn ChatApi) -> ChatResult<Vec<SessionSummary>> {
        api.list_sessions().await
    }

    /// Delete a message remotely and locally.
    ///
    /// The local copy is removed even when the remote delete fails, since
    /// optimistic messages have no stored row.
    pub async fn delete_message(&mut self, api: &dyn ChatApi, message_id: i64) -> ChatResult<()> {
        let result = api.delete_message(message_id).await;
        if let Err(err) = &result {
            tracing::debug!(message_id, error = %err, "remote delete failed, removing locally");
        }
        self.session.messages.retain(|m| m.id != message_id);
        result
    }

    /// Clear the session's stored history, then empty local state
    pub async fn clear_history(&mut self, api: &dyn ChatApi) -> ChatResult<()> {
        api.clear_history(&self.session.id).await?;
        self.session.messages.clear();
        self.session.reset_agent();
        Ok(())
    }
}

impl From<Session> for Conversation {
    fn from(session: Session) -> Self {
        Self {
            session,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MockHttpClient, MockResponse};
    use crate::client::ChatClient;
    use crate::models::{Message, MANAGER_AGENT, MANAGER_LABEL};
    use serde_json::json;
    use std::sync::Arc;

    fn api(mock: &MockHttpClient) -> ChatClient {
        ChatClient::new("http://test", Arc::new(mock.clone()))
    }

    fn with_messages(ids: &[i64]) -> Conversation {
        let mut conversation = Conversation::default();
        for id in ids {
            conversation.session.messages.push(Message::user(*id, "m"));
        }
        conversation
    }

    #[test]
    fn test_new_conversation_is_idle() {
        let conversation = Conversation::default();
        assert!(conversation.is_idle());
        assert_eq!(conversation.session_id(), "default");
        assert_eq!(conversation.session.active_agent, MANAGER_AGENT);
    }

    #[test]
    fn test_new_session() {
        let mut conversation = with_messages(&[1, 2]);
        conversation.session.active_agent = "helium".to_string();

        let id = conversation.new_session().to_string();

        assert!(id.starts_with("session-"));
        assert!(conversation.session.messages.is_empty());
        assert_eq!(conversation.session.active_agent, MANAGER_AGENT);
        assert_eq!(conversation.session.active_agent_label, MANAGER_LABEL);
    }

    #[tokio::test]
    async fn test_load_history_failure_empties_messages() {
        let mock = MockHttpClient::new();
        mock.set_response(
            "http://test/api/chat/history",
            MockResponse::json(500, json!({})),
        );

        let mut conversation = with_messages(&[1]);
        let result = conversation.load_history(&api(&mock)).await;

        assert!(result.is_err());
        assert!(conversation.session.messages.is_empty());
    }

    #[tokio::test]
    async fn test_load_active_agent_failure_keeps_agent() {
        let mock = MockHttpClient::new();
        let mut conversation = Conversation::default();
        conversation.session.active_agent = "lithium".to_string();

        assert!(conversation.load_active_agent(&api(&mock)).await.is_err());
        assert_eq!(conversation.session.active_agent, "lithium");
    }

    #[tokio::test]
    async fn test_switch_session_loads_state() {
        let mock = MockHttpClient::new();
        mock.set_response(
            "http://test/api/chat/history",
            MockResponse::json(200, json!({"items": [{"id": 5, "data": {"role": "user", "content": "x"}}]})),
        );
        mock.set_response(
            "http://test/api/chat/active-agent",
            MockResponse::json(200, json!({"active_agent": "beryllium", "active_agent_label": "Beryllium (Tasks)"})),
        );

        let mut conversation = Conversation::default();
        conversation
            .switch_session(&api(&mock), "session-1")
            .await
            .unwrap();

        assert_eq!(conversation.session_id(), "session-1");
        assert_eq!(conversation.session.messages.len(), 1);
        assert_eq!(conversation.session.active_agent, "beryllium");
        let urls: Vec<_> = mock.get_requests().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec![
                "http://test/api/chat/history?session_id=session-1",
                "http://test/api/chat/active-agent?session_id=session-1",
            ]
        );
    }

    #[tokio::test]
    async fn test_delete_message_removes_locally_on_remote_failure() {
        let mock = MockHttpClient::new();
        mock.set_response(
            "http://test/api/chat/history/",
            MockResponse::json(404, json!({"detail": "Not found"})),
        );

        let mut conversation = with_messages(&[1, 2, 3]);
        let result = conversation.delete_message(&api(&mock), 2).await;

        assert!(result.is_err());
        let ids: Vec<i64> = conversation.session.messages.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_clear_history_resets_agent() {
        let mock = MockHttpClient::new();
        mock.set_response(
            "http://test/api/chat/history",
            MockResponse::json(200, json!({"ok": true})),
        );

        let mut conversation = with_messages(&[1, 2]);
        conversation.session.active_agent = "helium".to_string();
        conversation.clear_history(&api(&mock)).await.unwrap();

        assert!(conversation.session.messages.is_empty());
        assert_eq!(conversation.session.active_agent, MANAGER_AGENT);
    }

    #[tokio::test]
    async fn test_clear_history_failure_keeps_messages() {
        let mock = MockHttpClient::new();
        mock.set_response(
            "http://test/api/chat/history",
            MockResponse::json(500, json!({})),
        );

        let mut conversation = with_messages(&[1, 2]);
        assert!(conversation.clear_history(&api(&mock)).await.is_err());
        assert_eq!(conversation.session.messages.len(), 2);
    }
}
