use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::agent::ActiveAgent;
use super::message::Message;

/// Session id used when the user has not picked or created a session
pub const DEFAULT_SESSION_ID: &str = "default";

/// Conversation state for one session.
///
/// The streaming core only touches `active_agent`, `active_agent_label` and
/// appends to `messages`; everything else belongs to the conversation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: String,
    pub messages: Vec<Message>,
    pub active_agent: String,
    pub active_agent_label: String,
    /// Last local id handed out, keeps optimistic ids strictly increasing
    last_local_id: i64,
}

impl Session {
    /// Create an empty session owned by the manager agent
    pub fn new(id: impl Into<String>) -> Self {
        let manager = ActiveAgent::manager();
        Self {
            id: id.into(),
            messages: Vec::new(),
            active_agent: manager.agent,
            active_agent_label: manager.label,
            last_local_id: 0,
        }
    }

    /// Create a fresh session with a `session-<unix-millis>` id
    pub fn fresh() -> Self {
        Self::new(format!("session-{}", Utc::now().timestamp_millis()))
    }

    pub fn is_default(&self) -> bool {
        self.id == DEFAULT_SESSION_ID
    }

    /// Next id for a locally created message
    pub fn next_local_id(&mut self) -> i64 {
        let id = Utc::now()
            .timestamp_millis()
            .max(self.last_local_id + 1);
        self.last_local_id = id;
        id
    }

    /// Append an optimistic user message, returning its id
    pub fn push_user_message(&mut self, content: impl Into<String>) -> i64 {
        let id = self.next_local_id();
        self.messages.push(Message::user(id, content));
        id
    }

    /// Append the synthetic assistant message for a failed turn
    pub fn push_error_message(&mut self, detail: &str) -> i64 {
        let id = self.next_local_id();
        self.messages.push(Message::error(id, detail));
        id
    }

    /// Current agent identity
    pub fn active(&self) -> ActiveAgent {
        ActiveAgent {
            agent: self.active_agent.clone(),
            label: self.active_agent_label.clone(),
        }
    }

    pub fn set_active(&mut self, active: ActiveAgent) {
        self.active_agent = active.agent;
        self.active_agent_label = active.label;
    }

    /// Hand the session back to the manager agent
    pub fn reset_agent(&mut self) {
        self.set_active(ActiveAgent::manager());
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_ID)
    }
}

/// One entry of `GET /api/chat/sessions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    #[serde(default)]
    pub started: Option<String>,
    #[serde(default)]
    pub last_message: Option<String>,
    #[serde(default)]
    pub message_count: u64,
}

/// Response body of `GET /api/chat/sessions`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionsResponse {
    #[serde(default)]
    pub sessions: Vec<SessionSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MessageRole, MANAGER_AGENT, MANAGER_LABEL};

    #[test]
    fn test_new_session_is_owned_by_manager() {
        let session = Session::new("s1");
        assert_eq!(session.id, "s1");
        assert!(session.messages.is_empty());
        assert_eq!(session.active_agent, MANAGER_AGENT);
        assert_eq!(session.active_agent_label, MANAGER_LABEL);
    }

    #[test]
    fn test_default_session() {
        assert!(Session::default().is_default());
        assert!(!Session::fresh().is_default());
        assert!(Session::fresh().id.starts_with("session-"));
    }

    #[test]
    fn test_local_ids_strictly_increase() {
        let mut session = Session::default();
        let a = session.next_local_id();
        let b = session.next_local_id();
        let c = session.next_local_id();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_push_user_and_error_messages() {
        let mut session = Session::default();
        let user_id = session.push_user_message("hello");
        let err_id = session.push_error_message("HTTP 502");
        assert!(user_id < err_id);
        assert_eq!(session.messages[0].role, MessageRole::User);
        assert_eq!(
            session.last_message().unwrap().content,
            "Sorry, something went wrong. HTTP 502"
        );
    }

    #[test]
    fn test_sessions_response() {
        let json = r#"{"sessions": [{"session_id": "session-1", "started": "2025-01-01", "last_message": "2025-01-02", "message_count": 4}]}"#;
        let response: SessionsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.sessions.len(), 1);
        assert_eq!(response.sessions[0].message_count, 4);
    }
}
