use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Prefix of every failure surfaced to the user as an assistant message
pub const ERROR_MESSAGE_PREFIX: &str = "Sorry, something went wrong. ";

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    /// Parse a role string from history. Anything that is not `user` is
    /// shown as an assistant message.
    pub fn from_wire(role: Option<&str>) -> Self {
        match role {
            Some("user") => MessageRole::User,
            _ => MessageRole::Assistant,
        }
    }
}

/// A single conversation message. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Server row id, or a local millisecond id for optimistic messages
    pub id: i64,
    pub role: MessageRole,
    pub content: String,
    /// Tool-call trace recorded with an assistant reply
    #[serde(default)]
    pub context_log: Option<Value>,
    /// Agent that produced an assistant reply
    #[serde(default)]
    pub agent: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Message {
    /// Create a user message stamped with the current time
    pub fn user(id: i64, content: impl Into<String>) -> Self {
        Self {
            id,
            role: MessageRole::User,
            content: content.into(),
            context_log: None,
            agent: None,
            created_at: Some(Utc::now()),
        }
    }

    /// Create an assistant message stamped with the current time
    pub fn assistant(id: i64, content: impl Into<String>) -> Self {
        Self {
            id,
            role: MessageRole::Assistant,
            content: content.into(),
            context_log: None,
            agent: None,
            created_at: Some(Utc::now()),
        }
    }

    /// Create the synthetic assistant message that reports a failed turn
    pub fn error(id: i64, detail: &str) -> Self {
        Self::assistant(id, format!("{}{}", ERROR_MESSAGE_PREFIX, detail))
    }

    pub fn with_context_log(mut self, context_log: Option<Value>) -> Self {
        self.context_log = context_log;
        self
    }

    pub fn with_agent(mut self, agent: Option<String>) -> Self {
        self.agent = agent;
        self
    }

    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }
}

/// Stored message payload inside a history row
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryData {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub context_log: Option<Value>,
    #[serde(default)]
    pub agent: Option<String>,
}

/// One row of `GET /api/chat/history`
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryItem {
    pub id: i64,
    #[serde(default)]
    pub data: Option<HistoryData>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl HistoryItem {
    /// Convert a stored row into a client message
    pub fn into_message(self) -> Message {
        let data = self.data.unwrap_or_default();
        Message {
            id: self.id,
            role: MessageRole::from_wire(data.role.as_deref()),
            content: data.content.unwrap_or_default(),
            context_log: data.context_log.filter(|log| !log.is_null()),
            agent: data.agent,
            created_at: self.created_at.as_deref().and_then(parse_timestamp),
        }
    }
}

/// Response body of `GET /api/chat/history`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub items: Vec<HistoryItem>,
}

impl HistoryResponse {
    pub fn into_messages(self) -> Vec<Message> {
        self.items.into_iter().map(HistoryItem::into_message).collect()
    }
}

/// Parse a stored timestamp: RFC 3339, or a naive `YYYY-MM-DD HH:MM:SS`
/// value taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}
