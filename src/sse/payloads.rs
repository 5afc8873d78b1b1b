//! SSE payload deserialization structs
//!
//! Every field is optional or defaulted, and text fields accept any JSON
//! value, so a recognized event with valid JSON always reaches the state
//! machine.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Text field that tolerates non-string values.
///
/// `null` is absent, a string is taken as is, anything else is rendered as
/// its JSON text.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_string(deserializer).map(Option::unwrap_or_default)
}

/// `token` payload
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct TokenPayload {
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: Option<String>,
}

/// `tool_start` payload
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ToolStartPayload {
    #[serde(default, deserialize_with = "lenient_string")]
    pub tool: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub agent: Option<String>,
}

/// `agent_start` payload
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct AgentStartPayload {
    #[serde(default, deserialize_with = "lenient_string")]
    pub agent: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub label: Option<String>,
}

/// `error` payload
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorPayload {
    #[serde(default, deserialize_with = "lenient_string")]
    pub detail: Option<String>,
}

/// Terminal `done` payload.
///
/// Same shape as the non-streaming `POST /api/chat` response body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DonePayload {
    /// The complete assistant reply
    #[serde(default, deserialize_with = "lenient_text")]
    pub response: String,
    /// Tool-call trace for the turn
    #[serde(default)]
    pub context_log: Option<Value>,
    /// Agent that stays active after this turn
    #[serde(default, deserialize_with = "lenient_string")]
    pub active_agent: Option<String>,
    /// Display label for `active_agent`
    #[serde(default, deserialize_with = "lenient_string")]
    pub active_agent_label: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_done_null_response_is_empty() {
        let payload: DonePayload = serde_json::from_value(json!({"response": null})).unwrap();
        assert_eq!(payload.response, "");
    }

    #[test]
    fn test_non_string_fields_become_text() {
        let payload: DonePayload =
            serde_json::from_value(json!({"response": 42, "active_agent": true})).unwrap();
        assert_eq!(payload.response, "42");
        assert_eq!(payload.active_agent.as_deref(), Some("true"));

        let payload: ErrorPayload = serde_json::from_value(json!({"detail": 503})).unwrap();
        assert_eq!(payload.detail.as_deref(), Some("503"));
    }
}
