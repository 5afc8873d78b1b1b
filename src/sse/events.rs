//! SSE line and event types
//!
//! Contains the line classification produced by the assembler, the untyped
//! [`ParsedEvent`] it emits, and the typed [`ChatEvent`] view the state
//! machine works with.

use serde_json::Value;

use super::payloads::{
    AgentStartPayload, DonePayload, ErrorPayload, TokenPayload, ToolStartPayload,
};

/// Represents a classified SSE line
#[derive(Debug, Clone, PartialEq)]
pub enum SseLine {
    /// Type declaration (e.g., "event: token")
    Event(String),
    /// Data payload (e.g., "data: {\"content\": \"hi\"}")
    Data(String),
    /// Empty line - frame separator
    Empty,
    /// Comment or unrecognized line
    Comment(String),
}

/// A type declaration paired with a syntactically valid JSON payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEvent {
    /// Declared event type, trimmed
    pub event_type: String,
    /// Decoded JSON payload
    pub data: Value,
}

impl ParsedEvent {
    pub fn new(event_type: impl Into<String>, data: Value) -> Self {
        Self {
            event_type: event_type.into(),
            data,
        }
    }

    /// Interpret this event as one of the recognized chat events.
    ///
    /// Recognized types always map to their variant; a payload that is not an
    /// object is read as empty. Only unrecognized types come back as
    /// [`ChatEvent::Unknown`].
    pub fn to_chat_event(&self) -> ChatEvent {
        match self.event_type.as_str() {
            "token" => ChatEvent::Token {
                content: self.payload::<TokenPayload>().content.unwrap_or_default(),
            },
            "tool_start" => {
                let p = self.payload::<ToolStartPayload>();
                ChatEvent::ToolStart {
                    tool: p.tool.unwrap_or_default(),
                    agent: p.agent,
                }
            }
            "tool_end" => ChatEvent::ToolEnd,
            "agent_start" => {
                let p = self.payload::<AgentStartPayload>();
                ChatEvent::AgentStart {
                    agent: p.agent,
                    label: p.label,
                }
            }
            "done" => ChatEvent::Done(self.payload::<DonePayload>()),
            "error" => ChatEvent::Error {
                detail: self.payload::<ErrorPayload>().detail,
            },
            _ => ChatEvent::Unknown {
                event_type: self.event_type.clone(),
            },
        }
    }

    fn payload<T: serde::de::DeserializeOwned + Default>(&self) -> T {
        match serde_json::from_value(self.data.clone()) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(event_type = %self.event_type, error = %e, "event payload is not an object");
                T::default()
            }
        }
    }
}

/// Typed chat events from the streaming endpoint
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    /// Partial response text
    Token { content: String },
    /// An agent began a tool call
    ToolStart { tool: String, agent: Option<String> },
    /// A tool call finished
    ToolEnd,
    /// Control passed to an agent
    AgentStart {
        agent: Option<String>,
        label: Option<String>,
    },
    /// Terminal event carrying the authoritative reply
    Done(DonePayload),
    /// Backend reported a failure for this turn
    Error { detail: Option<String> },
    /// Anything else
    Unknown { event_type: String },
}
