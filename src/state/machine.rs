//! Session state machine
//!
//! Applies one event at a time, in arrival order, to the streaming state
//! and the session it belongs to.
//!
//! | event | effect |
//! |---|---|
//! | `token` | clear the tool indicator, append content |
//! | `tool_start` | set (or replace) the tool indicator |
//! | `tool_end` | nothing; the indicator stays until the next `tool_start` or `token` |
//! | `agent_start` | set the session's active agent |
//! | `done` | terminal: clear partial state, append the reply, set the active agent |
//! | `error` | terminal: clear partial state, append an error message |
//! | other | ignored |

use crate::models::{ActiveAgent, Message, Session};
use crate::sse::{ChatEvent, DonePayload, ParsedEvent};

use super::streaming::{StreamingState, ToolStatus};

/// Text used when an `error` event carries no detail
pub const UNKNOWN_ERROR_DETAIL: &str = "Unknown error";

/// Observable outcome of applying one event
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Text appended to the partial reply
    ContentAppended {
        delta: String,
        /// Whether this token cleared a visible tool indicator
        cleared_tool: bool,
    },
    /// Tool indicator set
    ToolStarted(ToolStatus),
    /// `tool_end` received; the indicator was deliberately left in place
    ToolEnded,
    /// Active agent changed
    AgentChanged(ActiveAgent),
    /// Terminal reply appended
    Completed { message_id: i64 },
    /// Terminal error appended
    Failed { message_id: i64 },
    /// Unrecognized event
    Ignored { event_type: String },
}

impl Transition {
    /// Whether this transition ends the turn
    pub fn is_terminal(&self) -> bool {
        matches!(self, Transition::Completed { .. } | Transition::Failed { .. })
    }
}

/// Apply one event to the streaming state and session
pub fn apply_event(
    event: &ParsedEvent,
    state: &mut StreamingState,
    session: &mut Session,
) -> Transition {
    let transition = match event.to_chat_event() {
        ChatEvent::Token { content } => {
            // First token is evidence the tool phase ended
            let cleared_tool = state.tool_status.take().is_some();
            state.content.push_str(&content);
            Transition::ContentAppended {
                delta: content,
                cleared_tool,
            }
        }
        ChatEvent::ToolStart { tool, agent } => {
            let status = ToolStatus { tool, agent };
            state.tool_status = Some(status.clone());
            Transition::ToolStarted(status)
        }
        // tool_start/tool_end often share a chunk; clearing here would
        // hide the indicator before anyone sees it
        ChatEvent::ToolEnd => Transition::ToolEnded,
        ChatEvent::AgentStart { agent, label } => {
            let active = ActiveAgent::resolve(agent, label);
            session.set_active(active.clone());
            Transition::AgentChanged(active)
        }
        ChatEvent::Done(payload) => Transition::Completed {
            message_id: complete_turn(payload, state, session),
        },
        ChatEvent::Error { detail } => Transition::Failed {
            message_id: fail_turn(detail.as_deref(), state, session),
        },
        ChatEvent::Unknown { event_type } => Transition::Ignored { event_type },
    };

    tracing::debug!(session_id = %session.id, event_type = %event.event_type, ?transition, "applied event");
    transition
}

/// Finalize a turn from its authoritative reply, returning the new
/// message's id.
///
/// Shared by the `done` event and the non-streaming chat endpoint.
pub fn complete_turn(payload: DonePayload, state: &mut StreamingState, session: &mut Session) -> i64 {
    state.done_received = true;
    state.clear_partial();

    let DonePayload {
        response,
        context_log,
        active_agent,
        active_agent_label,
    } = payload;

    let message_id = session.next_local_id();
    session.messages.push(
        Message::assistant(message_id, response)
            .with_context_log(context_log.filter(|log| !log.is_null()))
            .with_agent(active_agent.clone()),
    );
    session.set_active(ActiveAgent::resolve(active_agent, active_agent_label));
    message_id
}

/// Finalize a turn with an `error` event.
///
/// Treated as terminal, so no history resync follows an error the backend
/// already reported.
pub fn fail_turn(detail: Option<&str>, state: &mut StreamingState, session: &mut Session) -> i64 {
    state.done_received = true;
    state.clear_partial();

    let detail = detail
        .filter(|d| !d.is_empty())
        .unwrap_or(UNKNOWN_ERROR_DETAIL);
    session.push_error_message(detail)
}
