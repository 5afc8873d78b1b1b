//! Plain-text rendering for the command-line front end.

use crate::models::{agent_label, Message, MessageRole, Session, SessionSummary};
use crate::orchestrator::TurnOutcome;
use crate::state::{ToolStatus, Transition};

/// Speaker name shown before a message
fn speaker(message: &Message) -> String {
    match message.role {
        MessageRole::User => "you".to_string(),
        MessageRole::Assistant => message
            .agent
            .as_deref()
            .map(|agent| agent_label(agent).unwrap_or(agent).to_string())
            .unwrap_or_else(|| "assistant".to_string()),
    }
}

pub fn format_message(message: &Message) -> String {
    let time = message
        .created_at
        .map(|t| format!("[{}] ", t.format("%Y-%m-%d %H:%M")))
        .unwrap_or_default();
    format!("{}{}: {}", time, speaker(message), message.content)
}

pub fn format_history(session: &Session) -> String {
    if session.messages.is_empty() {
        return format!("(no messages in session '{}')", session.id);
    }
    session
        .messages
        .iter()
        .map(format_message)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_sessions(sessions: &[SessionSummary]) -> String {
    if sessions.is_empty() {
        return "(no sessions)".to_string();
    }
    sessions
        .iter()
        .map(|s| {
            let mut line = format!("{}  {} messages", s.session_id, s.message_count);
            if let Some(last) = &s.last_message {
                line.push_str(&format!("  last {}", last));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_tool(status: &ToolStatus) -> String {
    match &status.agent {
        Some(agent) => format!("[{} is using {}]", agent, status.tool),
        None => format!("[using {}]", status.tool),
    }
}

/// Live text for a transition, if it has any
pub fn format_transition(transition: &Transition) -> Option<String> {
    match transition {
        Transition::ContentAppended { delta, .. } => Some(delta.clone()),
        Transition::ToolStarted(status) => Some(format!("{}\n", format_tool(status))),
        Transition::AgentChanged(active) => Some(format!("[{}]\n", active.label)),
        _ => None,
    }
}

/// Final text for a finished turn, read from the session it updated
pub fn format_outcome(outcome: &TurnOutcome, session: &Session) -> String {
    let find = |id: i64| {
        session
            .messages
            .iter()
            .find(|m| m.id == id)
            .map(format_message)
            .unwrap_or_default()
    };
    match outcome {
        TurnOutcome::Completed { message_id }
        | TurnOutcome::Failed { message_id }
        | TurnOutcome::TransportFailed { message_id, .. } => find(*message_id),
        TurnOutcome::Recovered(recovery) => {
            let reply = session
                .messages
                .last()
                .filter(|m| m.role == MessageRole::Assistant)
                .map(format_message)
                .unwrap_or_default();
            if recovery.is_complete() {
                reply
            } else {
                format!("{}\n(stream ended early; history could not be fully reloaded)", reply)
            }
        }
    }
}
