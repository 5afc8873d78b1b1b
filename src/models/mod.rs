//! Data types shared by the client, the state machine and the CLI.

mod agent;
mod message;
mod request;
mod session;

pub use agent::{
    agent_label, ActiveAgent, ActiveAgentResponse, MANAGER_AGENT, MANAGER_LABEL,
};
pub use message::{
    parse_timestamp, HistoryData, HistoryItem, HistoryResponse, Message, MessageRole,
    ERROR_MESSAGE_PREFIX,
};
pub use request::{ChatRequest, ChatResponse};
pub use session::{Session, SessionSummary, SessionsResponse, DEFAULT_SESSION_ID};
