//! Streaming state management
//!
//! - StreamingState: per-turn partial output, tool indicator, terminal flag
//! - apply_event: the session state machine driven by decoded events

mod machine;
mod streaming;

pub use machine::{apply_event, complete_turn, fail_turn, Transition, UNKNOWN_ERROR_DETAIL};
pub use streaming::{StreamingState, ToolStatus};
