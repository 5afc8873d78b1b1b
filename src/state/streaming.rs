//! Per-turn streaming state
//!
//! Created neutral at stream start, mutated only by the state machine while
//! the stream runs, and reset to neutral on every exit path.

/// Tool-activity indicator shown while an agent runs a non-generative step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolStatus {
    /// Tool being executed
    pub tool: String,
    /// Agent executing the tool
    pub agent: Option<String>,
}

/// Streaming state for one in-flight turn
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamingState {
    /// Whether a response stream is open
    pub streaming: bool,
    /// Partial assistant text accumulated from `token` events
    pub content: String,
    /// Current tool indicator, if any
    pub tool_status: Option<ToolStatus>,
    /// Whether a terminal event has been applied
    pub done_received: bool,
}

impl StreamingState {
    /// Create a neutral state
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter streaming mode with empty partial state
    pub fn begin(&mut self) {
        *self = Self {
            streaming: true,
            ..Self::default()
        };
    }

    /// Drop partial output and the tool indicator, keeping the flags
    pub fn clear_partial(&mut self) {
        self.content.clear();
        self.tool_status = None;
    }

    /// Return to neutral. Safe to call any number of times.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether nothing from a turn is left behind
    pub fn is_neutral(&self) -> bool {
        *self == Self::default()
    }
}
