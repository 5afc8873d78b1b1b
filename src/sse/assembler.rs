//! Line classification and event assembly
//!
//! Pairs each `event:` line with the `data:` line that follows it. The
//! pending type lives on the assembler, not on any one chunk, so a frame
//! split across chunks still pairs correctly.

use crate::sse::decoder::FrameDecoder;
use crate::sse::events::{ParsedEvent, SseLine};

/// Classify a single line (without its separator)
pub fn parse_sse_line(line: &str) -> SseLine {
    if line.is_empty() {
        return SseLine::Empty;
    }

    if let Some(stripped) = line.strip_prefix(':') {
        return SseLine::Comment(stripped.trim().to_string());
    }

    if let Some(rest) = line.strip_prefix("event:") {
        return SseLine::Event(rest.trim().to_string());
    }

    if let Some(rest) = line.strip_prefix("data:") {
        return SseLine::Data(rest.trim().to_string());
    }

    // Unknown line format - treat as comment
    SseLine::Comment(line.to_string())
}

/// Stateful pairing of type declarations with payload lines.
///
/// - A type declaration overwrites any type still waiting for its payload.
/// - A payload with a pending type is parsed as JSON; the pending type is
///   cleared whether or not parsing succeeds.
/// - Payloads without a pending type, blank lines and comments are ignored.
#[derive(Debug, Default)]
pub struct EventAssembler {
    pending_type: Option<String>,
    dropped: usize,
}

impl EventAssembler {
    /// Create a new assembler
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one line, returning an event when it completes a valid frame
    pub fn consume(&mut self, line: &str) -> Option<ParsedEvent> {
        match parse_sse_line(line) {
            SseLine::Event(event_type) => {
                // An empty name never pairs with a payload
                let next = (!event_type.is_empty()).then_some(event_type);
                if let Some(discarded) = std::mem::replace(&mut self.pending_type, next) {
                    tracing::debug!(event_type = %discarded, "type declaration superseded before its payload");
                }
                None
            }
            SseLine::Data(payload) => {
                let event_type = self.pending_type.take()?;
                match serde_json::from_str(&payload) {
                    Ok(data) => Some(ParsedEvent { event_type, data }),
                    Err(e) => {
                        self.dropped += 1;
                        tracing::warn!(%event_type, error = %e, "dropping event with malformed JSON payload");
                        None
                    }
                }
            }
            SseLine::Empty | SseLine::Comment(_) => None,
        }
    }

    /// Type declared but not yet paired with a payload
    pub fn pending_type(&self) -> Option<&str> {
        self.pending_type.as_deref()
    }

    /// Number of frames dropped for malformed JSON
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Clear the pending type
    pub fn reset(&mut self) {
        self.pending_type = None;
    }
}

/// [`FrameDecoder`] and [`EventAssembler`] chained: bytes in, events out.
#[derive(Debug, Default)]
pub struct EventDecoder {
    frames: FrameDecoder,
    assembler: EventAssembler,
}

impl EventDecoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one transport chunk, returning the events it completes in order
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<ParsedEvent> {
        let lines = self.frames.feed(chunk);
        lines
            .iter()
            .filter_map(|line| self.assembler.consume(line))
            .collect()
    }

    /// Flush the trailing line after end-of-stream
    pub fn finish(&mut self) -> Vec<ParsedEvent> {
        self.frames
            .flush()
            .and_then(|line| self.assembler.consume(&line))
            .into_iter()
            .collect()
    }

    /// Number of frames dropped for malformed JSON
    pub fn dropped(&self) -> usize {
        self.assembler.dropped()
    }
}
