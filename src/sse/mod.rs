//! SSE (Server-Sent Events) stream decoding
//!
//! Turns raw transport chunks from the chat streaming endpoint into typed
//! events. Frame format:
//! - `event: <type>` - type declaration line
//! - `data: <json>` - payload line
//! - Empty line - frame separator
//! - Lines starting with `:` - comments (ignored)
//!
//! # Module structure
//! - `decoder` - Byte chunks to complete lines (FrameDecoder)
//! - `assembler` - Lines to events (EventAssembler, EventDecoder, parse_sse_line)
//! - `events` - Line and event type definitions
//! - `payloads` - Payload deserialization structs

mod assembler;
mod decoder;
mod events;
mod payloads;

pub use assembler::{parse_sse_line, EventAssembler, EventDecoder};
pub use decoder::FrameDecoder;
pub use events::{ChatEvent, ParsedEvent, SseLine};
pub use payloads::DonePayload;
