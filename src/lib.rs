//! Hydrogen chat client
//!
//! Incremental decoding of the backend's event stream and reconciliation of
//! conversation state, plus the REST client and CLI around it.
//!
//! Data flows one way: bytes ([`sse::FrameDecoder`]) → lines
//! ([`sse::EventAssembler`]) → events ([`state::apply_event`]) → session
//! state, with [`recovery::resync`] when the terminal event never arrives.
//! [`orchestrator::StreamOrchestrator`] drives a whole turn.

pub mod adapters;
pub mod cli;
pub mod client;
pub mod config;
pub mod conversation;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod recovery;
pub mod sse;
pub mod state;
pub mod traits;
