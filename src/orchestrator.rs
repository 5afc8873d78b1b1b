//! Turn orchestration
//!
//! [`StreamOrchestrator::run`] owns one streamed turn end to end:
//!
//! 1. claim the session (one turn per session id at a time)
//! 2. append the user message
//! 3. open the stream and pump chunks through [`EventDecoder`] into
//!    [`apply_event`], in arrival order
//! 4. resync from history if the stream ended without a terminal event
//! 5. reset `sending` and the streaming state, on every exit path
//!
//! Step 5 lives in [`TurnGuard`]'s `Drop`, so it also runs when the caller
//! drops the future at an await point.

use std::collections::HashSet;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, MutexGuard};

use futures::StreamExt;
use tokio::sync::mpsc::UnboundedSender;

use crate::conversation::Conversation;
use crate::error::{ChatError, ChatResult, StreamError};
use crate::models::ChatRequest;
use crate::recovery::{resync, RecoveryOutcome};
use crate::sse::{EventDecoder, ParsedEvent};
use crate::state::{apply_event, complete_turn, Transition};
use crate::traits::ChatApi;

/// How a turn ended
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// `done` applied; the reply was appended
    Completed { message_id: i64 },
    /// Backend sent an `error` event; an error message was appended
    Failed { message_id: i64 },
    /// No terminal event; state was resynced from the backend
    Recovered(RecoveryOutcome),
    /// Transport failed; an error message was appended
    TransportFailed { error: ChatError, message_id: i64 },
}

/// Progress published while a turn runs
#[derive(Debug, Clone, PartialEq)]
pub enum StreamUpdate {
    Started { session_id: String },
    Transition(Transition),
    Recovered(RecoveryOutcome),
    Finished(TurnOutcome),
}

type InFlight = Arc<Mutex<HashSet<String>>>;

fn lock(in_flight: &Mutex<HashSet<String>>) -> MutexGuard<'_, HashSet<String>> {
    in_flight
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Exclusive access to a conversation for one turn.
///
/// Dropping it returns the conversation to idle and releases the session.
struct TurnGuard<'a> {
    conversation: &'a mut Conversation,
    in_flight: InFlight,
    session_id: String,
}

impl<'a> TurnGuard<'a> {
    fn acquire(in_flight: &InFlight, conversation: &'a mut Conversation) -> ChatResult<Self> {
        let session_id = conversation.session.id.clone();
        if !lock(in_flight).insert(session_id.clone()) {
            return Err(ChatError::TurnInProgress { session_id });
        }
        conversation.sending = true;
        Ok(Self {
            conversation,
            in_flight: Arc::clone(in_flight),
            session_id,
        })
    }
}

impl Deref for TurnGuard<'_> {
    type Target = Conversation;

    fn deref(&self) -> &Conversation {
        self.conversation
    }
}

impl DerefMut for TurnGuard<'_> {
    fn deref_mut(&mut self) -> &mut Conversation {
        self.conversation
    }
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        self.conversation.streaming.reset();
        self.conversation.sending = false;
        lock(&self.in_flight).remove(&self.session_id);
    }
}

/// Runs chat turns against a [`ChatApi`]. Clones share the in-flight set.
#[derive(Clone)]
pub struct StreamOrchestrator {
    api: Arc<dyn ChatApi>,
    in_flight: InFlight,
    updates: Option<UnboundedSender<StreamUpdate>>,
}

impl StreamOrchestrator {
    pub fn new(api: Arc<dyn ChatApi>) -> Self {
        Self {
            api,
            in_flight: Arc::default(),
            updates: None,
        }
    }

    /// Publish progress on `sender`. A closed receiver is ignored.
    pub fn with_updates(mut self, sender: UnboundedSender<StreamUpdate>) -> Self {
        self.updates = Some(sender);
        self
    }

    pub fn api(&self) -> &dyn ChatApi {
        self.api.as_ref()
    }

    /// Whether a turn is running for `session_id`
    pub fn is_in_flight(&self, session_id: &str) -> bool {
        lock(&self.in_flight).contains(session_id)
    }

    fn emit(&self, update: StreamUpdate) {
        if let Some(sender) = &self.updates {
            let _ = sender.send(update);
        }
    }

    /// Run one streamed turn.
    ///
    /// Only fails with [`ChatError::TurnInProgress`], before touching any
    /// state. Transport failures are reported in the outcome and as an
    /// assistant message.
    pub async fn run(&self, text: &str, conversation: &mut Conversation) -> ChatResult<TurnOutcome> {
        let mut turn = TurnGuard::acquire(&self.in_flight, conversation)?;
        let session_id = turn.session_id.clone();

        turn.session.push_user_message(text);
        turn.streaming.begin();
        tracing::info!(%session_id, "starting streamed turn");
        self.emit(StreamUpdate::Started {
            session_id: session_id.clone(),
        });

        let request = ChatRequest::new(text, session_id.as_str());
        let outcome = match self.pump(&request, &mut turn).await {
            Ok(Some(outcome)) => outcome,
            Ok(None) => {
                let recovery = resync(self.api.as_ref(), &mut turn.session).await;
                self.emit(StreamUpdate::Recovered(recovery.clone()));
                TurnOutcome::Recovered(recovery)
            }
            Err(error) => {
                tracing::warn!(%session_id, code = error.error_code(), %error, "turn failed");
                let message_id = turn.session.push_error_message(&error.detail());
                TurnOutcome::TransportFailed { error, message_id }
            }
        };

        tracing::info!(%session_id, ?outcome, "turn finished");
        self.emit(StreamUpdate::Finished(outcome.clone()));
        Ok(outcome)
    }

    /// Stream the turn into the conversation.
    ///
    /// Returns the outcome of the last terminal event, or `None` when the
    /// stream ended without one.
    async fn pump(
        &self,
        request: &ChatRequest,
        conversation: &mut Conversation,
    ) -> ChatResult<Option<TurnOutcome>> {
        let mut stream = self.api.open_stream(request).await?;
        let mut decoder = EventDecoder::new();
        let mut terminal = None;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| StreamError::ConnectionLost {
                message: e.to_string(),
            })?;
            for event in decoder.feed(&chunk) {
                self.apply(&event, conversation, &mut terminal);
            }
        }
        for event in decoder.finish() {
            self.apply(&event, conversation, &mut terminal);
        }

        if decoder.dropped() > 0 {
            tracing::warn!(
                session_id = %request.session_id,
                dropped = decoder.dropped(),
                "dropped malformed frames"
            );
        }
        if !conversation.streaming.done_received {
            return Ok(None);
        }
        Ok(terminal)
    }

    fn apply(
        &self,
        event: &ParsedEvent,
        conversation: &mut Conversation,
        terminal: &mut Option<TurnOutcome>,
    ) {
        let transition = apply_event(event, &mut conversation.streaming, &mut conversation.session);
        match transition {
            Transition::Completed { message_id } => {
                *terminal = Some(TurnOutcome::Completed { message_id })
            }
            Transition::Failed { message_id } => {
                *terminal = Some(TurnOutcome::Failed { message_id })
            }
            _ => {}
        }
        self.emit(StreamUpdate::Transition(transition));
    }

    /// Run one turn through the non-streaming endpoint.
    ///
    /// The reply is applied exactly like a `done` event.
    pub async fn send(&self, text: &str, conversation: &mut Conversation) -> ChatResult<TurnOutcome> {
        let mut turn = TurnGuard::acquire(&self.in_flight, conversation)?;
        let session_id = turn.session_id.clone();

        turn.session.push_user_message(text);
        let request = ChatRequest::new(text, session_id.as_str());

        let outcome = match self.api.send(&request).await {
            Ok(reply) => {
                let conversation = &mut *turn;
                TurnOutcome::Completed {
                    message_id: complete_turn(
                        reply,
                        &mut conversation.streaming,
                        &mut conversation.session,
                    ),
                }
            }
            Err(error) => {
                tracing::warn!(%session_id, code = error.error_code(), %error, "turn failed");
                let message_id = turn.session.push_error_message(&error.detail());
                TurnOutcome::TransportFailed { error, message_id }
            }
        };

        self.emit(StreamUpdate::Finished(outcome.clone()));
        Ok(outcome)
    }
}
