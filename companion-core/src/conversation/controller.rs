//! Turn-by-turn driver for one conversation view
//!
//! A turn moves the controller from Idle to Busy and back:
//!
//! 1. the user message is appended and the loading flag is raised
//! 2. the request is dispatched and the reply normalized
//! 3. exactly one assistant message is appended (reply, sentinel or fallback)
//! 4. the loading flag is cleared
//!
//! Transport failures stop here. They are logged and turned into the
//! surface's fallback message; `submit` never returns an error.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::agent::{AgentRequestBuilder, AgentTransport, NormalizedReply, ResponseNormalizer};
use crate::surface::{ChatSurface, SurfaceProfile};
use crate::types::{ConversationSession, Message};

use super::transcript::TranscriptStore;

/// Why a submission did not start a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The text was empty after trimming
    Blank,
    /// Another turn is still in flight
    Busy,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::Blank => write!(f, "message is blank"),
            Rejection::Busy => write!(f, "a reply is still pending"),
        }
    }
}

/// Result of one call to [`ConversationController::submit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The agent answered with readable text
    Replied(Message),
    /// The agent answered but nothing readable came back; carries the sentinel
    Empty(Message),
    /// The turn failed in transport; carries the fallback notice
    Failed(Message),
    /// No turn was started and the transcript is unchanged
    Rejected(Rejection),
    /// The view was detached before the reply arrived; nothing was appended
    Discarded,
}

impl SubmitOutcome {
    /// The assistant message this turn appended, if any
    pub fn message(&self) -> Option<&Message> {
        match self {
            SubmitOutcome::Replied(m) | SubmitOutcome::Empty(m) | SubmitOutcome::Failed(m) => {
                Some(m)
            }
            SubmitOutcome::Rejected(_) | SubmitOutcome::Discarded => None,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, SubmitOutcome::Rejected(_))
    }
}

/// Clears the busy flag when the turn ends, including when the turn's
/// future is dropped before completion.
struct LoadingGuard<'a> {
    busy: &'a AtomicBool,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Drives one conversation view against one agent transport.
///
/// The controller exclusively owns its transcript. It takes `&self`
/// everywhere so a UI can share it behind an `Arc`; at most one turn is in
/// flight at a time and further submissions are rejected until it ends.
pub struct ConversationController<T> {
    surface: ChatSurface,
    session: ConversationSession,
    builder: AgentRequestBuilder,
    normalizer: ResponseNormalizer,
    transport: T,
    transcript: Mutex<TranscriptStore>,
    busy: AtomicBool,
    attached: AtomicBool,
    turns_completed: AtomicUsize,
}

impl<T: AgentTransport> ConversationController<T> {
    /// Mount a view: create its session and seed the greeting, if any.
    pub fn new(profile: SurfaceProfile, transport: T) -> Self {
        let SurfaceProfile {
            surface,
            agent,
            greeting,
        } = profile;

        let builder = AgentRequestBuilder::new(agent);
        let session = builder.session(surface.session_prefix());

        let mut transcript = TranscriptStore::new();
        if let Some(greeting) = greeting.filter(|g| !g.trim().is_empty()) {
            transcript.append(Message::assistant(greeting));
        }

        tracing::debug!(
            surface = %surface,
            session_id = %session.session_id(),
            "Conversation view mounted"
        );

        Self {
            surface,
            session,
            builder,
            normalizer: ResponseNormalizer::new(surface.empty_sentinel()),
            transport,
            transcript: Mutex::new(transcript),
            busy: AtomicBool::new(false),
            attached: AtomicBool::new(true),
            turns_completed: AtomicUsize::new(0),
        }
    }

    /// Run one turn for `user_text`.
    pub async fn submit(&self, user_text: &str) -> SubmitOutcome {
        let request = match self.builder.build(&self.session, user_text) {
            Ok(request) => request,
            Err(_) => {
                tracing::debug!(surface = %self.surface, "Rejected blank submission");
                return SubmitOutcome::Rejected(Rejection::Blank);
            }
        };

        if !self.is_attached() {
            tracing::debug!(surface = %self.surface, "Submission to detached view ignored");
            return SubmitOutcome::Discarded;
        }

        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!(surface = %self.surface, "Rejected submission while busy");
            return SubmitOutcome::Rejected(Rejection::Busy);
        }
        let _loading = LoadingGuard { busy: &self.busy };

        self.lock_transcript().append(Message::user(request.input_text()));

        let result = match self.transport.invoke(&request).await {
            Ok(raw) => self.normalizer.read(raw).await,
            Err(e) => Err(e),
        };

        if !self.is_attached() {
            tracing::debug!(
                surface = %self.surface,
                session_id = %self.session.session_id(),
                "View detached mid-turn, discarding reply"
            );
            return SubmitOutcome::Discarded;
        }

        let outcome = match result {
            Ok(NormalizedReply::Text(text)) => SubmitOutcome::Replied(Message::assistant(text)),
            Ok(NormalizedReply::Empty) => {
                SubmitOutcome::Empty(Message::assistant(self.normalizer.empty_sentinel()))
            }
            Err(e) => {
                tracing::warn!(
                    surface = %self.surface,
                    session_id = %self.session.session_id(),
                    error = %e,
                    "Agent turn failed, showing fallback"
                );
                SubmitOutcome::Failed(Message::assistant(self.surface.fallback()))
            }
        };

        if let Some(message) = outcome.message() {
            self.lock_transcript().append(message.clone());
        }
        self.turns_completed.fetch_add(1, Ordering::AcqRel);

        outcome
    }

    /// Mark the view as unmounted; replies still in flight are dropped on arrival.
    pub fn detach(&self) {
        self.attached.store(false, Ordering::Release);
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }

    /// Whether a turn is in flight
    pub fn is_loading(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Snapshot of the transcript in display order
    pub fn transcript(&self) -> Vec<Message> {
        self.lock_transcript().all().to_vec()
    }

    pub fn session(&self) -> &ConversationSession {
        &self.session
    }

    pub fn surface(&self) -> ChatSurface {
        self.surface
    }

    /// Turns that ended in an appended assistant message
    pub fn turns_completed(&self) -> usize {
        self.turns_completed.load(Ordering::Acquire)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn lock_transcript(&self) -> MutexGuard<'_, TranscriptStore> {
        self.transcript
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
