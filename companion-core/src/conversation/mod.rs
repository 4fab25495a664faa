//! Conversation views: transcript state and the per-turn controller

mod controller;
mod transcript;

pub use controller::{ConversationController, Rejection, SubmitOutcome};
pub use transcript::TranscriptStore;
