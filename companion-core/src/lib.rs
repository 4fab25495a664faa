//! # companion-core
//!
//! Core library for companion - the agent conversation client behind the
//! health-companion dashboard chat panels.
//!
//! This library provides:
//! - Session identity and request building for a remote conversational agent
//! - Normalization of the agent's undiscriminated reply shapes into one text
//! - An append-only transcript and the per-turn conversation controller
//! - The catalogue of chat surfaces, configuration, and logging
//!
//! ## Architecture
//!
//! One turn flows through the components leaf-first:
//!
//! ```text
//! user text → ConversationController → AgentRequestBuilder → AgentTransport
//!           → ResponseNormalizer → TranscriptStore → UI read
//! ```
//!
//! The controller is the single recovery boundary: transport failures
//! become a fallback assistant message and never reach the caller.
//!
//! ## Example
//!
//! ```rust,no_run
//! use companion_core::{
//!     ChatSurface, Config, ConversationController, HttpAgentTransport, SurfaceProfile,
//! };
//!
//! # async fn run() -> companion_core::Result<()> {
//! let config = Config::load()?;
//! let profile = SurfaceProfile::from_config(ChatSurface::LearnerChat, &config);
//! let transport = HttpAgentTransport::new(&profile.agent)?;
//!
//! let controller = ConversationController::new(profile, transport);
//! let outcome = controller.submit("Suggest a learning calendar").await;
//! if let Some(reply) = outcome.message() {
//!     println!("{}", reply.text);
//! }
//! # Ok(())
//! # }
//! ```

// Re-export commonly used items at the crate root
pub use agent::{
    AgentRequest, AgentRequestBuilder, AgentTransport, HttpAgentTransport, NormalizedReply,
    RawAgentReply, ReplyChunk, ReplyDelta, ReplyShape, ResponseNormalizer, SessionIdentity,
};
pub use config::{AgentConfig, Config};
pub use conversation::{ConversationController, Rejection, SubmitOutcome, TranscriptStore};
pub use error::{Error, Result};
pub use surface::{ChatSurface, SurfaceProfile};
pub use types::*;

// Public modules
pub mod agent;
pub mod config;
pub mod conversation;
pub mod error;
pub mod format;
pub mod logging;
pub mod surface;
pub mod types;
