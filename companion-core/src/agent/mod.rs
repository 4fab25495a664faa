//! Remote agent plumbing
//!
//! Everything between a user's text and a single finalized reply string:
//!
//! ```text
//! user text → AgentRequestBuilder → AgentTransport → RawAgentReply → ResponseNormalizer → text
//! ```
//!
//! The transport is a trait so that the conversation controller can run
//! against the real HTTP endpoint or an in-process script. Replies are
//! probed by capability (direct text, byte chunks, text deltas) because
//! the upstream endpoint does not tag which shape it returns.

mod client;
mod normalize;
mod reply;
mod request;
mod session;

pub use client::{AgentTransport, HttpAgentTransport};
pub use normalize::{NormalizedReply, ResponseNormalizer, DEFAULT_EMPTY_SENTINEL};
pub use reply::{ChunkStream, DeltaStream, RawAgentReply, ReplyChunk, ReplyDelta, ReplyShape};
pub use request::{AgentRequest, AgentRequestBuilder};
pub use session::SessionIdentity;
