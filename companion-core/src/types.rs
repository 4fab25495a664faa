//! Core domain types for companion
//!
//! These types describe one conversation view: who is talking to which
//! remote agent, and the messages exchanged so far.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Surface** | One chat panel of the dashboard (learner chat, quiz, provider assistant, ...) |
//! | **Session** | The conversation-scoped identity sent with every request from one mounted view |
//! | **Turn** | One user submission and the single assistant reply (or fallback) it produces |
//! | **Transcript** | Ordered messages of one view; never re-sorted, never edited |
//! | **Sentinel** | Fixed text used when the agent answered but no text could be extracted |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agent::SessionIdentity;
use crate::config::AgentConfig;

// ============================================
// Messages
// ============================================

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    /// The person typing into the view
    User,
    /// The remote agent, or the view speaking on its behalf (greeting, sentinel, fallback)
    Assistant,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Sender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Sender::User),
            "assistant" => Ok(Sender::Assistant),
            _ => Err(format!("unknown sender: {}", s)),
        }
    }
}

/// A single transcript entry.
///
/// Messages are immutable once created; `id` is a v4 UUID and therefore
/// unique within any transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique identifier
    pub id: String,
    /// Who authored this message
    pub sender: Sender,
    /// Message body, shown verbatim
    pub text: String,
    /// When the message was created locally
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a new message with a fresh id and the current time
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender,
            text: text.into(),
            created_at: Utc::now(),
        }
    }

    /// Create a new user message
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    /// Create a new assistant message
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Sender::Assistant, text)
    }
}

// ============================================
// Conversation Session
// ============================================

/// Identity of one mounted conversation view.
///
/// Created once per view. `session_id` is generated locally and reused for
/// every turn of that view; it is never persisted. The agent identifiers are
/// copied from injected configuration and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSession {
    session_id: String,
    agent_id: String,
    agent_alias_id: String,
}

impl ConversationSession {
    /// Create a session with a freshly generated identifier
    pub fn new(prefix: &str, agent: &AgentConfig) -> Self {
        Self::with_identity(SessionIdentity::create(prefix), agent)
    }

    /// Create a session around an existing identifier
    pub fn with_identity(session_id: impl Into<String>, agent: &AgentConfig) -> Self {
        Self {
            session_id: session_id.into(),
            agent_id: agent.agent_id.clone(),
            agent_alias_id: agent.agent_alias_id.clone(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn agent_alias_id(&self) -> &str {
        &self.agent_alias_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_ids_are_unique() {
        let a = Message::user("same text");
        let b = Message::user("same text");
        assert_ne!(a.id, b.id);
        assert_eq!(a.text, b.text);
    }

    #[test]
    fn test_message_serializes_camel_case() {
        let msg = Message::assistant("hello");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["sender"], "assistant");
        assert_eq!(json["text"], "hello");
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_sender_round_trip_names() {
        assert_eq!("user".parse::<Sender>().unwrap(), Sender::User);
        assert_eq!(Sender::Assistant.to_string(), "assistant");
        assert!("bot".parse::<Sender>().is_err());
    }

    #[test]
    fn test_session_copies_agent_ids() {
        let agent = AgentConfig {
            agent_id: "AGENT".to_string(),
            agent_alias_id: "ALIAS".to_string(),
            ..Default::default()
        };
        let session = ConversationSession::new("learner-session", &agent);
        assert!(session.session_id().starts_with("learner-session-"));
        assert_eq!(session.agent_id(), "AGENT");
        assert_eq!(session.agent_alias_id(), "ALIAS");
    }
}
