//! Transport-ready requests built from user text

use serde::Serialize;

use crate::config::AgentConfig;
use crate::error::{Error, Result};
use crate::types::ConversationSession;

/// One outbound agent invocation.
///
/// Built only through [`AgentRequestBuilder::build`], which guarantees that
/// `input_text` is trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRequest {
    agent_id: String,
    agent_alias_id: String,
    session_id: String,
    input_text: String,
}

impl AgentRequest {
    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn agent_alias_id(&self) -> &str {
        &self.agent_alias_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn input_text(&self) -> &str {
        &self.input_text
    }
}

/// Turns user utterances into [`AgentRequest`]s for one configured agent.
#[derive(Debug, Clone)]
pub struct AgentRequestBuilder {
    agent: AgentConfig,
}

impl AgentRequestBuilder {
    /// Create a builder around injected agent configuration
    pub fn new(agent: AgentConfig) -> Self {
        Self { agent }
    }

    /// The configuration this builder was created with
    pub fn agent(&self) -> &AgentConfig {
        &self.agent
    }

    /// Start a new conversation session for this agent
    pub fn session(&self, prefix: &str) -> ConversationSession {
        ConversationSession::new(prefix, &self.agent)
    }

    /// Trim user text, rejecting input that is blank after trimming
    pub fn check_input(user_text: &str) -> Result<&str> {
        let trimmed = user_text.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidInput(
                "message must contain non-whitespace text".to_string(),
            ));
        }
        Ok(trimmed)
    }

    /// Build a request for one turn of `session`
    pub fn build(&self, session: &ConversationSession, user_text: &str) -> Result<AgentRequest> {
        let input_text = Self::check_input(user_text)?;

        Ok(AgentRequest {
            agent_id: session.agent_id().to_string(),
            agent_alias_id: session.agent_alias_id().to_string(),
            session_id: session.session_id().to_string(),
            input_text: input_text.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> AgentRequestBuilder {
        AgentRequestBuilder::new(AgentConfig {
            agent_id: "TLNTMJJLCH".to_string(),
            agent_alias_id: "HWKI11FXXR".to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_build_trims_input() {
        let builder = builder();
        let session = builder.session("frontend-session");
        let request = builder.build(&session, "  What is my next visit?\n").unwrap();

        assert_eq!(request.input_text(), "What is my next visit?");
        assert_eq!(request.agent_id(), "TLNTMJJLCH");
        assert_eq!(request.agent_alias_id(), "HWKI11FXXR");
        assert_eq!(request.session_id(), session.session_id());
    }

    #[test]
    fn test_build_rejects_blank() {
        let builder = builder();
        let session = builder.session("frontend-session");
        for blank in ["", "   ", "\n\t "] {
            let err = builder.build(&session, blank).unwrap_err();
            assert!(
                err.is_invalid_input(),
                "expected InvalidInput for {:?}",
                blank
            );
        }
    }

    #[test]
    fn test_same_session_reused_across_turns() {
        let builder = builder();
        let session = builder.session("learner-session");
        let first = builder.build(&session, "train").unwrap();
        let second = builder.build(&session, "quiz me").unwrap();
        assert_eq!(first.session_id(), second.session_id());
    }

    #[test]
    fn test_request_wire_shape() {
        let builder = builder();
        let session = ConversationSession::with_identity("fixed-id", builder.agent());
        let request = builder.build(&session, "hi").unwrap();
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "agentId": "TLNTMJJLCH",
                "agentAliasId": "HWKI11FXXR",
                "sessionId": "fixed-id",
                "inputText": "hi",
            })
        );
    }
}
