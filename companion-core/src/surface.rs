//! Chat surfaces of the dashboard
//!
//! Every chat panel runs the same conversation logic. They differ only in
//! which agent they talk to, what they say when mounted, and the wording of
//! their empty-reply sentinel and failure fallback.

use crate::config::{AgentConfig, Config};
use crate::error::Error;

/// The chat panels offered by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChatSurface {
    /// Patient-facing assistant on the individual dashboard
    PatientAssistant,
    /// Learner study companion
    LearnerChat,
    /// Learner quick quiz
    LearnerQuiz,
    /// Provider hospital-operations assistant
    ProviderAssistant,
    /// Provider visit planning assistant
    VisitPlanner,
}

impl ChatSurface {
    /// All surfaces, in dashboard order
    pub fn all() -> &'static [ChatSurface] {
        &[
            ChatSurface::PatientAssistant,
            ChatSurface::LearnerChat,
            ChatSurface::LearnerQuiz,
            ChatSurface::ProviderAssistant,
            ChatSurface::VisitPlanner,
        ]
    }

    /// Identifier used in configuration and on the command line
    pub fn id(&self) -> &'static str {
        match self {
            ChatSurface::PatientAssistant => "patient_assistant",
            ChatSurface::LearnerChat => "learner_chat",
            ChatSurface::LearnerQuiz => "learner_quiz",
            ChatSurface::ProviderAssistant => "provider_assistant",
            ChatSurface::VisitPlanner => "visit_planner",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ChatSurface::PatientAssistant => "Provider Assistant",
            ChatSurface::LearnerChat => "Learner Assistant",
            ChatSurface::LearnerQuiz => "Quick Quiz",
            ChatSurface::ProviderAssistant => "Provider Assistant",
            ChatSurface::VisitPlanner => "Visit Planner",
        }
    }

    pub fn tagline(&self) -> &'static str {
        match self {
            ChatSurface::PatientAssistant => "Your AI-powered guide to your own health data.",
            ChatSurface::LearnerChat => "Your smart study companion.",
            ChatSurface::LearnerQuiz => "Learn interactively, one question at a time.",
            ChatSurface::ProviderAssistant => "Hospital operations assistant.",
            ChatSurface::VisitPlanner => "Plan or review patient visits.",
        }
    }

    /// Assistant message seeded into the transcript when the view mounts
    pub fn greeting(&self) -> Option<&'static str> {
        match self {
            ChatSurface::PatientAssistant => None,
            ChatSurface::LearnerChat => Some(
                "Hi there! I'm your Learner Assistant. Ask me to train, infer, create quizzes, \
                 or suggest a learning calendar.",
            ),
            ChatSurface::LearnerQuiz => Some(
                "Welcome to Quick Quiz! I'm your Learner Assistant. Ask me a question or submit \
                 an answer.",
            ),
            ChatSurface::ProviderAssistant => {
                Some("Hello! I'm your Provider Assistant. How can I help you today?")
            }
            ChatSurface::VisitPlanner => {
                Some("Hello! I can help you plan or review patient visits.")
            }
        }
    }

    /// Hint shown while the transcript is still empty
    pub fn empty_state_hint(&self) -> &'static str {
        match self {
            ChatSurface::PatientAssistant => {
                "Hello, I'm your AI assistant. Ask about patients, appointments, \
                 or training workflows."
            }
            ChatSurface::LearnerChat | ChatSurface::LearnerQuiz => "Ask a question to get started.",
            ChatSurface::ProviderAssistant => "Ask anything about hospital operations.",
            ChatSurface::VisitPlanner => "Ask me to analyze visits or help schedule new ones.",
        }
    }

    /// Input placeholder text
    pub fn placeholder(&self) -> &'static str {
        match self {
            ChatSurface::PatientAssistant => "Ask the assistant...",
            ChatSurface::LearnerChat => "Ask your learner assistant...",
            ChatSurface::LearnerQuiz => "Type your question or answer...",
            ChatSurface::ProviderAssistant => "Ask anything about hospital operations...",
            ChatSurface::VisitPlanner => "Ask about visits...",
        }
    }

    /// Text used when the agent answers but nothing readable comes back
    pub fn empty_sentinel(&self) -> &'static str {
        match self {
            ChatSurface::PatientAssistant => "I'm sorry, I didn't get that.",
            ChatSurface::LearnerChat | ChatSurface::LearnerQuiz => {
                "Learner Agent responded but returned no text."
            }
            ChatSurface::ProviderAssistant => "No readable text received from the agent.",
            ChatSurface::VisitPlanner => "The visit assistant responded but returned no text.",
        }
    }

    /// Text used when the turn fails in transport
    pub fn fallback(&self) -> &'static str {
        match self {
            ChatSurface::PatientAssistant => {
                "I ran into a technical issue contacting the AI agent. Please try again."
            }
            ChatSurface::LearnerChat => {
                "Sorry, the Learner Agent failed to respond. Try again later."
            }
            ChatSurface::LearnerQuiz => "Could not reach the Learner Agent. Try again later.",
            ChatSurface::ProviderAssistant => {
                "Something went wrong while connecting to the agent. Please verify your alias \
                 and region, then try again."
            }
            ChatSurface::VisitPlanner => {
                "Sorry, I couldn't process that request. Please try again."
            }
        }
    }

    /// Prefix of the session identifiers this surface generates
    pub fn session_prefix(&self) -> &'static str {
        match self {
            ChatSurface::PatientAssistant | ChatSurface::ProviderAssistant => "frontend-session",
            ChatSurface::LearnerChat | ChatSurface::LearnerQuiz => "learner-session",
            ChatSurface::VisitPlanner => "visit-session",
        }
    }
}

impl std::fmt::Display for ChatSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl std::str::FromStr for ChatSurface {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        ChatSurface::all()
            .iter()
            .copied()
            .find(|surface| surface.id() == normalized)
            .ok_or_else(|| Error::UnknownSurface(s.to_string()))
    }
}

/// Everything a conversation controller needs to know about its surface.
#[derive(Debug, Clone)]
pub struct SurfaceProfile {
    pub surface: ChatSurface,
    pub agent: AgentConfig,
    pub greeting: Option<String>,
}

impl SurfaceProfile {
    /// Profile with the surface's built-in greeting
    pub fn new(surface: ChatSurface, agent: AgentConfig) -> Self {
        Self {
            surface,
            agent,
            greeting: surface.greeting().map(str::to_string),
        }
    }

    /// Profile resolved from configuration, overrides included
    pub fn from_config(surface: ChatSurface, config: &Config) -> Self {
        let mut profile = Self::new(surface, config.agent_for(surface));
        if let Some(greeting) = config.greeting_for(surface) {
            profile.greeting = Some(greeting.to_string());
        }
        profile
    }
}
