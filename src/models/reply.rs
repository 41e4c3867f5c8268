use serde::{Deserialize, Serialize};

pub const TIME_PROMPT: &str = "When would you like an appointment?";
pub const HELP_TEXT: &str = "I can answer questions about appointments";
pub const WELCOME_TEXT: &str = "Hello, I am here to help you make appointments. \
    Ask me when we are free and then ask me to make an appointment for you.";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    Availability,
    Scheduled,
    TimePrompt,
    KnowledgeAnswer,
    Help,
}

impl ReplyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplyKind::Availability => "availability",
            ReplyKind::Scheduled => "scheduled",
            ReplyKind::TimePrompt => "time_prompt",
            ReplyKind::KnowledgeAnswer => "knowledge_answer",
            ReplyKind::Help => "help",
        }
    }
}

/// The single user-facing message produced for one utterance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reply {
    pub kind: ReplyKind,
    pub text: String,
}

impl Reply {
    pub fn new(kind: ReplyKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn time_prompt() -> Self {
        Self::new(ReplyKind::TimePrompt, TIME_PROMPT)
    }

    pub fn help() -> Self {
        Self::new(ReplyKind::Help, HELP_TEXT)
    }
}
