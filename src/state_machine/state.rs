//! Session state types

use crate::reply::{AssistantResponse, StructuredQuestion};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Turns
// ============================================================================

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One entry in the conversation history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Preset answers offered with an assistant turn
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<StructuredQuestion>,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp,
            question: None,
        }
    }

    /// Build the assistant turn for a successful response
    pub fn assistant(response: AssistantResponse, timestamp: DateTime<Utc>) -> Self {
        Self {
            role: Role::Assistant,
            content: response.message,
            timestamp,
            question: response.question,
        }
    }
}

// ============================================================================
// Session State
// ============================================================================

/// Whether an assistant call is outstanding
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Phase {
    /// Ready for user input
    #[default]
    Idle,
    /// One assistant call in flight for the given message
    Awaiting { message: String },
}

/// Snapshot of one chat widget's state
///
/// History only grows, and only through transitions, so its fields are
/// read through accessors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    history: Vec<ChatTurn>,
    pending_input: String,
    phase: Phase,
    last_error: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    pub fn pending_input(&self) -> &str {
        &self.pending_input
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// True exactly while an assistant call is outstanding
    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Awaiting { .. })
    }

    /// The question offered by the most recent assistant turn, if any
    pub fn latest_question(&self) -> Option<&StructuredQuestion> {
        self.history
            .iter()
            .rev()
            .find(|turn| turn.role == Role::Assistant)
            .and_then(|turn| turn.question.as_ref())
    }

    pub(super) fn push_turn(&mut self, turn: ChatTurn) {
        self.history.push(turn);
    }

    pub(super) fn set_pending_input(&mut self, text: String) {
        self.pending_input = text;
    }

    pub(super) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub(super) fn set_last_error(&mut self, error: Option<String>) {
        self.last_error = error;
    }
}
