//! Effects produced by state transitions

use super::state::ChatTurn;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Call the assistant with the submitted text and the turns before it
    CallAssistant {
        message: String,
        prior_history: Vec<ChatTurn>,
    },

    /// Tell connected clients a turn was appended
    NotifyTurn { turn: ChatTurn },

    /// Tell connected clients the exchange failed
    NotifyError { message: String },

    /// Tell connected clients the state changed
    NotifyStateChange,
}

impl Effect {
    pub fn call_assistant(message: impl Into<String>, prior_history: Vec<ChatTurn>) -> Self {
        Effect::CallAssistant {
            message: message.into(),
            prior_history,
        }
    }

    pub fn notify_turn(turn: ChatTurn) -> Self {
        Effect::NotifyTurn { turn }
    }

    pub fn notify_error(message: impl Into<String>) -> Self {
        Effect::NotifyError {
            message: message.into(),
        }
    }
}
