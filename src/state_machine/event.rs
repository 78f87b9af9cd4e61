//! Events that can occur in a chat session

use crate::reply::AssistantResponse;
use chrono::{DateTime, Utc};

/// Events that trigger state transitions
///
/// Events carry their own timestamps so transitions stay pure.
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    InputChanged {
        text: String,
    },
    Submit {
        text: String,
        at: DateTime<Utc>,
    },
    /// A preset option was picked from the latest question
    OptionSelected {
        option: String,
        at: DateTime<Utc>,
    },

    // Assistant events
    AssistantReplied {
        response: AssistantResponse,
        at: DateTime<Utc>,
    },
    /// The call never produced a reply; the executor logs the cause
    AssistantFailed,
}

impl Event {
    pub fn submit(text: impl Into<String>) -> Self {
        Event::Submit {
            text: text.into(),
            at: Utc::now(),
        }
    }

    pub fn option_selected(option: impl Into<String>) -> Self {
        Event::OptionSelected {
            option: option.into(),
            at: Utc::now(),
        }
    }

    pub fn assistant_replied(response: AssistantResponse) -> Self {
        Event::AssistantReplied {
            response,
            at: Utc::now(),
        }
    }

    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Event::InputChanged { .. } => "input_changed",
            Event::Submit { .. } => "submit",
            Event::OptionSelected { .. } => "option_selected",
            Event::AssistantReplied { .. } => "assistant_replied",
            Event::AssistantFailed => "assistant_failed",
        }
    }
}
