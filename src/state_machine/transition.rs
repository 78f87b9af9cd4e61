//! Pure state transition function

use super::state::{ChatTurn, Phase, SessionState};
use super::{Effect, Event};
use thiserror::Error;

/// Shown when the assistant call itself failed
pub const TRANSPORT_FAILURE_MESSAGE: &str = "Failed to send message. Please try again.";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }

    /// True when the event was ignored
    pub fn is_noop(&self, before: &SessionState) -> bool {
        self.effects.is_empty() && &self.new_state == before
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Assistant result arrived with no call outstanding")]
    NoOutstandingCall,
}

/// Pure transition function
///
/// Given the same inputs, it always produces the same outputs, with no I/O.
/// Submissions while a call is outstanding, and blank submissions, are
/// ignored rather than rejected.
pub fn transition(state: &SessionState, event: Event) -> Result<TransitionResult, TransitionError> {
    match (state.phase(), event) {
        // ============================================================
        // Input
        // ============================================================

        // Draft edits are always allowed
        (_, Event::InputChanged { text }) => {
            let mut next = state.clone();
            next.set_pending_input(text);
            Ok(TransitionResult::new(next).with_effect(Effect::NotifyStateChange))
        }

        // ============================================================
        // Submission
        // ============================================================

        // Idle + Submit -> Awaiting
        (Phase::Idle, Event::Submit { text, at }) => {
            let message = text.trim();
            if message.is_empty() {
                return Ok(TransitionResult::new(state.clone()));
            }

            let prior_history = state.history().to_vec();
            let turn = ChatTurn::user(message, at);

            let mut next = state.clone();
            next.set_last_error(None);
            next.push_turn(turn.clone());
            next.set_pending_input(String::new());
            next.set_phase(Phase::Awaiting {
                message: message.to_string(),
            });

            Ok(TransitionResult::new(next)
                .with_effect(Effect::notify_turn(turn))
                .with_effect(Effect::NotifyStateChange)
                .with_effect(Effect::call_assistant(message, prior_history)))
        }

        // Awaiting + Submit -> ignored
        (Phase::Awaiting { .. }, Event::Submit { .. }) => Ok(TransitionResult::new(state.clone())),

        // Picking an option is filling the input with its label, then submitting
        (_, Event::OptionSelected { option, at }) => {
            let filled = transition(state, Event::InputChanged { text: option.clone() })?;
            let submitted = transition(&filled.new_state, Event::Submit { text: option, at })?;
            Ok(TransitionResult::new(submitted.new_state)
                .with_effects(filled.effects)
                .with_effects(submitted.effects))
        }

        // ============================================================
        // Assistant outcomes
        // ============================================================

        // Awaiting + reply with error -> Idle, history untouched
        (Phase::Awaiting { .. }, Event::AssistantReplied { response, .. })
            if response.error.is_some() =>
        {
            let error = response.error.unwrap_or_default();
            let mut next = state.clone();
            next.set_last_error(Some(error.clone()));
            next.set_phase(Phase::Idle);
            Ok(TransitionResult::new(next)
                .with_effect(Effect::notify_error(error))
                .with_effect(Effect::NotifyStateChange))
        }

        // Awaiting + reply -> Idle with assistant turn
        (Phase::Awaiting { .. }, Event::AssistantReplied { response, at }) => {
            let turn = ChatTurn::assistant(response, at);
            let mut next = state.clone();
            next.push_turn(turn.clone());
            next.set_phase(Phase::Idle);
            Ok(TransitionResult::new(next)
                .with_effect(Effect::notify_turn(turn))
                .with_effect(Effect::NotifyStateChange))
        }

        // Awaiting + call failure -> Idle with generic error
        (Phase::Awaiting { .. }, Event::AssistantFailed) => {
            let mut next = state.clone();
            next.set_last_error(Some(TRANSPORT_FAILURE_MESSAGE.to_string()));
            next.set_phase(Phase::Idle);
            Ok(TransitionResult::new(next)
                .with_effect(Effect::notify_error(TRANSPORT_FAILURE_MESSAGE))
                .with_effect(Effect::NotifyStateChange))
        }

        // Stale outcome for a call that is no longer tracked
        (Phase::Idle, Event::AssistantReplied { .. } | Event::AssistantFailed) => {
            Err(TransitionError::NoOutstandingCall)
        }
    }
}
