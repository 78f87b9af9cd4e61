//! Chat session state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.
//! The runtime owns the state, feeds it events and executes the effects.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;


pub use effect::Effect;
pub use event::Event;
pub use state::{ChatTurn, SessionState};
pub use transition::transition;

#[cfg(test)]
pub use state::{Phase, Role};
#[cfg(test)]
pub use transition::TRANSPORT_FAILURE_MESSAGE;
