//! Trait abstractions for runtime I/O
//!
//! The session executor only talks to the assistant through this trait, so
//! tests can drive it with doubles.

use crate::assistant::AssistantError;
use crate::brief::ProjectBrief;
use crate::reply::AssistantResponse;
use crate::state_machine::ChatTurn;
use async_trait::async_trait;
use std::sync::Arc;

/// The assistant-call collaborator
///
/// `Ok` carries either a normal reply or an assistant-reported error in
/// `AssistantResponse::error`. `Err` means no answer came back at all.
#[async_trait]
pub trait AssistantClient: Send + Sync {
    async fn call(
        &self,
        user_message: &str,
        prior_history: &[ChatTurn],
        brief: Option<&ProjectBrief>,
    ) -> Result<AssistantResponse, AssistantError>;
}

#[async_trait]
impl<T: AssistantClient + ?Sized> AssistantClient for Arc<T> {
    async fn call(
        &self,
        user_message: &str,
        prior_history: &[ChatTurn],
        brief: Option<&ProjectBrief>,
    ) -> Result<AssistantResponse, AssistantError> {
        (**self).call(user_message, prior_history, brief).await
    }
}
