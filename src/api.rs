//! HTTP API for the studio chat widget

mod handlers;
mod sse;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::assistant::ConsultantAssistant;
use crate::llm::ModelRegistry;
use crate::runtime::SessionManager;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub assistant: Arc<ConsultantAssistant>,
    pub llm_registry: Arc<ModelRegistry>,
}

impl AppState {
    pub fn new(llm_registry: Arc<ModelRegistry>, assistant: Arc<ConsultantAssistant>) -> Self {
        Self {
            sessions: Arc::new(SessionManager::new(assistant.clone())),
            assistant,
            llm_registry,
        }
    }
}
