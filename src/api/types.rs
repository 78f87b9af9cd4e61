//! API request and response types

use crate::brief::ProjectBrief;
use crate::llm::ModelInfo;
use crate::reply::StructuredQuestion;
use crate::state_machine::{ChatTurn, SessionState};
use serde::{Deserialize, Serialize};

/// Read-only view of a session for the presentation layer
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: String,
    pub history: Vec<ChatTurn>,
    pub pending_input: String,
    pub is_loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    /// Options to render for the latest assistant turn
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<StructuredQuestion>,
}

impl SessionView {
    pub fn new(id: impl Into<String>, state: &SessionState) -> Self {
        Self {
            id: id.into(),
            history: state.history().to_vec(),
            pending_input: state.pending_input().to_string(),
            is_loading: state.is_loading(),
            last_error: state.last_error().map(str::to_string),
            question: state.latest_question().cloned(),
        }
    }
}

/// Request to replace the draft input
#[derive(Debug, Deserialize)]
pub struct InputRequest {
    pub text: String,
}

/// Request to submit; without `text` the current draft is sent
#[derive(Debug, Default, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub text: Option<String>,
}

/// Request to answer with a preset option
#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub option: String,
}

/// Request to attach (or, with `null`, clear) form context
#[derive(Debug, Deserialize)]
pub struct BriefRequest {
    #[serde(default)]
    pub brief: Option<ProjectBrief>,
}

/// Request for a prose summary of a brief
#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    pub brief: ProjectBrief,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

/// Response for submit/select actions
#[derive(Debug, Serialize)]
pub struct QueuedResponse {
    pub queued: bool,
}

/// Response for lifecycle actions
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Response for model list
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
    pub default: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
