//! Consultant assistant backed by a text-completion model
//!
//! Validates the user's message, answers directly from a structured brief
//! when one is attached, and otherwise asks the model once and parses its
//! reply.

use crate::brief::{summary_facts, targeted_response, ProjectBrief};
use crate::llm::{LlmRequest, LlmService, ModelRegistry, SystemContent};
use crate::reply::{parse_reply, AssistantResponse};
use crate::runtime::AssistantClient;
use crate::state_machine::ChatTurn;
use crate::system_prompt::{build_system_prompt, DEFAULT_STUDIO_NAME};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::timeout;

pub const EMPTY_MESSAGE_PROMPT: &str = "Please enter a message to continue.";

/// Shown with the error text whenever the model call fails
pub const APOLOGY_MESSAGE: &str = "I apologize, but I'm having trouble connecting to our AI assistant right now. Please try again in a moment, or feel free to contact us directly.";

pub const SUMMARY_UNAVAILABLE: &str = "Project summary generation is currently unavailable.";
pub const SUMMARY_FALLBACK: &str = "Thank you for the details. We'll review your project and get back to you shortly.";

const SUMMARY_PROMPT: &str = "Summarize this project in 2-3 sentences. Be specific and professional:";
const SUMMARY_TIMEOUT: Duration = Duration::from_secs(15);
const SUMMARY_MAX_TOKENS: u32 = 256;

const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_MAX_INPUT_CHARS: usize = 1000;
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Tunables for the assistant
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub studio_name: String,
    /// Upper bound on one model call
    pub request_timeout: Duration,
    /// Longest accepted message, in characters after trimming
    pub max_input_chars: usize,
    pub max_tokens: Option<u32>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            studio_name: DEFAULT_STUDIO_NAME.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            max_tokens: Some(DEFAULT_MAX_TOKENS),
        }
    }
}

impl AssistantConfig {
    /// Read overrides from `STUDIO_NAME`, `ASSISTANT_TIMEOUT_SECS` and
    /// `ASSISTANT_MAX_INPUT_CHARS`. Unparseable values keep the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let studio_name = std::env::var("STUDIO_NAME")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.studio_name);
        let request_timeout = std::env::var("ASSISTANT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|&secs| secs > 0)
            .map_or(defaults.request_timeout, Duration::from_secs);
        let max_input_chars = std::env::var("ASSISTANT_MAX_INPUT_CHARS")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(defaults.max_input_chars);

        Self {
            studio_name,
            request_timeout,
            max_input_chars,
            max_tokens: defaults.max_tokens,
        }
    }
}

/// Failures that leave the assistant without any answer to give
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssistantError {
    #[error("No assistant model is configured")]
    Unavailable,
    #[error("Assistant did not answer within {}s", .0.as_secs())]
    TimedOut(Duration),
}

/// Production assistant collaborator
pub struct ConsultantAssistant {
    llm: Option<Arc<dyn LlmService>>,
    /// Cheaper model for brief summaries
    summary_llm: Option<Arc<dyn LlmService>>,
    config: AssistantConfig,
    system_prompt: String,
}

impl ConsultantAssistant {
    pub fn new(
        llm: Option<Arc<dyn LlmService>>,
        summary_llm: Option<Arc<dyn LlmService>>,
        config: AssistantConfig,
    ) -> Self {
        let system_prompt = build_system_prompt(&config.studio_name);
        Self {
            llm,
            summary_llm,
            config,
            system_prompt,
        }
    }

    pub fn from_registry(registry: &ModelRegistry, config: AssistantConfig) -> Self {
        Self::new(registry.default(), registry.get_cheap_model(), config)
    }

    /// Model ID used for chat replies, if any
    pub fn model_id(&self) -> Option<&str> {
        self.llm.as_ref().map(|llm| llm.model_id())
    }

    /// Reject messages that should never reach the model
    fn validate(&self, user_message: &str) -> Option<AssistantResponse> {
        let trimmed = user_message.trim();
        if trimmed.is_empty() {
            return Some(AssistantResponse::failure(EMPTY_MESSAGE_PROMPT, "Empty message"));
        }
        let max = self.config.max_input_chars;
        if trimmed.chars().count() > max {
            return Some(AssistantResponse::failure(
                format!("Please keep your message under {max} characters."),
                "Message too long",
            ));
        }
        None
    }

    /// One request per submission: the system prompt plus a single user
    /// message that carries the earlier turns as plain context.
    pub(crate) fn build_request(&self, user_message: &str, prior_history: &[ChatTurn]) -> LlmRequest {
        LlmRequest {
            system: vec![SystemContent::new(self.system_prompt.clone())],
            max_tokens: self.config.max_tokens,
            ..LlmRequest::prompt(contextualize(user_message.trim(), prior_history))
        }
    }

    /// Short prose summary of a brief, for the contact form confirmation.
    ///
    /// Never fails: a missing model, an error or a timeout each yield a fixed
    /// fallback sentence.
    pub async fn summarize_brief(&self, brief: &ProjectBrief) -> String {
        let Some(llm) = self.summary_llm.as_ref().or(self.llm.as_ref()) else {
            return SUMMARY_UNAVAILABLE.to_string();
        };

        let request = LlmRequest {
            max_tokens: Some(SUMMARY_MAX_TOKENS),
            ..LlmRequest::prompt(format!("{SUMMARY_PROMPT}\n\n{}", summary_facts(brief)))
        };

        match timeout(SUMMARY_TIMEOUT, llm.complete(&request)).await {
            Ok(Ok(response)) => {
                let summary = response.text.trim();
                if summary.is_empty() {
                    SUMMARY_FALLBACK.to_string()
                } else {
                    summary.to_string()
                }
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e.message, "Brief summary LLM error");
                SUMMARY_FALLBACK.to_string()
            }
            Err(_) => {
                tracing::warn!("Brief summary timed out");
                SUMMARY_FALLBACK.to_string()
            }
        }
    }
}

#[async_trait]
impl AssistantClient for ConsultantAssistant {
    async fn call(
        &self,
        user_message: &str,
        prior_history: &[ChatTurn],
        brief: Option<&ProjectBrief>,
    ) -> Result<AssistantResponse, AssistantError> {
        if let Some(rejected) = self.validate(user_message) {
            return Ok(rejected);
        }

        if let Some(brief) = brief {
            tracing::debug!("Answering from attached brief");
            return Ok(AssistantResponse::text(targeted_response(brief)));
        }

        let llm = self.llm.as_ref().ok_or(AssistantError::Unavailable)?;
        let request = self.build_request(user_message, prior_history);

        let start = Instant::now();
        let result = timeout(self.config.request_timeout, llm.complete(&request))
            .await
            .map_err(|_| AssistantError::TimedOut(self.config.request_timeout))?;

        match result {
            Ok(response) => {
                let parsed = parse_reply(&response.text);
                tracing::debug!(
                    duration_ms = %start.elapsed().as_millis(),
                    has_question = parsed.has_question(),
                    "Assistant reply parsed"
                );
                Ok(parsed)
            }
            Err(e) => Ok(AssistantResponse::failure(APOLOGY_MESSAGE, e.message)),
        }
    }
}

/// Fold earlier turns into the outgoing message
fn contextualize(user_message: &str, prior_history: &[ChatTurn]) -> String {
    if prior_history.is_empty() {
        return user_message.to_string();
    }

    let context = prior_history
        .iter()
        .map(|turn| format!("{}: {}", turn.role.as_str(), turn.content))
        .collect::<Vec<_>>()
        .join("\n");

    format!("Previous conversation context:\n{context}\n\nCurrent message: {user_message}")
}
