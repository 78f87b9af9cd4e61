//! Model registry for the available Gemini models

use super::{GeminiModel, GeminiService, LlmService, LoggingService};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Preferred default when none is configured
const PREFERRED_DEFAULT: &str = "gemini-2.0-flash";

/// Cheapest first, for auxiliary tasks like summaries
const CHEAP_MODELS: &[&str] = &["gemini-2.0-flash-lite", "gemini-2.0-flash"];

/// Configuration for the Gemini provider
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub gemini_api_key: Option<String>,
    /// Gateway base URL; when set the gateway handles authentication
    pub gateway: Option<String>,
    /// Default model ID
    pub default_model: Option<String>,
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self {
            gemini_api_key: std::env::var("GOOGLE_GEMINI_API_KEY").ok(),
            gateway: std::env::var("LLM_GATEWAY").ok(),
            default_model: std::env::var("DEFAULT_MODEL").ok(),
        }
    }
}

/// Model information with metadata
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub id: String,
    pub provider: String,
    pub description: String,
    pub context_window: usize,
}

/// Registry of available LLM models
pub struct ModelRegistry {
    services: HashMap<String, Arc<dyn LlmService>>,
    default_model: String,
}

impl ModelRegistry {
    /// Create an empty registry for testing purposes
    #[cfg(test)]
    pub fn new_empty() -> Self {
        Self {
            services: HashMap::new(),
            default_model: PREFERRED_DEFAULT.to_string(),
        }
    }

    pub fn new(config: &LlmConfig) -> Self {
        let mut services: HashMap<String, Arc<dyn LlmService>> = HashMap::new();

        for model in GeminiModel::all() {
            if let Some(service) = Self::try_create_model(*model, config) {
                services.insert(model.api_name().to_string(), service);
            }
        }

        let default_model = config
            .default_model
            .clone()
            .filter(|id| services.contains_key(id))
            .unwrap_or_else(|| PREFERRED_DEFAULT.to_string());

        Self {
            services,
            default_model,
        }
    }

    /// Try to create a model service, validating prerequisites
    fn try_create_model(model: GeminiModel, config: &LlmConfig) -> Option<Arc<dyn LlmService>> {
        let gateway = config.gateway.as_deref().filter(|g| !g.trim().is_empty());
        let api_key = config
            .gemini_api_key
            .clone()
            .filter(|k| !k.trim().is_empty());

        // Direct mode needs a real key
        if gateway.is_none() && api_key.is_none() {
            return None;
        }
        let api_key = if gateway.is_some() { None } else { api_key };

        match GeminiService::new(api_key, model, gateway) {
            Ok(service) => Some(Arc::new(LoggingService::new(Arc::new(service)))),
            Err(e) => {
                tracing::warn!(model = model.api_name(), error = %e, "Failed to create model service");
                None
            }
        }
    }

    /// Get a model by ID
    pub fn get(&self, model_id: &str) -> Option<Arc<dyn LlmService>> {
        self.services.get(model_id).cloned()
    }

    /// Get the default model
    pub fn default(&self) -> Option<Arc<dyn LlmService>> {
        self.get(&self.default_model)
    }

    /// Get the default model ID
    pub fn default_model_id(&self) -> &str {
        &self.default_model
    }

    /// List all available model IDs
    pub fn available_models(&self) -> Vec<String> {
        let mut models: Vec<_> = self.services.keys().cloned().collect();
        models.sort();
        models
    }

    /// Get detailed information about available models
    pub fn available_model_info(&self) -> Vec<ModelInfo> {
        GeminiModel::all()
            .iter()
            .filter(|model| self.services.contains_key(model.api_name()))
            .map(|model| ModelInfo {
                id: model.api_name().to_string(),
                provider: "Google".to_string(),
                description: model.description().to_string(),
                context_window: model.context_window(),
            })
            .collect()
    }

    /// Check if any models are available
    pub fn has_models(&self) -> bool {
        !self.services.is_empty()
    }

    /// Get a cheap/fast model for auxiliary tasks like brief summaries.
    pub fn get_cheap_model(&self) -> Option<Arc<dyn LlmService>> {
        CHEAP_MODELS
            .iter()
            .find_map(|id| self.get(id))
            .or_else(|| self.default())
    }
}
