//! Studio chat - AI consultant backend for a creative studio's contact page
//!
//! Hosts per-visitor chat sessions, each driven by a small state machine
//! around one assistant call at a time.

mod api;
mod assistant;
mod brief;
mod llm;
mod reply;
mod runtime;
mod state_machine;
mod system_prompt;

use api::{create_router, AppState};
use assistant::{AssistantConfig, ConsultantAssistant};
use llm::{LlmConfig, ModelRegistry};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "studio_chat=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let port: u16 = std::env::var("STUDIO_CHAT_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);

    // Initialize LLM registry
    let llm_config = LlmConfig::from_env();
    let llm_registry = Arc::new(ModelRegistry::new(&llm_config));

    if llm_registry.has_models() {
        tracing::info!(
            models = ?llm_registry.available_models(),
            default = %llm_registry.default_model_id(),
            "LLM registry initialized"
        );
    } else {
        tracing::warn!(
            "No LLM configured. Set GOOGLE_GEMINI_API_KEY or LLM_GATEWAY; only brief-based replies will work."
        );
    }

    let assistant_config = AssistantConfig::from_env();
    tracing::info!(
        studio = %assistant_config.studio_name,
        timeout_secs = assistant_config.request_timeout.as_secs(),
        max_input_chars = assistant_config.max_input_chars,
        "Assistant configured"
    );
    let assistant = Arc::new(ConsultantAssistant::from_registry(&llm_registry, assistant_config));
    if let Some(model) = assistant.model_id() {
        tracing::info!(model = %model, "Assistant model selected");
    }

    // Create application state
    let state = AppState::new(llm_registry, assistant);

    // Visitors rarely delete their session, so idle ones are swept
    let session_ttl = runtime::session_ttl_from_env();
    tracing::info!(ttl_secs = session_ttl.as_secs(), "Session sweeper started");
    let _sweeper = runtime::spawn_idle_sweeper(state.sessions.clone(), session_ttl);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .layer(compression),
    );

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Studio chat server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
