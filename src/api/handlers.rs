//! HTTP request handlers

use super::sse::sse_stream;
use super::types::{
    BriefRequest, ErrorResponse, InputRequest, ModelsResponse, QueuedResponse, SelectRequest,
    SessionView, SubmitRequest, SuccessResponse, SummaryRequest, SummaryResponse,
};
use super::AppState;
use crate::runtime::SharedSession;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use std::sync::Arc;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Session lifecycle
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session).delete(delete_session))
        // SSE streaming
        .route("/api/sessions/:id/stream", get(stream_session))
        // User actions
        .route("/api/sessions/:id/input", post(set_input))
        .route("/api/sessions/:id/submit", post(submit))
        .route("/api/sessions/:id/select", post(select_option))
        .route("/api/sessions/:id/brief", put(set_brief))
        // Contact form
        .route("/api/brief/summary", post(summarize_brief))
        // Model info
        .route("/api/models", get(list_models))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

async fn find_session(state: &AppState, id: &str) -> Result<Arc<SharedSession>, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session not found: {id}")))
}

async fn view(session: &SharedSession) -> SessionView {
    SessionView::new(session.id(), &session.snapshot().await)
}

// ============================================================
// Session Lifecycle
// ============================================================

async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionView>) {
    let session = state.sessions.create().await;
    (StatusCode::CREATED, Json(view(&session).await))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, AppError> {
    let session = find_session(&state, &id).await?;
    Ok(Json(view(&session).await))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    if state.sessions.remove(&id).await {
        Ok(Json(SuccessResponse { success: true }))
    } else {
        Err(AppError::NotFound(format!("Session not found: {id}")))
    }
}

// ============================================================
// SSE Streaming
// ============================================================

async fn stream_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let session = find_session(&state, &id).await?;

    // Subscribe before taking the snapshot so nothing falls in between
    let broadcast_rx = session.subscribe();
    let init = view(&session).await;

    Ok(sse_stream(init, broadcast_rx))
}

// ============================================================
// User Actions
// ============================================================

async fn set_input(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<InputRequest>,
) -> Result<Json<SessionView>, AppError> {
    let session = find_session(&state, &id).await?;
    session.set_pending_input(req.text).await;
    Ok(Json(view(&session).await))
}

/// Submissions run in the background; progress arrives over the stream.
/// `queued` is false when the submission would be ignored anyway.
///
/// An empty body submits the draft as it stands when the submission runs.
async fn submit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<QueuedResponse>, AppError> {
    let session = find_session(&state, &id).await?;
    let req = parse_submit_body(&body)?;

    let snapshot = session.snapshot().await;
    let text = req.text.as_deref().unwrap_or(snapshot.pending_input());
    let queued = !text.trim().is_empty() && !snapshot.is_loading();

    if queued {
        tokio::spawn(async move {
            match req.text {
                Some(text) => session.submit(text).await,
                None => session.submit_pending().await,
            }
        });
    }

    Ok(Json(QueuedResponse { queued }))
}

fn parse_submit_body(body: &[u8]) -> Result<SubmitRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(SubmitRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| AppError::BadRequest(format!("Invalid request body: {e}")))
}

async fn select_option(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SelectRequest>,
) -> Result<Json<QueuedResponse>, AppError> {
    let session = find_session(&state, &id).await?;
    let queued = !req.option.trim().is_empty() && !session.snapshot().await.is_loading();

    // The draft still takes the label even when the submission is ignored
    tokio::spawn(async move { session.select_option(req.option).await });

    Ok(Json(QueuedResponse { queued }))
}

async fn set_brief(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<BriefRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    let session = find_session(&state, &id).await?;
    session.set_brief(req.brief).await;
    Ok(Json(SuccessResponse { success: true }))
}

// ============================================================
// Contact Form
// ============================================================

async fn summarize_brief(
    State(state): State<AppState>,
    Json(req): Json<SummaryRequest>,
) -> Json<SummaryResponse> {
    let summary = state.assistant.summarize_brief(&req.brief).await;
    Json(SummaryResponse { summary })
}

// ============================================================
// Model Info
// ============================================================

async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: state.llm_registry.available_model_info(),
        default: state.llm_registry.default_model_id().to_string(),
    })
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    concat!("studio-chat ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
