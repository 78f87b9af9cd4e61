//! Server-Sent Events support

use super::types::SessionView;
use crate::runtime::SessionEvent;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Convert a session's broadcast stream to an SSE stream
pub fn sse_stream(
    init: SessionView,
    broadcast_rx: tokio::sync::broadcast::Receiver<SessionEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let session_id = init.id.clone();

    // Start with the current snapshot, then follow broadcasts
    let init_stream = futures::stream::once(async move {
        Ok(Event::default()
            .event("init")
            .data(json!({ "type": "init", "session": to_json(&init) }).to_string()))
    });

    let broadcasts = BroadcastStream::new(broadcast_rx).filter_map(move |result| match result {
        Ok(event) => Some(Ok(session_event_to_axum(&session_id, event))),
        Err(_) => None, // Skip lagged messages
    });

    Sse::new(init_stream.chain(broadcasts)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn session_event_to_axum(session_id: &str, event: SessionEvent) -> Event {
    let (event_type, data) = match event {
        SessionEvent::TurnAppended { turn } => (
            "turn",
            json!({
                "type": "turn",
                "turn": to_json(&turn)
            }),
        ),
        SessionEvent::StateChange { snapshot } => (
            "state_change",
            json!({
                "type": "state_change",
                "session": to_json(&SessionView::new(session_id, &snapshot))
            }),
        ),
        SessionEvent::Error { message } => (
            "error",
            json!({
                "type": "error",
                "message": message
            }),
        ),
    };

    Event::default().event(event_type).data(data.to_string())
}

fn to_json<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}
