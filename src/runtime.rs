//! Runtime for live chat sessions
//!
//! Each session owns its state machine and history; nothing is shared
//! between sessions except the assistant client.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::ChatSession;
pub use traits::*;

use crate::state_machine::{ChatTurn, SessionState};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Sessions with no activity for this long are dropped
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

/// Idle TTL from `STUDIO_CHAT_SESSION_TTL_SECS`, falling back to the default
pub fn session_ttl_from_env() -> Duration {
    std::env::var("STUDIO_CHAT_SESSION_TTL_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|&secs| secs > 0)
        .map_or(DEFAULT_SESSION_TTL, Duration::from_secs)
}

/// Session type used by the server
pub type SharedSession = ChatSession<Arc<dyn AssistantClient>>;

/// Events sent to session subscribers
#[derive(Debug, Clone)]
pub enum SessionEvent {
    TurnAppended { turn: ChatTurn },
    StateChange { snapshot: SessionState },
    Error { message: String },
}

/// Registry of live sessions
pub struct SessionManager {
    assistant: Arc<dyn AssistantClient>,
    sessions: RwLock<HashMap<String, Arc<SharedSession>>>,
}

impl SessionManager {
    pub fn new(assistant: Arc<dyn AssistantClient>) -> Self {
        Self {
            assistant,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Start a fresh, empty session
    pub async fn create(&self) -> Arc<SharedSession> {
        let id = uuid::Uuid::new_v4().to_string();
        let session = Arc::new(ChatSession::new(id.clone(), self.assistant.clone()));
        let live = {
            let mut sessions = self.sessions.write().await;
            sessions.insert(id.clone(), session.clone());
            sessions.len()
        };
        tracing::info!(session_id = %id, live_sessions = live, "Session created");
        session
    }

    /// Look up a session; a lookup counts as activity
    pub async fn get(&self, id: &str) -> Option<Arc<SharedSession>> {
        let session = self.sessions.read().await.get(id).cloned()?;
        session.touch().await;
        Some(session)
    }

    /// Discard a session. A call still in flight finishes against the
    /// detached session and is never seen by anyone.
    pub async fn remove(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            tracing::info!(session_id = %id, "Session removed");
        }
        removed
    }

    /// Drop sessions idle for at least `ttl`. Sessions with an open stream
    /// or an outstanding call are kept.
    pub async fn sweep_idle(&self, ttl: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let mut expired = Vec::new();
        for (id, session) in sessions.iter() {
            if session.has_subscribers() || session.snapshot().await.is_loading() {
                continue;
            }
            if session.idle_for().await >= ttl {
                expired.push(id.clone());
            }
        }

        for id in &expired {
            sessions.remove(id);
            tracing::info!(session_id = %id, "Session expired");
        }
        if !expired.is_empty() {
            tracing::info!(
                expired = expired.len(),
                live_sessions = sessions.len(),
                "Swept idle sessions"
            );
        }
        expired.len()
    }

    #[allow(dead_code)] // Diagnostics and tests
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    #[allow(dead_code)] // Pairs with len()
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

/// Periodically drop idle sessions from `manager`
pub fn spawn_idle_sweeper(manager: Arc<SessionManager>, ttl: Duration) -> JoinHandle<()> {
    let period = (ttl / 4).max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            manager.sweep_idle(ttl).await;
        }
    })
}
