//! Chat session executor

use super::traits::AssistantClient;
use super::SessionEvent;

use crate::brief::ProjectBrief;
use crate::state_machine::{transition, ChatTurn, Effect, Event, SessionState};
use std::time::Duration;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::time::Instant;

const BROADCAST_CAPACITY: usize = 64;

/// One chat widget's session: state, attached brief and event fan-out
///
/// The state lock is only held while a transition is applied, never across
/// the assistant call. A submission that races an outstanding call therefore
/// sees `Awaiting` and is ignored.
pub struct ChatSession<A>
where
    A: AssistantClient + 'static,
{
    id: String,
    assistant: A,
    state: Mutex<SessionState>,
    brief: RwLock<Option<ProjectBrief>>,
    broadcast_tx: broadcast::Sender<SessionEvent>,
    last_activity: Mutex<Instant>,
}

impl<A> ChatSession<A>
where
    A: AssistantClient + 'static,
{
    pub fn new(id: impl Into<String>, assistant: A) -> Self {
        let (broadcast_tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            id: id.into(),
            assistant,
            state: Mutex::new(SessionState::new()),
            brief: RwLock::new(None),
            broadcast_tx,
            last_activity: Mutex::new(Instant::now()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    pub async fn brief(&self) -> Option<ProjectBrief> {
        self.brief.read().await.clone()
    }

    /// Attach or clear the form context sent with later assistant calls
    pub async fn set_brief(&self, brief: Option<ProjectBrief>) {
        *self.brief.write().await = brief;
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.broadcast_tx.subscribe()
    }

    /// True while some client holds the event stream open
    pub fn has_subscribers(&self) -> bool {
        self.broadcast_tx.receiver_count() > 0
    }

    /// Time since the session last saw an event or a lookup
    pub async fn idle_for(&self) -> Duration {
        self.last_activity.lock().await.elapsed()
    }

    pub(super) async fn touch(&self) {
        *self.last_activity.lock().await = Instant::now();
    }

    pub async fn set_pending_input(&self, text: impl Into<String>) {
        self.dispatch(Event::InputChanged { text: text.into() }).await;
    }

    /// Submit a message and wait until the exchange settles
    pub async fn submit(&self, text: impl Into<String>) {
        self.dispatch(Event::submit(text)).await;
    }

    /// Submit whatever is currently in the draft
    pub async fn submit_pending(&self) {
        let text = self.state.lock().await.pending_input().to_string();
        self.submit(text).await;
    }

    /// Answer the latest question with one of its options
    pub async fn select_option(&self, option: impl Into<String>) {
        self.dispatch(Event::option_selected(option)).await;
    }

    async fn dispatch(&self, event: Event) {
        // Chained events are processed in a loop, no recursion
        let mut events_to_process = vec![event];

        while let Some(current_event) = events_to_process.pop() {
            self.touch().await;
            let kind = current_event.kind();
            let effects = {
                let mut state = self.state.lock().await;
                match transition(&state, current_event) {
                    Ok(result) => {
                        if result.is_noop(&state) {
                            tracing::debug!(session_id = %self.id, event = kind, "Event ignored");
                        }
                        *state = result.new_state;
                        result.effects
                    }
                    Err(e) => {
                        tracing::warn!(session_id = %self.id, event = kind, error = %e, "Dropping event");
                        continue;
                    }
                }
            };

            for effect in effects {
                if let Some(generated_event) = self.execute_effect(effect).await {
                    events_to_process.push(generated_event);
                }
            }
        }
    }

    /// Execute an effect and optionally return a generated event
    async fn execute_effect(&self, effect: Effect) -> Option<Event> {
        match effect {
            Effect::CallAssistant {
                message,
                prior_history,
            } => Some(self.call_assistant(&message, &prior_history).await),

            Effect::NotifyTurn { turn } => {
                let _ = self.broadcast_tx.send(SessionEvent::TurnAppended { turn });
                None
            }

            Effect::NotifyError { message } => {
                let _ = self.broadcast_tx.send(SessionEvent::Error { message });
                None
            }

            Effect::NotifyStateChange => {
                let snapshot = self.snapshot().await;
                let _ = self.broadcast_tx.send(SessionEvent::StateChange { snapshot });
                None
            }
        }
    }

    async fn call_assistant(&self, message: &str, prior_history: &[ChatTurn]) -> Event {
        let brief = self.brief().await;
        let start = Instant::now();

        tracing::info!(
            session_id = %self.id,
            prior_turns = prior_history.len(),
            with_brief = brief.is_some(),
            "Calling assistant"
        );

        match self.assistant.call(message, prior_history, brief.as_ref()).await {
            Ok(response) => {
                tracing::info!(
                    session_id = %self.id,
                    duration_ms = %start.elapsed().as_millis(),
                    has_question = response.has_question(),
                    reported_error = ?response.error,
                    "Assistant answered"
                );
                Event::assistant_replied(response)
            }
            Err(e) => {
                tracing::error!(
                    session_id = %self.id,
                    duration_ms = %start.elapsed().as_millis(),
                    error = %e,
                    "Assistant call failed"
                );
                Event::AssistantFailed
            }
        }
    }
}
