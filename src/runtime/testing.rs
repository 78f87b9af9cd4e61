//! Mock implementations for testing
//!
//! These mocks enable integration testing without real I/O.

use super::traits::*;
use crate::assistant::AssistantError;
use crate::brief::ProjectBrief;
use crate::llm::{LlmError, LlmRequest, LlmResponse, LlmService};
use crate::reply::AssistantResponse;
use crate::state_machine::ChatTurn;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

// ============================================================================
// Mock LLM Service
// ============================================================================

/// Mock LLM service that returns queued responses
pub struct MockLlmService {
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    model_id: String,
    delay: Option<Duration>,
    /// Record of all requests made
    pub requests: Mutex<Vec<LlmRequest>>,
}

#[allow(dead_code)]
impl MockLlmService {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Sleep this long before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a successful response
    pub fn queue_response(&self, response: LlmResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmService for MockLlmService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// ============================================================================
// Mock Assistant
// ============================================================================

/// Arguments of one assistant call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub message: String,
    pub prior_history: Vec<ChatTurn>,
    pub brief: Option<ProjectBrief>,
}

/// Mock assistant that returns queued results
#[derive(Default)]
pub struct MockAssistant {
    results: Mutex<VecDeque<Result<AssistantResponse, AssistantError>>>,
    /// Record of all calls made
    pub calls: Mutex<Vec<RecordedCall>>,
}

#[allow(dead_code)]
impl MockAssistant {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_response(&self, response: AssistantResponse) {
        self.results.lock().unwrap().push_back(Ok(response));
    }

    pub fn queue_error(&self, error: AssistantError) {
        self.results.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, user_message: &str, prior_history: &[ChatTurn], brief: Option<&ProjectBrief>) {
        self.calls.lock().unwrap().push(RecordedCall {
            message: user_message.to_string(),
            prior_history: prior_history.to_vec(),
            brief: brief.cloned(),
        });
    }

    fn next_result(&self) -> Result<AssistantResponse, AssistantError> {
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(AssistantError::Unavailable))
    }
}

#[async_trait]
impl AssistantClient for MockAssistant {
    async fn call(
        &self,
        user_message: &str,
        prior_history: &[ChatTurn],
        brief: Option<&ProjectBrief>,
    ) -> Result<AssistantResponse, AssistantError> {
        self.record(user_message, prior_history, brief);
        self.next_result()
    }
}

// ============================================================================
// Gated Mock Assistant (for re-entrancy testing)
// ============================================================================

/// Mock assistant that holds each call open until released
pub struct GatedMockAssistant {
    inner: MockAssistant,
    /// Notified when a call starts
    pub call_started: Arc<Notify>,
    /// Notify to let the outstanding call return
    pub release: Arc<Notify>,
}

impl GatedMockAssistant {
    pub fn new() -> Self {
        Self {
            inner: MockAssistant::new(),
            call_started: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
        }
    }

    pub fn queue_response(&self, response: AssistantResponse) {
        self.inner.queue_response(response);
    }

    pub fn call_count(&self) -> usize {
        self.inner.call_count()
    }
}

#[async_trait]
impl AssistantClient for GatedMockAssistant {
    async fn call(
        &self,
        user_message: &str,
        prior_history: &[ChatTurn],
        brief: Option<&ProjectBrief>,
    ) -> Result<AssistantResponse, AssistantError> {
        self.inner.record(user_message, prior_history, brief);
        self.call_started.notify_one();
        self.release.notified().await;
        self.inner.next_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reply::{QuestionKind, StructuredQuestion};
    use crate::runtime::{spawn_idle_sweeper, ChatSession, SessionEvent, SessionManager};
    use crate::state_machine::{Phase, Role, TRANSPORT_FAILURE_MESSAGE};

    fn question_reply() -> AssistantResponse {
        AssistantResponse {
            message: "Which platform do you prefer?".to_string(),
            question: Some(StructuredQuestion {
                question: "Which platform?".to_string(),
                options: vec!["Shopify".to_string(), "WooCommerce".to_string()],
                kind: QuestionKind::Single,
            }),
            error: None,
        }
    }

    fn session(assistant: &Arc<MockAssistant>) -> ChatSession<Arc<MockAssistant>> {
        ChatSession::new("test-session", assistant.clone())
    }

    #[tokio::test]
    async fn test_mock_assistant_queue() {
        let mock = MockAssistant::new();
        mock.queue_response(AssistantResponse::text("Hello"));

        let response = mock.call("Hi", &[], None).await.unwrap();
        assert_eq!(response.message, "Hello");

        // Nothing left queued
        assert!(mock.call("Hi", &[], None).await.is_err());
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_simple_exchange() {
        let assistant = Arc::new(MockAssistant::new());
        assistant.queue_response(AssistantResponse::text("Hi! What are you building?"));
        let session = session(&assistant);

        session.submit("  Hello  ").await;

        let state = session.snapshot().await;
        assert_eq!(state.history().len(), 2);
        assert_eq!(state.history()[0].role, Role::User);
        assert_eq!(state.history()[0].content, "Hello");
        assert_eq!(state.history()[1].role, Role::Assistant);
        assert_eq!(state.history()[1].content, "Hi! What are you building?");
        assert_eq!(state.phase(), &Phase::Idle);
        assert!(state.last_error().is_none());

        let calls = assistant.recorded_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].message, "Hello");
        assert!(calls[0].prior_history.is_empty());
    }

    #[tokio::test]
    async fn test_prior_history_excludes_current_message() {
        let assistant = Arc::new(MockAssistant::new());
        assistant.queue_response(AssistantResponse::text("First"));
        assistant.queue_response(AssistantResponse::text("Second"));
        let session = session(&assistant);

        session.submit("one").await;
        session.submit("two").await;

        let calls = assistant.recorded_calls();
        assert_eq!(calls[1].message, "two");
        let prior: Vec<&str> = calls[1].prior_history.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(prior, vec!["one", "First"]);
    }

    /// Blank submissions never reach the assistant
    #[tokio::test]
    async fn test_whitespace_submit_is_ignored() {
        let assistant = Arc::new(MockAssistant::new());
        let session = session(&assistant);

        session.submit("   ").await;

        let state = session.snapshot().await;
        assert!(state.history().is_empty());
        assert_eq!(state.phase(), &Phase::Idle);
        assert_eq!(assistant.call_count(), 0);
    }

    /// A failed call keeps the user turn and surfaces the generic fallback
    #[tokio::test]
    async fn test_call_failure_recovers() {
        let assistant = Arc::new(MockAssistant::new());
        assistant.queue_error(AssistantError::TimedOut(Duration::from_secs(60)));
        let session = session(&assistant);

        session.submit("Hello").await;

        let state = session.snapshot().await;
        assert_eq!(state.history().len(), 1);
        assert_eq!(state.history()[0].content, "Hello");
        assert_eq!(state.last_error(), Some(TRANSPORT_FAILURE_MESSAGE));
        assert!(!state.is_loading());
    }

    #[tokio::test]
    async fn test_reported_error_leaves_history() {
        let assistant = Arc::new(MockAssistant::new());
        assistant.queue_response(AssistantResponse::failure("Sorry", "quota exhausted"));
        assistant.queue_response(AssistantResponse::text("Back online"));
        let session = session(&assistant);

        session.submit("Hello").await;
        let state = session.snapshot().await;
        assert_eq!(state.history().len(), 1);
        assert_eq!(state.last_error(), Some("quota exhausted"));

        // Retrying clears the error
        session.submit("Hello again").await;
        let state = session.snapshot().await;
        assert_eq!(state.history().len(), 3);
        assert!(state.last_error().is_none());
    }

    #[tokio::test]
    async fn test_select_option_submits_label() {
        let assistant = Arc::new(MockAssistant::new());
        assistant.queue_response(question_reply());
        assistant.queue_response(AssistantResponse::text("Shopify it is."));
        let session = session(&assistant);

        session.submit("I want an online shop").await;
        let state = session.snapshot().await;
        assert_eq!(state.latest_question().unwrap().options, vec!["Shopify", "WooCommerce"]);

        session.select_option("Shopify").await;

        let state = session.snapshot().await;
        assert_eq!(state.history().len(), 4);
        assert_eq!(state.history()[2].role, Role::User);
        assert_eq!(state.history()[2].content, "Shopify");
        assert_eq!(state.history()[3].content, "Shopify it is.");
        assert_eq!(assistant.recorded_calls()[1].message, "Shopify");
        assert_eq!(state.pending_input(), "");
    }

    #[tokio::test]
    async fn test_select_option_matches_input_then_submit() {
        let via_option = Arc::new(MockAssistant::new());
        via_option.queue_response(AssistantResponse::text("ok"));
        let a = session(&via_option);
        a.select_option("X").await;

        let via_input = Arc::new(MockAssistant::new());
        via_input.queue_response(AssistantResponse::text("ok"));
        let b = session(&via_input);
        b.set_pending_input("X").await;
        b.submit_pending().await;

        let (a, b) = (a.snapshot().await, b.snapshot().await);
        assert_eq!(a.history().len(), b.history().len());
        for (x, y) in a.history().iter().zip(b.history()) {
            assert_eq!(x.role, y.role);
            assert_eq!(x.content, y.content);
        }
        assert_eq!(a.pending_input(), b.pending_input());
        assert_eq!(via_option.recorded_calls()[0].message, via_input.recorded_calls()[0].message);
    }

    /// A second submit while a call is outstanding changes nothing
    #[tokio::test]
    async fn test_submit_while_awaiting_is_ignored() {
        let assistant = Arc::new(GatedMockAssistant::new());
        assistant.queue_response(AssistantResponse::text("Hi"));
        let session = Arc::new(ChatSession::new("gated", assistant.clone()));

        let first = {
            let session = session.clone();
            tokio::spawn(async move { session.submit("Hello").await })
        };
        assistant.call_started.notified().await;

        let state = session.snapshot().await;
        assert!(state.is_loading());
        assert_eq!(state.history().len(), 1);

        // Returns immediately: the guard ignores it
        session.submit("Hello again").await;
        session.select_option("Shopify").await;
        let state = session.snapshot().await;
        assert_eq!(state.history().len(), 1);
        assert_eq!(state.pending_input(), "Shopify");

        assistant.release.notify_one();
        first.await.unwrap();

        let state = session.snapshot().await;
        assert_eq!(assistant.call_count(), 1);
        assert_eq!(state.history().len(), 2);
        assert!(!state.is_loading());
    }

    #[tokio::test]
    async fn test_brief_is_passed_to_assistant() {
        let assistant = Arc::new(MockAssistant::new());
        assistant.queue_response(AssistantResponse::text("one"));
        assistant.queue_response(AssistantResponse::text("two"));
        let session = session(&assistant);
        let brief = ProjectBrief {
            project_type: Some("Web app".to_string()),
            ..ProjectBrief::default()
        };

        session.set_brief(Some(brief.clone())).await;
        session.submit("Hello").await;
        session.set_brief(None).await;
        session.submit("Hello").await;

        let calls = assistant.recorded_calls();
        assert_eq!(calls[0].brief.as_ref(), Some(&brief));
        assert!(calls[1].brief.is_none());
    }

    #[tokio::test]
    async fn test_events_are_broadcast() {
        let assistant = Arc::new(MockAssistant::new());
        assistant.queue_response(AssistantResponse::text("Hi"));
        assistant.queue_error(AssistantError::Unavailable);
        let session = session(&assistant);
        let mut rx = session.subscribe();

        session.submit("Hello").await;
        session.submit("Again").await;

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }

        let turns: Vec<&str> = events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::TurnAppended { turn } => Some(turn.content.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(turns, vec!["Hello", "Hi", "Again"]);

        let errors: Vec<&str> = events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::Error { message } => Some(message.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(errors, vec![TRANSPORT_FAILURE_MESSAGE]);

        match events.last() {
            Some(SessionEvent::StateChange { snapshot }) => {
                assert!(!snapshot.is_loading());
                assert_eq!(snapshot.last_error(), Some(TRANSPORT_FAILURE_MESSAGE));
            }
            other => panic!("Expected final state change, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_session_manager_lifecycle() {
        let manager = SessionManager::new(Arc::new(MockAssistant::new()));
        assert!(manager.is_empty().await);

        let a = manager.create().await;
        let b = manager.create().await;
        assert_ne!(a.id(), b.id());
        assert_eq!(manager.len().await, 2);
        assert!(manager.get(a.id()).await.is_some());

        assert!(manager.remove(a.id()).await);
        assert!(!manager.remove(a.id()).await);
        assert!(manager.get(a.id()).await.is_none());
        assert_eq!(manager.len().await, 1);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let assistant = Arc::new(MockAssistant::new());
        assistant.queue_response(AssistantResponse::text("Hi"));
        let manager = SessionManager::new(assistant.clone());

        let a = manager.create().await;
        let b = manager.create().await;
        a.submit("Hello").await;

        assert_eq!(a.snapshot().await.history().len(), 2);
        assert!(b.snapshot().await.history().is_empty());
    }

    #[tokio::test]
    async fn test_submit_pending_uses_latest_draft() {
        let assistant = Arc::new(MockAssistant::new());
        assistant.queue_response(AssistantResponse::text("Hi"));
        let session = session(&assistant);

        session.set_pending_input("first").await;
        session.set_pending_input("second").await;
        session.submit_pending().await;

        let calls = assistant.recorded_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].message, "second");
        assert_eq!(session.snapshot().await.pending_input(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_sessions_are_swept() {
        let ttl = Duration::from_secs(30 * 60);
        let manager = SessionManager::new(Arc::new(MockAssistant::new()));
        let stale = manager.create().await;
        let fresh = manager.create().await;

        tokio::time::advance(Duration::from_secs(20 * 60)).await;
        assert_eq!(manager.sweep_idle(ttl).await, 0);

        // A lookup keeps the session alive
        assert!(manager.get(fresh.id()).await.is_some());
        tokio::time::advance(Duration::from_secs(15 * 60)).await;

        assert_eq!(manager.sweep_idle(ttl).await, 1);
        assert!(manager.get(stale.id()).await.is_none());
        assert!(manager.get(fresh.id()).await.is_some());
        assert_eq!(manager.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_keeps_streamed_and_busy_sessions() {
        let ttl = Duration::from_secs(60);
        let gated = Arc::new(GatedMockAssistant::new());
        gated.queue_response(AssistantResponse::text("Hi"));
        let manager = SessionManager::new(gated.clone());

        let streamed = manager.create().await;
        let rx = streamed.subscribe();

        let busy = manager.create().await;
        let started = gated.call_started.notified();
        let call = tokio::spawn({
            let busy = busy.clone();
            async move { busy.submit("Hello").await }
        });
        started.await;

        tokio::time::advance(Duration::from_secs(600)).await;
        assert_eq!(manager.sweep_idle(ttl).await, 0);
        assert_eq!(manager.len().await, 2);

        gated.release.notify_one();
        call.await.unwrap();
        drop(rx);

        tokio::time::advance(Duration::from_secs(600)).await;
        assert_eq!(manager.sweep_idle(ttl).await, 2);
        assert!(manager.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_task_expires_sessions() {
        let manager = Arc::new(SessionManager::new(Arc::new(MockAssistant::new())));
        for _ in 0..100 {
            manager.create().await;
        }

        let sweeper = spawn_idle_sweeper(manager.clone(), Duration::from_secs(60));
        tokio::time::sleep(Duration::from_secs(120)).await;

        assert!(manager.is_empty().await);
        sweeper.abort();
    }
}
