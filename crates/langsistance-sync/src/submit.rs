//! Query submission and stop requests.

use std::sync::Arc;

use langsistance_core::{AnswerPayload, QueryRequest};

use crate::backend::AgentBackend;
use crate::state::SessionState;

/// Error message appended when a submitted query's round trip fails.
pub const SUBMIT_FAILURE_MESSAGE: &str = "Error: Unable to get a response.";

/// Error recorded in the sync status when a submit fails.
pub const SUBMIT_FAILURE_ERROR: &str = "Failed to process query.";

/// Status shown once the backend acknowledged a stop request.
pub const STOP_REQUESTED_STATUS: &str = "Requesting stop...";

/// Result of a submit.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The query was empty or whitespace-only and was not sent.
    Rejected,
    /// The backend answered; its metadata has been merged.
    Answered(AnswerPayload),
    /// The round trip failed and an error message was appended.
    Failed,
}

/// Sends user queries and stop requests to the backend.
///
/// Answers returned by `/query` only refresh the latest metadata; the
/// poller's next tick reconciles the authoritative answer into the
/// conversation.
pub struct QueryController<B: ?Sized> {
    backend: Arc<B>,
    state: Arc<SessionState>,
    tts_enabled: bool,
}

impl<B: ?Sized> Clone for QueryController<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            state: Arc::clone(&self.state),
            tts_enabled: self.tts_enabled,
        }
    }
}

impl<B: AgentBackend + ?Sized> QueryController<B> {
    /// Create a controller for `backend` that updates `state`.
    #[must_use]
    pub fn new(backend: Arc<B>, state: Arc<SessionState>, tts_enabled: bool) -> Self {
        Self {
            backend,
            state,
            tts_enabled,
        }
    }

    /// Submit a query.
    ///
    /// The user message is appended and the session marked busy before the
    /// request is sent. Whatever the outcome, the busy flag is cleared when
    /// the round trip ends (unless a newer submission has taken over).
    pub async fn submit(&self, query: &str) -> SubmitOutcome {
        if query.trim().is_empty() {
            tracing::debug!("Ignoring empty query");
            return SubmitOutcome::Rejected;
        }

        let message_id = self.state.push_user(query);
        let ticket = self.state.begin_query(query);
        tracing::debug!(message_id = %message_id, ticket, "Sending query");

        let request = QueryRequest::new(query, self.tts_enabled);
        match self.backend.query(&request).await {
            Ok(payload) => {
                self.state.merge_metadata(&payload);
                self.state.finish_query(ticket, None);
                SubmitOutcome::Answered(payload)
            }
            Err(e) => {
                if e.is_busy() {
                    tracing::warn!(ticket, "Backend is already generating an answer");
                } else {
                    tracing::warn!(error = %e, ticket, "Query failed");
                }
                self.state.push_error(SUBMIT_FAILURE_MESSAGE);
                self.state.finish_query(ticket, Some(SUBMIT_FAILURE_ERROR));
                SubmitOutcome::Failed
            }
        }
    }

    /// Ask the backend to stop, best effort.
    ///
    /// Local busy and error flags are cleared before the request is sent,
    /// regardless of its outcome. Messages are never removed.
    pub async fn stop(&self) {
        self.state.clear_pending();

        match self.backend.stop().await {
            Ok(()) => self.state.set_status_text(STOP_REQUESTED_STATUS),
            Err(e) => tracing::warn!(error = %e, "Failed to stop the agent"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedBackend;
    use langsistance_core::MessageKind;

    fn controller(backend: &Arc<ScriptedBackend>) -> (QueryController<ScriptedBackend>, Arc<SessionState>) {
        let state = Arc::new(SessionState::default());
        (
            QueryController::new(Arc::clone(backend), Arc::clone(&state), false),
            state,
        )
    }

    #[tokio::test]
    async fn blank_query_is_rejected_without_request() {
        let backend = Arc::new(ScriptedBackend::new());
        let (controller, state) = controller(&backend);

        assert_eq!(controller.submit("   \n").await, SubmitOutcome::Rejected);
        assert_eq!(controller.submit("").await, SubmitOutcome::Rejected);

        assert!(state.messages().is_empty());
        assert_eq!(backend.query_calls(), 0);
        assert!(!state.sync_status().is_busy);
    }

    #[tokio::test]
    async fn user_message_is_appended_before_response() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.set_query_reply(Some(AnswerPayload::with_answer("4").status("done")));
        let gate = backend.gate_queries();
        let (controller, state) = controller(&backend);

        let task = tokio::spawn({
            let controller = controller.clone();
            async move { controller.submit("What is 2+2?").await }
        });
        backend.query_started().await;

        let messages = state.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].kind, MessageKind::User);
        assert_eq!(messages[0].content, "What is 2+2?");
        assert!(state.sync_status().is_busy);
        assert_eq!(state.pending_query().unwrap().text, "What is 2+2?");

        gate.notify_one();
        let outcome = task.await.unwrap();

        assert!(matches!(outcome, SubmitOutcome::Answered(ref p) if p.answer == "4"));
        assert!(!state.sync_status().is_busy);
        assert!(state.pending_query().is_none());
        // The poller, not the submit, appends the agent answer.
        assert_eq!(state.messages().len(), 1);
        assert_eq!(state.metadata().status.as_deref(), Some("done"));
    }

    #[tokio::test]
    async fn raw_query_text_is_sent() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.set_query_reply(Some(AnswerPayload::default()));
        let (controller, _state) = controller(&backend);

        controller.submit("  padded query ").await;

        assert_eq!(
            backend.queries(),
            vec![QueryRequest::new("  padded query ", false)]
        );
    }

    #[tokio::test]
    async fn failed_submit_appends_one_error_and_clears_busy() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.set_query_reply(None);
        let (controller, state) = controller(&backend);

        assert_eq!(controller.submit("What is 2+2?").await, SubmitOutcome::Failed);

        let messages = state.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].kind, MessageKind::User);
        assert_eq!(messages[1].kind, MessageKind::Error);
        assert_eq!(messages[1].content, SUBMIT_FAILURE_MESSAGE);

        let status = state.sync_status();
        assert!(!status.is_busy);
        assert_eq!(status.last_error.as_deref(), Some(SUBMIT_FAILURE_ERROR));
        assert_eq!(backend.query_calls(), 1);
    }

    #[tokio::test]
    async fn stop_clears_busy_even_when_request_fails() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.set_stop_ok(false);
        let (controller, state) = controller(&backend);
        state.begin_query("long task");

        controller.stop().await;

        let status = state.sync_status();
        assert!(!status.is_busy);
        assert!(status.last_error.is_none());
        assert_eq!(state.status_text(), "Agents ready");
        assert_eq!(backend.stop_calls(), 1);
    }

    #[tokio::test]
    async fn acknowledged_stop_updates_status_and_keeps_messages() {
        let backend = Arc::new(ScriptedBackend::new());
        let (controller, state) = controller(&backend);
        state.push_user("long task");
        state.begin_query("long task");

        controller.stop().await;

        assert_eq!(state.status_text(), STOP_REQUESTED_STATUS);
        assert_eq!(state.messages().len(), 1);
        assert!(!state.sync_status().is_busy);
    }

    #[tokio::test]
    async fn tts_flag_is_forwarded() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.set_query_reply(Some(AnswerPayload::default()));
        let state = Arc::new(SessionState::default());
        let controller = QueryController::new(Arc::clone(&backend), state, true);

        controller.submit("speak").await;

        assert!(backend.queries()[0].tts_enabled);
    }
}
