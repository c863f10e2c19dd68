//! Latest-answer polling.
//!
//! Each poll fetches the backend's most recent answer, records its metadata
//! and appends it to the conversation unless it is empty or a normalized
//! duplicate of an existing agent message. Repeated polls of an unchanged
//! backend answer are therefore no-ops.

use std::sync::Arc;

use langsistance_core::{AnswerPayload, AppendOutcome, MessageId};

use crate::backend::AgentBackend;
use crate::state::SessionState;

/// Result of a single poll.
#[derive(Debug, Clone, PartialEq)]
pub enum PollResult {
    /// A new agent message was appended.
    Appended {
        /// ID of the new message.
        id: MessageId,
        /// The payload it was built from.
        payload: AnswerPayload,
    },
    /// The answer matched an existing agent message and was discarded.
    Duplicate {
        /// The message that already carries this answer.
        existing: MessageId,
        /// The discarded payload.
        payload: AnswerPayload,
    },
    /// The payload had no answer text; only metadata was updated.
    Empty {
        /// The payload.
        payload: AnswerPayload,
    },
    /// The fetch failed; nothing changed.
    Failed,
}

impl PollResult {
    /// The fetched payload, unless the fetch failed.
    #[must_use]
    pub fn payload(&self) -> Option<&AnswerPayload> {
        match self {
            Self::Appended { payload, .. }
            | Self::Duplicate { payload, .. }
            | Self::Empty { payload } => Some(payload),
            Self::Failed => None,
        }
    }

    /// ID of the appended message, if this poll appended one.
    #[must_use]
    pub fn appended(&self) -> Option<MessageId> {
        match self {
            Self::Appended { id, .. } => Some(*id),
            _ => None,
        }
    }
}

/// Reconciles the backend's latest answer with the local conversation.
pub struct LatestAnswerPoller<B: ?Sized> {
    backend: Arc<B>,
    state: Arc<SessionState>,
}

impl<B: ?Sized> Clone for LatestAnswerPoller<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            state: Arc::clone(&self.state),
        }
    }
}

impl<B: AgentBackend + ?Sized> LatestAnswerPoller<B> {
    /// Create a poller for `backend` that updates `state`.
    #[must_use]
    pub fn new(backend: Arc<B>, state: Arc<SessionState>) -> Self {
        Self { backend, state }
    }

    /// Poll once.
    ///
    /// Fetch errors are logged and reported as [`PollResult::Failed`]; they
    /// change neither the conversation nor the online flag.
    pub async fn poll_once(&self) -> PollResult {
        let payload = match self.backend.latest_answer().await {
            Ok(payload) => payload,
            Err(e) if e.is_not_found() => {
                tracing::debug!(error = %e, "No answer available yet");
                return PollResult::Failed;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch latest answer");
                return PollResult::Failed;
            }
        };

        // Keep status displays live even before a final answer exists.
        self.state.merge_metadata(&payload);

        match self.state.append_answer(&payload) {
            AppendOutcome::Appended(id) => {
                tracing::debug!(
                    message_id = %id,
                    agent = ?payload.agent_name,
                    uid = ?payload.uid,
                    "Appended agent answer"
                );
                PollResult::Appended { id, payload }
            }
            AppendOutcome::Duplicate(existing) => {
                tracing::debug!(existing = %existing, "Duplicate answer detected, skipping");
                PollResult::Duplicate { existing, payload }
            }
            AppendOutcome::Empty => PollResult::Empty { payload },
        }
    }
}
