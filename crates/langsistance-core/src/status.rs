//! Transient synchronization state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::payload::AnswerPayload;

/// Connectivity and request flags, overwritten every probe/poll cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStatus {
    /// Whether the last health probe reached the backend.
    pub is_online: bool,
    /// Whether a submitted query is outstanding.
    pub is_busy: bool,
    /// Last user-facing failure, cleared by a new submit or a stop.
    pub last_error: Option<String>,
}

/// A submitted query whose round trip has not completed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuery {
    /// Submission ticket, unique within a session.
    pub ticket: u64,
    /// Raw query text.
    pub text: String,
    /// When the query was submitted.
    pub submitted_at: DateTime<Utc>,
}

impl PendingQuery {
    /// Create a pending query stamped with the current time.
    #[must_use]
    pub fn new(ticket: u64, text: impl Into<String>) -> Self {
        Self {
            ticket,
            text: text.into(),
            submitted_at: Utc::now(),
        }
    }
}

/// Metadata of the most recent backend payload.
///
/// Updated from every poll and submit response, whether or not the answer
/// text was new. Last write wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatestMetadata {
    /// Answer text of the latest payload.
    pub answer: String,
    /// Answering agent.
    pub agent_name: Option<String>,
    /// Agent status.
    pub status: Option<String>,
    /// Correlation ID.
    pub uid: Option<String>,
    /// Whether the backend reported completion.
    pub done: Option<bool>,
    /// Whether the agent reported success.
    pub success: Option<bool>,
    /// Tool-result blocks, retained until a payload brings new ones.
    pub blocks: Option<serde_json::Value>,
}

impl LatestMetadata {
    /// Merge a payload into the record.
    pub fn merge(&mut self, payload: &AnswerPayload) {
        self.answer.clone_from(&payload.answer);
        self.agent_name.clone_from(&payload.agent_name);
        self.status.clone_from(&payload.status);
        self.uid.clone_from(&payload.uid);
        self.done = payload.done;
        self.success = payload.success;
        if payload.blocks.is_some() {
            self.blocks.clone_from(&payload.blocks);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_overwrites_fields() {
        let mut metadata = LatestMetadata::default();
        metadata.merge(&AnswerPayload::with_answer("a").status("working").uid("1"));
        metadata.merge(&AnswerPayload::with_answer("").status("done"));

        assert_eq!(metadata.answer, "");
        assert_eq!(metadata.status.as_deref(), Some("done"));
        assert_eq!(metadata.uid, None);
    }

    #[test]
    fn merge_keeps_blocks_until_replaced() {
        let mut metadata = LatestMetadata::default();
        let mut with_blocks = AnswerPayload::with_answer("a");
        with_blocks.blocks = Some(json!({"0": {"tool_type": "bash"}}));

        metadata.merge(&with_blocks);
        metadata.merge(&AnswerPayload::with_answer("b"));
        assert_eq!(metadata.blocks, Some(json!({"0": {"tool_type": "bash"}})));

        let mut empty_blocks = AnswerPayload::with_answer("c");
        empty_blocks.blocks = Some(json!({}));
        metadata.merge(&empty_blocks);
        assert_eq!(metadata.blocks, Some(json!({})));
    }

    #[test]
    fn default_status_is_offline_and_idle() {
        let status = SyncStatus::default();
        assert!(!status.is_online);
        assert!(!status.is_busy);
        assert!(status.last_error.is_none());
    }
}
