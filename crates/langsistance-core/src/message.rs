//! Conversation entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::MessageId;
use crate::payload::AnswerPayload;

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Typed by the user.
    User,
    /// Produced by the backend's agent.
    Agent,
    /// Local failure notice.
    Error,
}

impl MessageKind {
    /// Human-readable display string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Agent => "agent",
            Self::Error => "error",
        }
    }
}

/// A single conversation entry.
///
/// Messages are created by the conversation when appended and are never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Position in the conversation.
    pub id: MessageId,
    /// Who produced the message.
    pub kind: MessageKind,
    /// Display text.
    pub content: String,
    /// Agent reasoning, shown in an expandable panel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    /// Name of the answering agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    /// Agent status at the time the answer arrived.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Backend correlation ID (`uid`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    /// When the message was appended locally.
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub(crate) fn user(id: MessageId, content: impl Into<String>) -> Self {
        Self::plain(id, MessageKind::User, content.into())
    }

    pub(crate) fn error(id: MessageId, content: impl Into<String>) -> Self {
        Self::plain(id, MessageKind::Error, content.into())
    }

    pub(crate) fn agent(id: MessageId, payload: &AnswerPayload) -> Self {
        Self {
            id,
            kind: MessageKind::Agent,
            content: payload.answer.clone(),
            reasoning: payload.reasoning.clone(),
            agent_name: payload.agent_name.clone(),
            status: payload.status.clone(),
            correlation_id: payload.uid.clone(),
            created_at: Utc::now(),
        }
    }

    fn plain(id: MessageId, kind: MessageKind, content: String) -> Self {
        Self {
            id,
            kind,
            content,
            reasoning: None,
            agent_name: None,
            status: None,
            correlation_id: None,
            created_at: Utc::now(),
        }
    }

    /// Check if this is an agent message.
    #[must_use]
    pub fn is_agent(&self) -> bool {
        self.kind == MessageKind::Agent
    }

    /// Returns true if the message has non-empty reasoning to show.
    #[must_use]
    pub fn has_reasoning(&self) -> bool {
        self.reasoning
            .as_deref()
            .is_some_and(|reasoning| !reasoning.trim().is_empty())
    }
}
