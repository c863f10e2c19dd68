//! Backend wire types.
//!
//! These types mirror the JSON bodies of the agent backend's
//! `/latest_answer` and `/query` endpoints.

use serde::{Deserialize, Deserializer, Serialize};

/// Answer payload returned by `/latest_answer` and `/query`.
///
/// Every field except `answer` is optional on the wire. `blocks` carries
/// tool-result blocks that this crate treats as opaque JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerPayload {
    /// Answer text. Missing or `null` decodes as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub answer: String,
    /// Reasoning that produced the answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    /// Name of the agent that answered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    /// Human-readable agent status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Correlation ID of the backend computation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    /// Opaque tool-result blocks keyed by position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocks: Option<serde_json::Value>,
    /// Whether the backend finished computing this answer.
    #[serde(default, deserialize_with = "lenient_flag", skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
    /// Whether the agent reported success.
    #[serde(default, deserialize_with = "lenient_flag", skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
}

impl AnswerPayload {
    /// Create a payload carrying only answer text.
    #[must_use]
    pub fn with_answer(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            ..Self::default()
        }
    }

    /// Set the status text.
    #[must_use]
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Set the reasoning text.
    #[must_use]
    pub fn reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }

    /// Set the agent name.
    #[must_use]
    pub fn agent_name(mut self, agent_name: impl Into<String>) -> Self {
        self.agent_name = Some(agent_name.into());
        self
    }

    /// Set the correlation ID.
    #[must_use]
    pub fn uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    /// Returns true if the answer contains anything besides whitespace.
    #[must_use]
    pub fn has_answer(&self) -> bool {
        !self.answer.trim().is_empty()
    }
}

/// Request body for `POST /query`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Raw query text as typed by the user.
    pub query: String,
    /// Whether the backend should speak the answer.
    pub tts_enabled: bool,
}

impl QueryRequest {
    /// Create a query request.
    #[must_use]
    pub fn new(query: impl Into<String>, tts_enabled: bool) -> Self {
        Self {
            query: query.into(),
            tts_enabled,
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// The backend stringifies booleans ("true", "False", ...).
#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Text(String),
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let flag = Option::<Flag>::deserialize(deserializer)?;
    Ok(match flag {
        None => None,
        Some(Flag::Bool(value)) => Some(value),
        Some(Flag::Text(text)) => match text.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
    })
}
