//! Append-only conversation history.
//!
//! The conversation owns the ordered messages, the last known agent status
//! and the set of messages whose reasoning panel is expanded. It also keeps
//! an index from normalized answer digests to the agent message that first
//! carried them, so no two agent messages ever share a normalized answer.

use std::collections::{HashMap, HashSet};

use crate::error::{CoreError, Result};
use crate::ids::{AnswerDigest, MessageId};
use crate::message::Message;
use crate::payload::AnswerPayload;

/// Status shown before any agent has answered.
pub const DEFAULT_STATUS: &str = "Agents ready";

/// Result of offering an agent answer to the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The answer was new and has been appended.
    Appended(MessageId),
    /// An agent message with the same normalized answer already exists.
    Duplicate(MessageId),
    /// The answer was empty or whitespace-only.
    Empty,
}

/// Ordered chat history plus per-message view state.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
    answers: HashMap<AnswerDigest, MessageId>,
    status: String,
    expanded: HashSet<MessageId>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new(DEFAULT_STATUS)
    }
}

impl Conversation {
    /// Create an empty conversation with the given initial status.
    #[must_use]
    pub fn new(initial_status: impl Into<String>) -> Self {
        Self {
            messages: Vec::new(),
            answers: HashMap::new(),
            status: initial_status.into(),
            expanded: HashSet::new(),
        }
    }

    fn next_id(&self) -> MessageId {
        MessageId::new(self.messages.len() as u64)
    }

    /// Append a user message.
    pub fn push_user(&mut self, content: impl Into<String>) -> MessageId {
        let id = self.next_id();
        self.messages.push(Message::user(id, content));
        id
    }

    /// Append an error message.
    pub fn push_error(&mut self, content: impl Into<String>) -> MessageId {
        let id = self.next_id();
        self.messages.push(Message::error(id, content));
        id
    }

    /// Offer an agent answer.
    ///
    /// Empty answers and answers whose normalized form matches an existing
    /// agent message are ignored. A new answer is appended and the status
    /// is replaced with the payload's status, if it has one.
    pub fn append_answer(&mut self, payload: &AnswerPayload) -> AppendOutcome {
        if !payload.has_answer() {
            return AppendOutcome::Empty;
        }

        let digest = AnswerDigest::of_answer(&payload.answer);
        if let Some(existing) = self.answers.get(&digest) {
            return AppendOutcome::Duplicate(*existing);
        }

        let id = self.next_id();
        self.messages.push(Message::agent(id, payload));
        self.answers.insert(digest, id);
        if let Some(status) = &payload.status {
            self.status.clone_from(status);
        }

        AppendOutcome::Appended(id)
    }

    /// All messages in append order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Look up a message by ID.
    #[must_use]
    pub fn get(&self, id: MessageId) -> Option<&Message> {
        id.index().and_then(|i| self.messages.get(i))
    }

    /// Number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if nothing has been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Last known agent status.
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Replace the displayed status.
    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// Flip the reasoning panel of a message and return the new state.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownMessage`] if no message has this ID.
    pub fn toggle_reasoning(&mut self, id: MessageId) -> Result<bool> {
        if self.get(id).is_none() {
            return Err(CoreError::UnknownMessage(id));
        }

        if self.expanded.remove(&id) {
            Ok(false)
        } else {
            self.expanded.insert(id);
            Ok(true)
        }
    }

    /// Returns true if the reasoning panel of `id` is expanded.
    #[must_use]
    pub fn is_reasoning_expanded(&self, id: MessageId) -> bool {
        self.expanded.contains(&id)
    }
}
