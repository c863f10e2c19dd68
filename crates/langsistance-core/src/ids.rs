//! Identifier types for conversation entries.
//!
//! Messages are addressed by their append position, which never changes
//! because the conversation is append-only. Normalized answers are keyed
//! by a blake3 digest so duplicate detection does not scan history.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::normalize::normalize;

/// Stable identifier of a message within one conversation.
///
/// The value is the message's position in the append-only history.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(u64);

impl MessageId {
    /// Create a `MessageId` from its raw position.
    #[must_use]
    pub const fn new(position: u64) -> Self {
        Self(position)
    }

    /// Return the raw position.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Return the position as a slice index.
    #[must_use]
    pub fn index(self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }
}

impl fmt::Debug for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageId({})", self.0)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for MessageId {
    fn from(position: u64) -> Self {
        Self(position)
    }
}

/// A 32-byte blake3 digest of a normalized answer, hex-encoded for display.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnswerDigest([u8; 32]);

impl AnswerDigest {
    /// Digest the normalized form of `answer`.
    ///
    /// Two answers that differ only in case, surrounding or repeated
    /// whitespace, or the characters `. , ! ?` produce the same digest.
    #[must_use]
    pub fn of_answer(answer: &str) -> Self {
        Self::of_normalized(&normalize(answer))
    }

    /// Digest text that is already normalized.
    #[must_use]
    pub fn of_normalized(normalized: &str) -> Self {
        Self(*blake3::hash(normalized.as_bytes()).as_bytes())
    }

    /// Return the hex-encoded string representation.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for AnswerDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnswerDigest({})", self.to_hex())
    }
}

impl fmt::Display for AnswerDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form is enough to correlate log lines.
        write!(f, "{}", &self.to_hex()[..12])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_id_display_and_index() {
        let id = MessageId::new(7);
        assert_eq!(id.to_string(), "#7");
        assert_eq!(id.index(), Some(7));
        assert_eq!(MessageId::from(7), id);
    }

    #[test]
    fn message_id_serde_is_transparent() {
        let json = serde_json::to_string(&MessageId::new(3)).unwrap();
        assert_eq!(json, "3");
        let parsed: MessageId = serde_json::from_str("3").unwrap();
        assert_eq!(parsed, MessageId::new(3));
    }

    #[test]
    fn digest_ignores_formatting_noise() {
        assert_eq!(
            AnswerDigest::of_answer("Hello, World!!"),
            AnswerDigest::of_answer("  hello   world ")
        );
        assert_ne!(
            AnswerDigest::of_answer("hello world"),
            AnswerDigest::of_answer("hello there")
        );
    }

    #[test]
    fn digest_display_is_short_hex() {
        let digest = AnswerDigest::of_answer("paris");
        assert_eq!(digest.to_hex().len(), 64);
        assert_eq!(digest.to_string().len(), 12);
        assert!(digest.to_hex().starts_with(&digest.to_string()));
    }
}
