//! Common error types for langsistance.

use crate::ids::MessageId;
use thiserror::Error;

/// A result type using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised by conversation operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// No message with the given ID exists in the conversation.
    #[error("unknown message: {0}")]
    UnknownMessage(MessageId),
}
