//! Core types and utilities for langsistance.
//!
//! This crate provides the I/O-free building blocks of the live-answer
//! synchronization client:
//!
//! - **Identifiers**: stable message IDs and normalized-answer digests
//! - **Normalization**: canonical form of answer text used for equality
//! - **Messages and payloads**: conversation entries and backend wire types
//! - **Conversation**: the append-only chat history with duplicate detection
//! - **Status**: online/busy flags and the latest backend metadata
//!
//! # Example
//!
//! ```
//! use langsistance_core::{AnswerPayload, AppendOutcome, Conversation};
//!
//! let mut conversation = Conversation::default();
//! let payload = AnswerPayload::with_answer("Paris is the capital.");
//!
//! assert!(matches!(conversation.append_answer(&payload), AppendOutcome::Appended(_)));
//! assert!(matches!(conversation.append_answer(&payload), AppendOutcome::Duplicate(_)));
//! assert_eq!(conversation.len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod conversation;
pub mod error;
pub mod ids;
pub mod message;
pub mod normalize;
pub mod payload;
pub mod status;

pub use conversation::{AppendOutcome, Conversation, DEFAULT_STATUS};
pub use error::{CoreError, Result};
pub use ids::{AnswerDigest, MessageId};
pub use message::{Message, MessageKind};
pub use normalize::normalize;
pub use payload::{AnswerPayload, QueryRequest};
pub use status::{LatestMetadata, PendingQuery, SyncStatus};
