//! Live-answer synchronization for the langsistance chat client.
//!
//! This crate keeps a local conversation in step with an agent backend that
//! computes answers remotely. It polls the backend's latest answer, appends
//! each distinct answer exactly once, tracks backend liveness, and submits
//! user queries with optimistic local echo.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        SyncSession                          │
//! │        start() ── fixed-period tick ── shutdown()           │
//! │  ┌─────────────┐ ┌──────────────────┐ ┌─────────────────┐   │
//! │  │   Health    │ │  Latest-Answer   │ │     Query       │   │
//! │  │   Prober    │ │     Poller       │ │   Controller    │   │
//! │  └─────────────┘ └──────────────────┘ └─────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//!          │                  │                    │
//!          ▼                  ▼                    ▼
//!   ┌──────────────┐   ┌──────────────────────────────────┐
//!   │ AgentBackend │   │  SessionState (conversation,     │
//!   │ (HTTP)       │   │  metadata, flags, events)        │
//!   └──────────────┘   └──────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use langsistance_sync::{HttpBackend, SyncConfig, SyncSession};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SyncConfig::from_env();
//! let backend = HttpBackend::new(&config)?;
//! let mut session = SyncSession::new(backend, config);
//!
//! session.start();
//! session.submit("What is the capital of France?").await;
//!
//! for message in session.state().messages() {
//!     println!("{:?}: {}", message.kind, message.content);
//! }
//!
//! session.shutdown().await;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod backend;
pub mod config;
pub mod error;
pub mod events;
pub mod poller;
pub mod prober;
pub mod session;
pub mod state;
pub mod submit;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use backend::{AgentBackend, HttpBackend};
pub use config::SyncConfig;
pub use error::{BackendError, Result};
pub use events::SyncEvent;
pub use poller::{LatestAnswerPoller, PollResult};
pub use prober::{Health, HealthProber};
pub use session::{DriverState, SyncSession};
pub use state::SessionState;
pub use submit::{
    QueryController, SubmitOutcome, STOP_REQUESTED_STATUS, SUBMIT_FAILURE_ERROR,
    SUBMIT_FAILURE_MESSAGE,
};

// Re-export commonly used types from core for convenience
pub use langsistance_core::{
    AnswerPayload, Conversation, Message, MessageId, MessageKind, QueryRequest, SyncStatus,
};
