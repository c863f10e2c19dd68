//! Error types for backend communication.
//!
//! None of these errors escape the synchronization core: probes degrade to
//! offline, polls are skipped and failed submits become error messages.
//! They are surfaced by [`AgentBackend`](crate::AgentBackend) so callers
//! using the client directly can react to them.

use thiserror::Error;

/// A result type using `BackendError`.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Errors that can occur talking to the agent backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The request could not be sent or the connection failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body, or a generic description.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl BackendError {
    /// Returns the HTTP status code, if the backend answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            Self::Parse(_) | Self::Client(_) => None,
        }
    }

    /// Returns true if the backend is already generating an answer (429).
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.status() == Some(429)
    }

    /// Returns true if the backend has no agent or answer yet (404).
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16) -> BackendError {
        BackendError::Api {
            status,
            message: "test".to_string(),
        }
    }

    #[test]
    fn status_helpers() {
        assert!(api(429).is_busy());
        assert!(api(404).is_not_found());
        assert!(!api(400).is_busy());
        assert_eq!(BackendError::Parse("bad".into()).status(), None);
    }

    #[test]
    fn display() {
        assert_eq!(api(404).to_string(), "API error (404): test");
    }
}
