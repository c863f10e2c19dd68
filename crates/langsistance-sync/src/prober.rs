//! Backend liveness probing.

use std::sync::Arc;

use crate::backend::AgentBackend;
use crate::state::SessionState;

/// Result of a health probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    /// The liveness endpoint answered with a success status.
    Online,
    /// The probe failed for any reason.
    Offline,
}

impl Health {
    /// Returns true for [`Health::Online`].
    #[must_use]
    pub const fn is_online(self) -> bool {
        matches!(self, Self::Online)
    }
}

/// Checks backend liveness and records it in the session's online flag.
///
/// Each probe is an independent attempt; there is no retry or backoff.
pub struct HealthProber<B: ?Sized> {
    backend: Arc<B>,
    state: Arc<SessionState>,
}

impl<B: ?Sized> Clone for HealthProber<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            state: Arc::clone(&self.state),
        }
    }
}

impl<B: AgentBackend + ?Sized> HealthProber<B> {
    /// Create a prober for `backend` that updates `state`.
    #[must_use]
    pub fn new(backend: Arc<B>, state: Arc<SessionState>) -> Self {
        Self { backend, state }
    }

    /// Probe the backend once. Failures degrade to [`Health::Offline`].
    pub async fn probe(&self) -> Health {
        let health = match self.backend.health().await {
            Ok(()) => Health::Online,
            Err(e) => {
                tracing::debug!(error = %e, "Health probe failed");
                Health::Offline
            }
        };

        let online = health.is_online();
        if self.state.set_online(online) {
            tracing::info!(online, "Backend connectivity changed");
        }
        health
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedBackend;

    fn prober(backend: &Arc<ScriptedBackend>) -> (HealthProber<ScriptedBackend>, Arc<SessionState>) {
        let state = Arc::new(SessionState::default());
        (HealthProber::new(Arc::clone(backend), Arc::clone(&state)), state)
    }

    #[tokio::test]
    async fn reachable_backend_is_online() {
        let backend = Arc::new(ScriptedBackend::new());
        let (prober, state) = prober(&backend);

        assert_eq!(prober.probe().await, Health::Online);
        assert!(state.sync_status().is_online);
        assert_eq!(backend.health_calls(), 1);
    }

    #[tokio::test]
    async fn failure_degrades_to_offline() {
        let backend = Arc::new(ScriptedBackend::new());
        let (prober, state) = prober(&backend);
        prober.probe().await;

        backend.set_online(false);

        assert_eq!(prober.probe().await, Health::Offline);
        assert!(!state.sync_status().is_online);
    }

    #[tokio::test]
    async fn probe_leaves_conversation_alone() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.set_online(false);
        let (prober, state) = prober(&backend);

        prober.probe().await;

        assert!(state.messages().is_empty());
        assert!(state.sync_status().last_error.is_none());
    }
}
