//! The sync loop driver.
//!
//! A `SyncSession` owns the shared state and the components that mutate it.
//! While active, a background task probes backend health and then polls for
//! the latest answer once per fixed period. The task is owned by the
//! session: `shutdown()` cancels it deterministically and dropping an active
//! session aborts it, so no recurring task outlives its session.

use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use langsistance_core::Conversation;

use crate::backend::AgentBackend;
use crate::config::SyncConfig;
use crate::poller::{LatestAnswerPoller, PollResult};
use crate::prober::{Health, HealthProber};
use crate::state::SessionState;
use crate::submit::{QueryController, SubmitOutcome};

/// Lifecycle state of the sync loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// No timer registered.
    Idle,
    /// Timer registered and firing.
    Active,
}

/// Handle on the running loop task.
struct LoopHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// A live-answer synchronization session against one backend.
pub struct SyncSession<B: AgentBackend + ?Sized + 'static> {
    config: SyncConfig,
    state: Arc<SessionState>,
    prober: HealthProber<B>,
    poller: LatestAnswerPoller<B>,
    controller: QueryController<B>,
    driver: Option<LoopHandle>,
}

impl<B: AgentBackend + 'static> SyncSession<B> {
    /// Create an idle session that owns `backend`.
    #[must_use]
    pub fn new(backend: B, config: SyncConfig) -> Self {
        Self::with_shared_backend(Arc::new(backend), config)
    }
}

impl<B: AgentBackend + ?Sized + 'static> SyncSession<B> {
    /// Create an idle session around a shared backend.
    #[must_use]
    pub fn with_shared_backend(backend: Arc<B>, config: SyncConfig) -> Self {
        let conversation = Conversation::new(config.initial_status.clone());
        let state = Arc::new(SessionState::new(conversation, config.event_capacity));

        Self {
            prober: HealthProber::new(Arc::clone(&backend), Arc::clone(&state)),
            poller: LatestAnswerPoller::new(Arc::clone(&backend), Arc::clone(&state)),
            controller: QueryController::new(backend, Arc::clone(&state), config.tts_enabled),
            config,
            state,
            driver: None,
        }
    }

    /// Shared session state.
    #[must_use]
    pub fn state(&self) -> &Arc<SessionState> {
        &self.state
    }

    /// Session configuration.
    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// A controller handle for submitting queries from other tasks.
    #[must_use]
    pub fn controller(&self) -> QueryController<B> {
        self.controller.clone()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn driver_state(&self) -> DriverState {
        match &self.driver {
            Some(handle) if !handle.task.is_finished() => DriverState::Active,
            _ => DriverState::Idle,
        }
    }

    /// Start the sync loop. Returns false if it was already running.
    ///
    /// The first tick fires one full period after this call.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn start(&mut self) -> bool {
        if self.driver_state() == DriverState::Active {
            tracing::debug!("Sync loop already running");
            return false;
        }

        let period = self.config.poll_interval();
        let (shutdown, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(run_loop(
            self.prober.clone(),
            self.poller.clone(),
            period,
            shutdown_rx,
        ));

        tracing::info!(
            backend = %self.config.base_url(),
            period = ?period,
            "Sync loop started"
        );
        self.driver = Some(LoopHandle { shutdown, task });
        true
    }

    /// Stop the sync loop and wait for its task to end.
    ///
    /// A tick in progress is abandoned. Does nothing if the loop is idle.
    pub async fn shutdown(&mut self) {
        let Some(handle) = self.driver.take() else {
            return;
        };

        // The loop may already have exited; a closed channel is fine.
        let _ = handle.shutdown.send(());
        if let Err(e) = handle.task.await {
            if e.is_panic() {
                tracing::error!(error = %e, "Sync loop panicked");
            }
        }
        tracing::info!("Sync loop stopped");
    }

    /// Run one probe-then-poll cycle on the caller's task.
    pub async fn tick(&self) -> (Health, PollResult) {
        run_tick(&self.prober, &self.poller).await
    }

    /// Submit a query; see [`QueryController::submit`].
    pub async fn submit(&self, query: &str) -> SubmitOutcome {
        self.controller.submit(query).await
    }

    /// Ask the backend to stop; see [`QueryController::stop`].
    pub async fn request_stop(&self) {
        self.controller.stop().await;
    }
}

impl<B: AgentBackend + ?Sized + 'static> Drop for SyncSession<B> {
    fn drop(&mut self) {
        if let Some(handle) = self.driver.take() {
            handle.task.abort();
        }
    }
}

async fn run_tick<B: AgentBackend + ?Sized>(
    prober: &HealthProber<B>,
    poller: &LatestAnswerPoller<B>,
) -> (Health, PollResult) {
    let health = prober.probe().await;
    let poll = poller.poll_once().await;
    (health, poll)
}

async fn run_loop<B: AgentBackend + ?Sized>(
    prober: HealthProber<B>,
    poller: LatestAnswerPoller<B>,
    period: std::time::Duration,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    // A slow tick delays the next one instead of causing a burst.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            _ = ticker.tick() => {}
        }

        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            _ = run_tick(&prober, &poller) => {}
        }
    }

    tracing::debug!("Sync loop exiting");
}
