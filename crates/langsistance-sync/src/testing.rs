//! In-memory backend for tests.
//!
//! `ScriptedBackend` answers from values set by the test and counts calls,
//! so components can be exercised without a network.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use langsistance_core::{AnswerPayload, QueryRequest};

use crate::backend::AgentBackend;
use crate::error::{BackendError, Result};

/// A backend whose responses are scripted by the test.
///
/// Defaults: online, no latest answer (404), queries fail (500), stop
/// succeeds.
#[derive(Debug)]
pub struct ScriptedBackend {
    online: AtomicBool,
    hang_health: AtomicBool,
    stop_ok: AtomicBool,
    latest: Mutex<Option<AnswerPayload>>,
    query_reply: Mutex<Option<AnswerPayload>>,
    queries: Mutex<Vec<QueryRequest>>,
    query_gate: Mutex<Option<Arc<Notify>>>,
    query_entered: Notify,
    health_calls: AtomicUsize,
    latest_calls: AtomicUsize,
    query_calls: AtomicUsize,
    stop_calls: AtomicUsize,
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedBackend {
    /// Create a backend with default behaviour.
    #[must_use]
    pub fn new() -> Self {
        Self {
            online: AtomicBool::new(true),
            hang_health: AtomicBool::new(false),
            stop_ok: AtomicBool::new(true),
            latest: Mutex::new(None),
            query_reply: Mutex::new(None),
            queries: Mutex::new(Vec::new()),
            query_gate: Mutex::new(None),
            query_entered: Notify::new(),
            health_calls: AtomicUsize::new(0),
            latest_calls: AtomicUsize::new(0),
            query_calls: AtomicUsize::new(0),
            stop_calls: AtomicUsize::new(0),
        }
    }

    /// Make health probes succeed or fail.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Make health probes never complete.
    pub fn set_hang_health(&self, hang: bool) {
        self.hang_health.store(hang, Ordering::SeqCst);
    }

    /// Make stop requests succeed or fail.
    pub fn set_stop_ok(&self, ok: bool) {
        self.stop_ok.store(ok, Ordering::SeqCst);
    }

    /// Set the latest answer; `None` answers 404.
    pub fn set_latest(&self, payload: Option<AnswerPayload>) {
        *self.latest.lock() = payload;
    }

    /// Set the query reply; `None` answers 500.
    pub fn set_query_reply(&self, payload: Option<AnswerPayload>) {
        *self.query_reply.lock() = payload;
    }

    /// Hold queries until the returned gate is notified, once per query.
    pub fn gate_queries(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.query_gate.lock() = Some(Arc::clone(&gate));
        gate
    }

    /// Wait until a query has reached the backend.
    pub async fn query_started(&self) {
        self.query_entered.notified().await;
    }

    /// Queries received so far.
    #[must_use]
    pub fn queries(&self) -> Vec<QueryRequest> {
        self.queries.lock().clone()
    }

    /// Number of health probes received.
    #[must_use]
    pub fn health_calls(&self) -> usize {
        self.health_calls.load(Ordering::SeqCst)
    }

    /// Number of latest-answer fetches received.
    #[must_use]
    pub fn latest_calls(&self) -> usize {
        self.latest_calls.load(Ordering::SeqCst)
    }

    /// Number of queries received.
    #[must_use]
    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }

    /// Number of stop requests received.
    #[must_use]
    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    fn api(status: u16, message: &str) -> BackendError {
        BackendError::Api {
            status,
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl AgentBackend for ScriptedBackend {
    async fn health(&self) -> Result<()> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        if self.hang_health.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Self::api(503, "unreachable"))
        }
    }

    async fn latest_answer(&self) -> Result<AnswerPayload> {
        self.latest_calls.fetch_add(1, Ordering::SeqCst);
        self.latest
            .lock()
            .clone()
            .ok_or_else(|| Self::api(404, "No answer available"))
    }

    async fn query(&self, request: &QueryRequest) -> Result<AnswerPayload> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().push(request.clone());
        self.query_entered.notify_one();

        let gate = self.query_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.query_reply
            .lock()
            .clone()
            .ok_or_else(|| Self::api(500, "agent failed"))
    }

    async fn stop(&self) -> Result<()> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        if self.stop_ok.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Self::api(500, "stop failed"))
        }
    }
}
