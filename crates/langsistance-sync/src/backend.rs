//! HTTP client for the agent backend.
//!
//! This module provides the `AgentBackend` trait used by the prober, poller
//! and query controller, and `HttpBackend`, its reqwest implementation.

use async_trait::async_trait;
use serde::Deserialize;

use langsistance_core::{AnswerPayload, QueryRequest};

use crate::config::SyncConfig;
use crate::error::{BackendError, Result};

/// Trait for agent backend communication.
///
/// This trait abstracts the backend interface, allowing for scripted
/// implementations in tests.
#[async_trait]
pub trait AgentBackend: Send + Sync {
    /// Check backend liveness. Any success status means online.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the status is not a success.
    async fn health(&self) -> Result<()>;

    /// Fetch the most recently computed answer.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the backend has no answer yet
    /// (404), or the body cannot be decoded.
    async fn latest_answer(&self) -> Result<AnswerPayload>;

    /// Submit a query and wait for the backend's answer.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects the
    /// query (429 while busy, 400 when the agent fails).
    async fn query(&self, request: &QueryRequest) -> Result<AnswerPayload>;

    /// Ask the backend to stop the current computation.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the status is not a success.
    async fn stop(&self) -> Result<()>;
}

/// Error body sent by the backend.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// HTTP client for the agent backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a backend client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Client`] if the HTTP client cannot be built.
    pub fn new(config: &SyncConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| BackendError::Client(e.to_string()))?;

        Ok(Self::with_client(client, config.base_url()))
    }

    /// Create a backend client with a custom reqwest client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Get the base URL of the backend.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Turn a non-success response into an error.
    async fn api_error(response: reqwest::Response) -> BackendError {
        let status = response.status();
        let message = response
            .json::<ErrorResponse>()
            .await
            .map(|e| e.error)
            .unwrap_or_else(|_| format!("backend returned status {status}"));

        BackendError::Api {
            status: status.as_u16(),
            message,
        }
    }

    async fn decode(response: reqwest::Response) -> Result<AnswerPayload> {
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        response
            .json::<AnswerPayload>()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))
    }
}

#[async_trait]
impl AgentBackend for HttpBackend {
    async fn health(&self) -> Result<()> {
        let response = self.client.get(self.url("/health")).send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::api_error(response).await)
        }
    }

    async fn latest_answer(&self) -> Result<AnswerPayload> {
        let response = self.client.get(self.url("/latest_answer")).send().await?;
        Self::decode(response).await
    }

    async fn query(&self, request: &QueryRequest) -> Result<AnswerPayload> {
        let response = self
            .client
            .post(self.url("/query"))
            .json(request)
            .send()
            .await?;

        let payload = Self::decode(response).await?;
        tracing::debug!(uid = ?payload.uid, "Query answered");
        Ok(payload)
    }

    async fn stop(&self) -> Result<()> {
        let response = self.client.get(self.url("/stop")).send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::api_error(response).await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_backend_creation() {
        let backend = HttpBackend::new(&SyncConfig::new("http://localhost:8000/")).unwrap();
        assert_eq!(backend.base_url(), "http://localhost:8000");
        assert_eq!(backend.url("/health"), "http://localhost:8000/health");
    }

    #[test]
    fn custom_client() {
        let backend = HttpBackend::with_client(reqwest::Client::new(), "http://backend:9000");
        assert_eq!(backend.url("/stop"), "http://backend:9000/stop");
    }
}
