//! Synchronization configuration.
//!
//! Settings can be deserialized, overlaid from `LANGSISTANCE_*`
//! environment variables, or built in code.

use std::time::Duration;

use serde::Deserialize;

use langsistance_core::DEFAULT_STATUS;

/// Environment variable holding the backend base URL.
pub const ENV_BACKEND_URL: &str = "LANGSISTANCE_BACKEND_URL";
/// Environment variable holding the poll interval in milliseconds.
pub const ENV_POLL_INTERVAL_MS: &str = "LANGSISTANCE_POLL_INTERVAL_MS";
/// Environment variable holding the request timeout in seconds.
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "LANGSISTANCE_REQUEST_TIMEOUT_SECS";
/// Environment variable enabling text to speech on submitted queries.
pub const ENV_TTS_ENABLED: &str = "LANGSISTANCE_TTS_ENABLED";

/// Configuration for a synchronization session.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Base URL of the agent backend (e.g., "http://localhost:8000").
    #[serde(default = "SyncConfig::default_backend_url")]
    pub backend_url: String,

    /// Period between probe/poll ticks in milliseconds.
    #[serde(default = "SyncConfig::default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Whole-request timeout in seconds.
    #[serde(default = "SyncConfig::default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Connection timeout in seconds.
    #[serde(default = "SyncConfig::default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Ask the backend to speak answers to submitted queries.
    #[serde(default)]
    pub tts_enabled: bool,

    /// Status shown before any agent has answered.
    #[serde(default = "SyncConfig::default_initial_status")]
    pub initial_status: String,

    /// Capacity of the session event channel.
    #[serde(default = "SyncConfig::default_event_capacity")]
    pub event_capacity: usize,
}

impl SyncConfig {
    fn default_backend_url() -> String {
        "http://localhost:8000".to_string()
    }

    const fn default_poll_interval() -> u64 {
        3_000
    }

    const fn default_request_timeout() -> u64 {
        30
    }

    const fn default_connect_timeout() -> u64 {
        5
    }

    fn default_initial_status() -> String {
        DEFAULT_STATUS.to_string()
    }

    const fn default_event_capacity() -> usize {
        256
    }

    /// Create a configuration for the given backend with default settings.
    #[must_use]
    pub fn new(backend_url: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into(),
            ..Self::default()
        }
    }

    /// Load defaults overlaid with `LANGSISTANCE_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env(|key| std::env::var(key).ok())
    }

    /// Overlay values from an environment lookup.
    ///
    /// Malformed numeric or boolean values are ignored with a warning.
    #[must_use]
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BACKEND_URL) {
            self.backend_url = url;
        }
        if let Some(value) = parse_var(&lookup, ENV_POLL_INTERVAL_MS) {
            self.poll_interval_ms = value;
        }
        if let Some(value) = parse_var(&lookup, ENV_REQUEST_TIMEOUT_SECS) {
            self.request_timeout_secs = value;
        }
        if let Some(value) = parse_var(&lookup, ENV_TTS_ENABLED) {
            self.tts_enabled = value;
        }
        self
    }

    /// Set the poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Backend URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.backend_url.trim_end_matches('/')
    }

    /// Get the poll interval as a `Duration`, never shorter than 1 ms.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Get the request timeout as a `Duration`.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Get the connection timeout as a `Duration`.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            backend_url: Self::default_backend_url(),
            poll_interval_ms: Self::default_poll_interval(),
            request_timeout_secs: Self::default_request_timeout(),
            connect_timeout_secs: Self::default_connect_timeout(),
            tts_enabled: false,
            initial_status: Self::default_initial_status(),
            event_capacity: Self::default_event_capacity(),
        }
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring malformed environment value");
            None
        }
    }
}
