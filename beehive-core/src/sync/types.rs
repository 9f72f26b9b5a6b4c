use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Identifies what a poll session is watching (a counterparty id, a user's gallery, a
/// fixed channel such as the notification feed).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceKey(String);

impl ResourceKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_valid(&self) -> bool {
        !self.0.trim().is_empty()
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for ResourceKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("resource key is empty")]
    InvalidKey,

    #[error("transport failure{}: {message}", status_suffix(.status))]
    Transport {
        status: Option<u16>,
        message: String,
    },

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("could not decode response: {0}")]
    Decode(String),
}

pub(crate) fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default()
}

impl FetchError {
    pub fn transport(status: Option<u16>, message: impl Into<String>) -> Self {
        FetchError::Transport {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Transport { status, .. } => *status,
            _ => None,
        }
    }

    /// Worth retrying on the next tick: timeouts, connection failures and 5xx.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Timeout(_) => true,
            FetchError::Transport { status, .. } => status.map_or(true, |s| s >= 500),
            FetchError::InvalidKey | FetchError::Decode(_) => false,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Transport {
                status: err.status().map(|s| s.as_u16()),
                message: err.to_string(),
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollState {
    Idle,
    Polling,
    Success,
    Failed,
    Suspended,
}

impl fmt::Display for PollState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollState::Idle => write!(f, "idle"),
            PollState::Polling => write!(f, "polling"),
            PollState::Success => write!(f, "success"),
            PollState::Failed => write!(f, "failed"),
            PollState::Suspended => write!(f, "suspended"),
        }
    }
}

/// Observable state of the current poll session.
#[derive(Debug, Clone, PartialEq)]
pub struct PollStatus {
    pub generation: u64,
    pub key: Option<ResourceKey>,
    pub state: PollState,
    pub in_flight: bool,
    pub last_success: Option<DateTime<Utc>>,
    pub last_error: Option<FetchError>,
    pub consecutive_failures: u32,
    pub fetch_count: u64,
    pub skipped_ticks: u64,
}

impl PollStatus {
    pub fn suspended(generation: u64, key: Option<ResourceKey>) -> Self {
        Self {
            generation,
            key,
            state: PollState::Suspended,
            in_flight: false,
            last_success: None,
            last_error: None,
            consecutive_failures: 0,
            fetch_count: 0,
            skipped_ticks: 0,
        }
    }

    pub fn started(generation: u64, key: ResourceKey) -> Self {
        Self {
            state: PollState::Idle,
            ..Self::suspended(generation, Some(key))
        }
    }

    pub fn is_running(&self) -> bool {
        self.state != PollState::Suspended
    }

    /// Data is on screen but the last attempt to refresh it failed.
    pub fn is_stale(&self) -> bool {
        self.last_success.is_some() && self.consecutive_failures > 0
    }

    pub(crate) fn record_issue(&mut self) {
        self.in_flight = true;
        self.state = PollState::Polling;
        self.fetch_count += 1;
    }

    /// How the most recent completed fetch went: `Success`, `Failed`, or `None` before the
    /// first result lands. `state` itself is back to `Idle` once a result is applied.
    pub fn last_outcome(&self) -> Option<PollState> {
        if self.consecutive_failures > 0 {
            Some(PollState::Failed)
        } else if self.last_success.is_some() {
            Some(PollState::Success)
        } else {
            None
        }
    }

    pub(crate) fn record_success(&mut self) {
        self.in_flight = false;
        self.state = PollState::Idle;
        self.last_success = Some(Utc::now());
        self.last_error = None;
        self.consecutive_failures = 0;
    }

    pub(crate) fn record_failure(&mut self, error: FetchError) {
        self.in_flight = false;
        self.state = PollState::Idle;
        self.last_error = Some(error);
        self.consecutive_failures += 1;
    }
}

impl Default for PollStatus {
    fn default() -> Self {
        Self::suspended(0, None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub request_timeout: Duration,
    pub backoff_step: Duration,
    pub backoff_max: Duration,
}

impl PollConfig {
    pub fn every(interval: Duration) -> Self {
        Self {
            interval,
            ..Self::default()
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_backoff(mut self, step: Duration, max: Duration) -> Self {
        self.backoff_step = step;
        self.backoff_max = max;
        self
    }

    pub fn without_backoff(self) -> Self {
        self.with_backoff(Duration::ZERO, Duration::ZERO)
    }

    /// Capped linear backoff: how long timer ticks stay suppressed after `failures`
    /// consecutive failures.
    pub fn backoff_for(&self, failures: u32) -> Duration {
        if failures == 0 {
            return Duration::ZERO;
        }
        self.backoff_step
            .saturating_mul(failures)
            .min(self.backoff_max)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            request_timeout: Duration::from_secs(15),
            backoff_step: Duration::from_secs(5),
            backoff_max: Duration::from_secs(30),
        }
    }
}
