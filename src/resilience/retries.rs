//! Retry and failover budget.
//!
//! # Responsibilities
//! - Carry per-request attempt/retry counters through the router loop
//! - Decide between retrying the same backend and failing over
//!
//! # Design Decisions
//! - Counters are an immutable value; every step produces a new one
//! - Fixed backoff between same-backend retries, not exponential
//! - Selecting a new backend resets the retry counter

use std::time::Duration;
use crate::config::RetryConfig;

/// Counters for one client request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptState {
    /// Backend selections so far, starting at 1.
    pub attempts: u32,
    /// Same-backend retries since the last selection, starting at 0.
    pub retries: u32,
}

impl Default for AttemptState {
    fn default() -> Self {
        Self::new()
    }
}

impl AttemptState {
    pub const fn new() -> Self {
        Self { attempts: 1, retries: 0 }
    }

    /// State after one more try against the same backend.
    #[must_use]
    pub const fn next_retry(self) -> Self {
        Self { attempts: self.attempts, retries: self.retries + 1 }
    }

    /// State after giving up on the current backend.
    #[must_use]
    pub const fn next_attempt(self) -> Self {
        Self { attempts: self.attempts + 1, retries: 0 }
    }
}

/// What to do after a failed forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait `backoff`, then try the same backend again.
    RetrySame,
    /// Mark the backend down and select another.
    Failover,
}

/// Limits for retry and failover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            max_attempts: config.max_attempts,
            backoff: Duration::from_millis(config.backoff_ms),
        }
    }
}

impl RetryPolicy {
    pub fn on_failure(&self, state: AttemptState) -> RetryDecision {
        if state.retries < self.max_retries {
            RetryDecision::RetrySame
        } else {
            RetryDecision::Failover
        }
    }

    /// True once the request has used up its backend selections.
    pub fn exhausted(&self, state: AttemptState) -> bool {
        state.attempts > self.max_attempts
    }
}
