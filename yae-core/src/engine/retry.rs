//! Retry/backoff configuration for a node's `exec` phase.
//!
//! Only `exec` is retried (spec §4.A): `prep`/`post` run once. Delay between
//! attempt `k` and `k+1` is `delay * 2^(k-1)` for `Exponential`, `delay * k`
//! for `Linear`.

use std::time::Duration;

/// How the delay between retry attempts grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    Linear,
    Exponential,
}

/// Per-node retry policy. `max_attempts = 1` (the default) means no retries:
/// `exec` runs once and any failure goes straight to fallback/`onError`.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub delay: Duration,
    pub backoff: Backoff,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::from_millis(0),
            backoff: Backoff::Linear,
        }
    }
}

impl RetryConfig {
    pub fn new(max_attempts: u32, delay: Duration, backoff: Backoff) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
            backoff,
        }
    }

    /// Delay to wait after attempt `attempt` (1-based) has just failed, before
    /// attempt `attempt + 1`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Linear => self.delay * attempt,
            Backoff::Exponential => {
                let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
                self.delay * factor
            }
        }
    }
}
