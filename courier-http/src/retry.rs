//! Automatic retries of transport failures.
//!
//! Only failures that produced no response at all are candidates. A non-2xx
//! status is a classification outcome and is handed to the caller as is,
//! so there is no status-based retry.

use std::time::Duration;

use crate::error::TransportError;

/// Delay between two attempts.
#[derive(Debug, Clone, PartialEq)]
pub enum Backoff {
    /// Retry at once.
    None,
    /// Same delay before every retry.
    Fixed(Duration),
    /// `step`, `2 * step`, `3 * step`, ... capped at `max`.
    Linear { step: Duration, max: Duration },
    /// `base * factor^n`, capped at `max`.
    Exponential {
        base: Duration,
        factor: f64,
        max: Duration,
    },
}

impl Backoff {
    /// Delay after failed attempt `attempt` (0 for the first request).
    pub fn delay(&self, attempt: u32) -> Duration {
        match *self {
            Backoff::None => Duration::ZERO,
            Backoff::Fixed(delay) => delay,
            Backoff::Linear { step, max } => step.saturating_mul(attempt.saturating_add(1)).min(max),
            Backoff::Exponential { base, factor, max } => {
                let scaled = base.as_secs_f64() * factor.powi(attempt.min(i32::MAX as u32) as i32);
                if !scaled.is_finite() || scaled >= max.as_secs_f64() {
                    max
                } else {
                    Duration::from_secs_f64(scaled.max(0.0))
                }
            }
        }
    }
}

/// Which transport failures are retried, and how often.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts, the first request included.
    pub max_attempts: u32,
    pub backoff: Backoff,
    /// Retry DNS and connect failures.
    pub on_connect: bool,
    /// Retry connect and socket timeouts.
    pub on_timeout: bool,
}

impl Default for RetryConfig {
    /// Three attempts, 100ms doubling up to 10s, connect and timeout
    /// failures retried.
    fn default() -> Self {
        Self::exponential(3, Duration::from_millis(100))
    }
}

impl RetryConfig {
    pub fn exponential(max_attempts: u32, base: Duration) -> Self {
        Self::with_backoff(
            max_attempts,
            Backoff::Exponential {
                base,
                factor: 2.0,
                max: Duration::from_secs(10),
            },
        )
    }

    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self::with_backoff(max_attempts, Backoff::Fixed(delay))
    }

    pub fn immediate(max_attempts: u32) -> Self {
        Self::with_backoff(max_attempts, Backoff::None)
    }

    pub fn with_backoff(max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            max_attempts,
            backoff,
            on_connect: true,
            on_timeout: true,
        }
    }

    /// Stop retrying connect failures.
    pub fn skip_connect_errors(mut self) -> Self {
        self.on_connect = false;
        self
    }

    /// Stop retrying timeouts.
    pub fn skip_timeouts(mut self) -> Self {
        self.on_timeout = false;
        self
    }

    /// How long to wait before retrying after failed attempt `attempt`
    /// (0-indexed), or `None` when the failure is final.
    pub fn next_delay(&self, attempt: u32, error: &TransportError) -> Option<Duration> {
        if attempt.saturating_add(1) >= self.max_attempts {
            return None;
        }
        let eligible = match error {
            TransportError::Connect(_) => self.on_connect,
            TransportError::Timeout(_) => self.on_timeout,
            _ => false,
        };
        eligible.then(|| self.backoff.delay(attempt))
    }
}
