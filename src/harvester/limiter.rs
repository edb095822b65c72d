//! Rate limiting of upstream calls
//!
//! This module handles:
//! - The [`RateLimiter`] capability awaited before every upstream call
//! - A fixed-interval implementation spacing consecutive calls

use async_trait::async_trait;
use std::time::{Duration, Instant};

/// Paces calls to the upstream API
///
/// The harvester awaits `throttle()` immediately before each call. The
/// implementation decides how long that takes.
#[async_trait]
pub trait RateLimiter: Send {
    /// Waits until the next call may be issued, then records it
    async fn throttle(&mut self);
}

/// Keeps consecutive calls at least `interval` apart
///
/// A call that is already late is not delayed further. A zero interval
/// disables throttling.
#[derive(Debug, Clone)]
pub struct FixedIntervalLimiter {
    interval: Duration,
    last_call: Option<Instant>,
}

impl FixedIntervalLimiter {
    /// Creates a limiter with the given minimum interval
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_call: None,
        }
    }

    /// Creates a limiter from an interval in milliseconds
    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    /// Returns the configured interval
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Calculates the time until the next call may be issued
    ///
    /// Returns None if a call can be made now, or the duration to wait otherwise.
    pub fn time_until_next_call(&self, now: Instant) -> Option<Duration> {
        let last = self.last_call?;
        let ready_at = last + self.interval;
        if now >= ready_at {
            None
        } else {
            Some(ready_at - now)
        }
    }
}

#[async_trait]
impl RateLimiter for FixedIntervalLimiter {
    async fn throttle(&mut self) {
        if self.interval.is_zero() {
            return;
        }

        if let Some(wait) = self.time_until_next_call(Instant::now()) {
            tracing::trace!("Throttling for {:?}", wait);
            tokio::time::sleep(wait).await;
        }

        self.last_call = Some(Instant::now());
    }
}
