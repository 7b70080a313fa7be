//! # Pacing
//! Explicit inter-unit delay, injected wherever the pipeline or scheduler
//! needs to bound burst load (between chunks toward the store, between
//! sources toward the fetcher). Keeping the policy in one swappable value
//! keeps it out of scoring logic and lets tests run with zero delay.

use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    interval: Duration,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Zero-delay pacer for tests.
    pub fn none() -> Self {
        Self {
            interval: Duration::ZERO,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait one pacing interval. No-op when the interval is zero.
    pub async fn pause(&self) {
        if !self.interval.is_zero() {
            tokio::time::sleep(self.interval).await;
        }
    }
}
