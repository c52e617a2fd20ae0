//! Production implementation of FrameClock using Tokio.

use crate::FrameClock;
use async_trait::async_trait;
use std::time::{Duration, Instant};

/// Production clock backed by the OS monotonic clock.
///
/// Plays the role of `performance.now()` plus `requestAnimationFrame` for
/// a real host: time comes from `Instant`, frame boundaries from tokio.
pub struct SystemClock {
    /// Start time for monotonic duration calculations
    start: Instant,
}

impl SystemClock {
    /// Creates a new SystemClock.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FrameClock for SystemClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn seed(&self) -> u64 {
        0
    }
}
