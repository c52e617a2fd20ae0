//! Virtual clock implementing FrameClock for deterministic runs.

use async_trait::async_trait;
use raceline_env::FrameClock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Simulation clock backed by a virtual nanosecond counter.
///
/// `sleep` returns immediately after advancing the counter, so a run of
/// thousands of frames finishes in milliseconds and every frame sees an
/// exactly reproducible timestamp.
pub struct SimClock {
    /// Master seed for this simulation
    seed: u64,

    /// Current virtual time (nanoseconds since simulation start)
    virtual_time_ns: Arc<AtomicU64>,
}

impl SimClock {
    /// Creates a new SimClock at time zero.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            virtual_time_ns: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Advances virtual time by the given duration.
    pub fn advance_time(&self, duration: Duration) {
        self.virtual_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::SeqCst);
    }

    /// Sets the virtual time to a specific value.
    pub fn set_time(&self, time_ns: u64) {
        self.virtual_time_ns.store(time_ns, Ordering::SeqCst);
    }

    /// Returns the current virtual time in nanoseconds.
    pub fn time_ns(&self) -> u64 {
        self.virtual_time_ns.load(Ordering::SeqCst)
    }
}

impl Clone for SimClock {
    fn clone(&self) -> Self {
        Self {
            seed: self.seed,
            virtual_time_ns: Arc::clone(&self.virtual_time_ns),
        }
    }
}

#[async_trait]
impl FrameClock for SimClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.time_ns())
    }

    async fn sleep(&self, duration: Duration) {
        // The frame boundary is instantaneous in simulation.
        self.advance_time(duration);
    }

    fn seed(&self) -> u64 {
        self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sim_clock_time() {
        let clock = SimClock::new(42);
        assert_eq!(clock.now(), Duration::ZERO);

        clock.advance_time(Duration::from_secs(1));
        assert_eq!(clock.now(), Duration::from_secs(1));

        clock.advance_time(Duration::from_millis(500));
        assert_eq!(clock.now(), Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn test_sleep_advances_virtual_time() {
        let clock = SimClock::new(7);
        clock.sleep(Duration::from_millis(33)).await;
        assert_eq!(clock.now(), Duration::from_millis(33));
    }

    #[test]
    fn test_sim_clock_seed() {
        let clock = SimClock::new(12345);
        assert_eq!(clock.seed(), 12345);
    }

    #[test]
    fn test_sim_clock_clone_shares_time() {
        let c1 = SimClock::new(42);
        let c2 = c1.clone();

        c1.advance_time(Duration::from_secs(5));
        assert_eq!(c1.now(), c2.now());

        c2.set_time(0);
        assert_eq!(c1.time_ns(), 0);
    }
}
