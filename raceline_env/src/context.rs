//! Clock abstraction driving the frame callback.

use async_trait::async_trait;
use std::time::Duration;

/// The time source for the visualization loop.
///
/// Raceline is frame-driven: all work for a frame runs synchronously and
/// the only suspension point is the frame boundary, expressed as
/// [`FrameClock::sleep`].
///
/// # Implementations
///
/// - **Production**: `SystemClock` - wraps `std::time::Instant` and `tokio::time`
/// - **Simulation**: `SimClock` - a virtual clock advanced by `sleep`
///
/// # Determinism
///
/// The trail sampling gate and the steering phase of the predictor both
/// read time exclusively through this trait, so a virtual clock makes a
/// whole run reproducible.
#[async_trait]
pub trait FrameClock: Send + Sync + 'static {
    /// Returns the monotonic time since the clock was created.
    fn now(&self) -> Duration;

    /// Yields until the next frame boundary.
    ///
    /// In production: wraps `tokio::time::sleep`
    /// In simulation: advances the virtual clock
    async fn sleep(&self, duration: Duration);

    /// Returns the clock's seed (for logging/debugging).
    ///
    /// In production, returns 0 (not seeded).
    fn seed(&self) -> u64;
}
