//! Raceline Environment Abstraction Layer
//!
//! This crate isolates everything Raceline reads from the outside world so
//! the prediction/projection core can run against a live game host or a
//! deterministic simulation without changes.
//!
//! # Intercepted Inputs
//!
//! - Time (`now()`, `sleep()` at the frame boundary)
//! - Host state (vehicle, camera, viewport, optional terrain)
//! - User intents (toggle visualization, clear trail)
//!
//! Host readiness is asynchronous: every host read returns an `Option` and
//! absence simply means "skip this frame".
//!
//! # Example
//!
//! ```ignore
//! use raceline_env::{FrameClock, HostBridge, HostFrame, UserIntent};
//! use std::time::Duration;
//!
//! async fn frame_loop<C: FrameClock, H: HostBridge>(
//!     clock: &C,
//!     host: &mut H,
//!     mut render: impl FnMut(Duration, Vec<UserIntent>, &HostFrame<'_>),
//! ) {
//!     loop {
//!         let intents = host.drain_intents();
//!         render(clock.now(), intents, &host.frame());
//!         clock.sleep(Duration::from_micros(16_667)).await;
//!     }
//! }
//! ```

mod context;
mod host;
mod types;
mod error;
mod system_clock;

pub use context::FrameClock;
pub use host::{HostBridge, HostFrame, Terrain};
pub use types::{CameraPose, UserIntent, VehicleState, Viewport};
pub use error::EnvError;
pub use system_clock::SystemClock;
