//! Raceline Deterministic Simulation Harness
//!
//! Plays the host game for the overlay pipeline: a scripted car, a chase
//! camera and a render callback driven by a virtual clock. Every run is
//! reproducible from one 64-bit seed.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                      FrameLoop                       │
//! │   SimClock ──now──► TrackOracle ──HostFrame──┐       │
//! │      ▲              (car, camera,            │       │
//! │      │               terrain, intents)       ▼       │
//! │      └────sleep(1/60 s ± jitter)───────── VizSession │
//! │                                              │       │
//! │                             FrameOutput ─────┴─► FrameSink
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use raceline_sim::{ScenarioRunner, scenarios::ScenarioId};
//!
//! let result = ScenarioRunner::new(42).with_duration(5.0).run(ScenarioId::Hairpin).await;
//! assert!(result.passed);
//! ```

mod context;
mod exporter;
mod oracle;
mod runner;
pub mod scenarios;
mod visualizer;

pub use context::SimClock;
pub use exporter::{ExportFrame, SimExport};
pub use oracle::{DriveProfile, Ramp, TrackOracle};
pub use runner::{
    check_frame, FeedMode, FrameLoop, FrameRecord, FrameSink, NullSink, ScenarioMetrics,
    ScenarioResult, ScenarioRunner,
};
pub use visualizer::RerunLogger;
