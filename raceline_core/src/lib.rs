//! Raceline Core - Guidance Line & Minimap Pipeline
//!
//! Turns the live state of a player vehicle into drawable overlay data:
//! 1. **Trail**: a bounded, time-gated history of observed positions
//! 2. **Prediction**: a short-horizon forward simulation under a simple kinematic model
//! 3. **Projection**: camera-relative perspective mapping into screen space, plus a
//!    top-down minimap
//! 4. **Severity**: per-segment emphasis (hue/width) from curvature or speed change
//!
//! Drawing itself is left to the host; [`VizSession::frame`] returns plain
//! screen-space segments and styles.

pub mod config;
pub mod error;
pub mod feed;
pub mod geometry;
pub mod prediction;
pub mod projection;
pub mod session;
pub mod severity;
pub mod trail;

// Re-export key types for convenience
pub use config::VizConfig;
pub use error::ConfigError;
pub use feed::{PollFeed, PositionFeed, PushFeed};
pub use geometry::{Point3, Sample, Velocity3};
pub use prediction::{PredictedPath, PredictorConfig, SteeringPhase, TrajectoryPredictor};
pub use projection::{
    FocalLength, MinimapProjector, Projector, ProjectorConfig, ScreenPoint, ScreenSegment,
};
pub use session::{FrameOutput, VizSession};
pub use severity::{SegmentStyle, SeverityClassifier, SeverityPolicy, SpeedBucket};
pub use trail::{SampleGate, TrailBuffer};

pub use raceline_env::{CameraPose, HostFrame, Terrain, UserIntent, VehicleState, Viewport};
