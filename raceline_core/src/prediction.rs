//! Short-horizon trajectory predictor.
//!
//! Forward-integrates the vehicle under a deliberately simple model:
//! constant forward thrust, per-step multiplicative drag, and a sinusoidal
//! lateral nudge that stands in for lane-seeking. Nothing here knows about
//! the track; the path is only meant to read well as a guidance line.

use crate::geometry::{ground_direction, ground_speed, Point3, Sample, Velocity3};
use nalgebra::Vector2;
use raceline_env::Terrain;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Height above ground below which a predicted point counts as grounded.
const AIRBORNE_TOLERANCE: f64 = 0.05;

/// Predictor tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    /// Integration step in seconds
    pub dt: f64,
    /// Number of steps (`predSteps`); the path holds `steps + 1` samples
    pub steps: usize,
    /// Forward acceleration in m/s²
    pub accel: f64,
    /// Per-step multiplicative velocity decay
    pub drag: f64,
    /// Steering oscillation amplitude
    pub max_turn: f64,
    /// Floor for the speed divisor when normalizing heading
    pub min_speed: f64,
    /// Phase advance per step (k1)
    pub phase_step: f64,
    /// Phase advance per second of steering phase (k2)
    pub phase_rate: f64,
    /// Overall gain on the lateral nudge (k3)
    pub turn_gain: f64,
    /// Distance from the sampled vehicle height down to the drawn surface
    pub surface_offset: f64,
    /// Gravitational acceleration used for airborne points, m/s²
    pub gravity: f64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            dt: 1.0 / 60.0,
            steps: 60,
            accel: 3.8,
            drag: 0.985,
            max_turn: 0.6,
            min_speed: 0.01,
            phase_step: 0.15,
            phase_rate: 1.5,
            turn_gain: 0.5,
            surface_offset: 0.0,
            gravity: 9.81,
        }
    }
}

/// Phase of the steering oscillation, in seconds.
///
/// Passed in explicitly so a prediction is a pure function of its inputs;
/// the session derives it from the injected frame clock.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SteeringPhase(pub f64);

impl SteeringPhase {
    pub fn from_elapsed(elapsed: Duration) -> Self {
        Self(elapsed.as_secs_f64())
    }
}

/// A freshly generated forward path. Index 0 is the starting state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredictedPath(Vec<Sample>);

impl PredictedPath {
    pub fn samples(&self) -> &[Sample] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Last predicted sample.
    pub fn endpoint(&self) -> Option<&Sample> {
        self.0.last()
    }

    /// Consecutive sample pairs with their segment index.
    pub fn segments(&self) -> impl Iterator<Item = (usize, &Sample, &Sample)> {
        self.0.windows(2).enumerate().map(|(i, w)| (i, &w[0], &w[1]))
    }
}

/// Forward kinematic integrator.
#[derive(Debug, Clone, Default)]
pub struct TrajectoryPredictor {
    config: PredictorConfig,
}

impl TrajectoryPredictor {
    pub fn new(config: PredictorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    /// Predicts with the height held at the drawn surface.
    pub fn predict(
        &self,
        position: Point3,
        velocity: Velocity3,
        phase: SteeringPhase,
    ) -> PredictedPath {
        self.predict_over(position, velocity, phase, None)
    }

    /// Predicts, using `terrain` (when available) for airborne handling.
    ///
    /// Grounded points follow the terrain; points above it fall under
    /// `gravity` until they land. Where the terrain has no height the
    /// surface height is held.
    pub fn predict_over(
        &self,
        position: Point3,
        velocity: Velocity3,
        phase: SteeringPhase,
        terrain: Option<&dyn Terrain>,
    ) -> PredictedPath {
        let cfg = &self.config;
        let dt = cfg.dt;
        let surface_y = position.y - cfg.surface_offset;

        let mut path = Vec::with_capacity(cfg.steps + 1);
        path.push(Sample::observe(position, velocity));

        let mut pos = Point3::new(position.x, surface_y, position.z);
        let mut v = Vector2::new(velocity.x, velocity.z);
        let mut vy = velocity.y;

        for i in 0..cfg.steps {
            let s = ground_speed(&Velocity3::new(v.x, 0.0, v.y)).max(cfg.min_speed);
            let forward = ground_direction(&Velocity3::new(v.x, 0.0, v.y), cfg.min_speed);

            v += forward * cfg.accel * dt;
            v *= cfg.drag;

            let right = Vector2::new(-forward.y, forward.x);
            let nudge = (i as f64 * cfg.phase_step + phase.0 * cfg.phase_rate).sin()
                * cfg.max_turn
                * dt
                * s
                * cfg.turn_gain;
            v += right * nudge;

            pos.x += v.x * dt;
            pos.z += v.y * dt;
            pos.y = match terrain.and_then(|t| t.ground_height(pos.x, pos.z)) {
                Some(ground) => self.settle_height(pos.y, &mut vy, ground),
                None => {
                    vy = 0.0;
                    surface_y
                }
            };

            path.push(Sample::new(pos, v.norm()));
        }

        PredictedPath(path)
    }

    /// Advances the vertical state by one step against the ground height.
    fn settle_height(&self, y: f64, vy: &mut f64, ground: f64) -> f64 {
        if y > ground + AIRBORNE_TOLERANCE {
            *vy -= self.config.gravity * self.config.dt;
            let next = y + *vy * self.config.dt;
            if next <= ground {
                *vy = 0.0;
                ground
            } else {
                next
            }
        } else {
            *vy = 0.0;
            ground
        }
    }
}
