//! Vector primitives and the observed/predicted sample type.
//!
//! Speeds are always measured in the ground plane (X/Z); the vertical
//! component of velocity never contributes.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// World position in meters.
pub type Point3 = nalgebra::Point3<f64>;

/// World velocity in meters per second.
pub type Velocity3 = nalgebra::Vector3<f64>;

/// Ground-plane speed: `hypot(v.x, v.z)`.
pub fn ground_speed(v: &Velocity3) -> f64 {
    v.x.hypot(v.z)
}

/// Unit heading in the ground plane as `(x, z)`.
///
/// The divisor is floored at `min_speed`, so a stationary vehicle yields a
/// zero vector instead of NaN.
pub fn ground_direction(v: &Velocity3, min_speed: f64) -> Vector2<f64> {
    let s = ground_speed(v).max(min_speed);
    Vector2::new(v.x / s, v.z / s)
}

/// One point of a trail or predicted path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub position: Point3,
    pub speed: f64,
}

impl Sample {
    pub fn new(position: Point3, speed: f64) -> Self {
        Self { position, speed }
    }

    /// Builds a sample from a live position/velocity pair.
    pub fn observe(position: Point3, velocity: Velocity3) -> Self {
        Self::new(position, ground_speed(&velocity))
    }

    /// Ground-plane displacement from `self` to `next` as `(x, z)`.
    pub fn ground_delta(&self, next: &Sample) -> Vector2<f64> {
        Vector2::new(
            next.position.x - self.position.x,
            next.position.z - self.position.z,
        )
    }
}
