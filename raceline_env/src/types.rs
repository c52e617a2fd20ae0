//! Host-supplied value types.

use crate::error::EnvError;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Live state of the player vehicle, read once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    /// World position in meters
    pub position: Point3<f64>,

    /// World velocity in meters per second
    pub velocity: Vector3<f64>,
}

impl VehicleState {
    /// Creates a new vehicle state.
    pub fn new(position: Point3<f64>, velocity: Vector3<f64>) -> Self {
        Self { position, velocity }
    }

    /// A vehicle at rest at the given position.
    ///
    /// Hosts that expose a car without a velocity report it this way.
    pub fn at_rest(position: Point3<f64>) -> Self {
        Self::new(position, Vector3::zeros())
    }

    /// Rejects states containing NaN or infinite components.
    pub fn validate(&self) -> Result<(), EnvError> {
        let finite = self.position.iter().all(|c| c.is_finite())
            && self.velocity.iter().all(|c| c.is_finite());
        if finite {
            Ok(())
        } else {
            Err(EnvError::invalid(format!("vehicle state {:?}", self)))
        }
    }
}

/// Camera pose supplied by the host each frame.
///
/// Angles are in radians. Yaw rotates about the vertical (Y) axis, pitch
/// about the camera's horizontal axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub position: Point3<f64>,
    pub yaw: f64,
    pub pitch: f64,
}

impl CameraPose {
    /// Creates a new camera pose.
    pub fn new(position: Point3<f64>, yaw: f64, pitch: f64) -> Self {
        Self { position, yaw, pitch }
    }

    /// A level camera (zero pitch).
    pub fn level(position: Point3<f64>, yaw: f64) -> Self {
        Self::new(position, yaw, 0.0)
    }

    /// Rejects poses containing NaN or infinite components.
    pub fn validate(&self) -> Result<(), EnvError> {
        if self.position.iter().all(|c| c.is_finite())
            && self.yaw.is_finite()
            && self.pitch.is_finite()
        {
            Ok(())
        } else {
            Err(EnvError::invalid(format!("camera pose {:?}", self)))
        }
    }
}

/// Size of the drawing surface in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// Creates a new viewport.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Returns the viewport center in pixels.
    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }

    /// Rejects empty or non-finite viewports (canvas not laid out yet).
    pub fn validate(&self) -> Result<(), EnvError> {
        if self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
        {
            Ok(())
        } else {
            Err(EnvError::not_ready(format!(
                "viewport {}x{}",
                self.width, self.height
            )))
        }
    }
}

/// Discrete user intents delivered by the host (keybinds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserIntent {
    /// Turn the whole visualization on or off
    ToggleVisualization,

    /// Drop the recorded trail history
    ClearTrail,
}

impl std::fmt::Display for UserIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserIntent::ToggleVisualization => write!(f, "toggle_visualization"),
            UserIntent::ClearTrail => write!(f, "clear_trail"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_state_rejects_nan() {
        let ok = VehicleState::new(Point3::new(1.0, 2.0, 3.0), Vector3::new(0.0, 0.0, 10.0));
        assert!(ok.validate().is_ok());

        let bad = VehicleState::new(Point3::new(f64::NAN, 0.0, 0.0), Vector3::zeros());
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_viewport_validation() {
        assert!(Viewport::new(800.0, 600.0).validate().is_ok());
        assert!(Viewport::new(0.0, 600.0).validate().is_err());
        assert_eq!(Viewport::new(800.0, 600.0).center(), (400.0, 300.0));
    }

    #[test]
    fn test_camera_pose_validation() {
        assert!(CameraPose::level(Point3::origin(), 0.5).validate().is_ok());
        assert!(CameraPose::new(Point3::origin(), f64::INFINITY, 0.0).validate().is_err());
    }
}
