//! World-to-screen projection for the overlay and the top-down minimap.

use crate::geometry::{Point3, Sample};
use nalgebra::Vector2;
use raceline_env::{CameraPose, Viewport};
use serde::{Deserialize, Serialize};

/// Source of the perspective focal length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocalLength {
    /// A fixed focal length in pixels (550-600 is typical)
    Fixed(f64),
    /// Half the viewport width
    HalfViewport,
}

impl FocalLength {
    fn pixels(&self, viewport: &Viewport) -> f64 {
        match self {
            FocalLength::Fixed(f) => *f,
            FocalLength::HalfViewport => viewport.width / 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectorConfig {
    pub focal: FocalLength,
    /// Minimum camera-space depth for a projectable point
    pub near_plane: f64,
    /// Rotate by camera pitch; when false the camera is assumed level
    pub apply_pitch: bool,
}

impl Default for ProjectorConfig {
    fn default() -> Self {
        Self {
            focal: FocalLength::Fixed(600.0),
            near_plane: 0.1,
            apply_pitch: true,
        }
    }
}

/// Yaw for a camera looking along the ground-plane direction `(x, z)`.
///
/// Inverse of the projector's yaw convention: a camera with this yaw sees
/// points along `direction` at the horizontal screen centre.
pub fn yaw_towards(direction: &Vector2<f64>) -> f64 {
    (-direction.x).atan2(direction.y)
}

/// A projected point: pixels plus camera-space depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
    pub depth: f64,
}

/// A drawable segment whose both endpoints projected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenSegment {
    /// Index of the segment in its source polyline (`samples[index]..samples[index + 1]`)
    pub index: usize,
    pub from: ScreenPoint,
    pub to: ScreenPoint,
}

/// Camera-relative perspective projector.
#[derive(Debug, Clone, Default)]
pub struct Projector {
    config: ProjectorConfig,
}

impl Projector {
    pub fn new(config: ProjectorConfig) -> Self {
        Self { config }
    }

    /// Maps a world point to screen space.
    ///
    /// Returns `None` when the camera-space depth is at or below the near
    /// plane (behind or at the camera). Any returned depth is strictly
    /// greater than `near_plane`.
    pub fn project(
        &self,
        point: &Point3,
        pose: &CameraPose,
        viewport: &Viewport,
    ) -> Option<ScreenPoint> {
        let d = point - pose.position;
        let (mut dx, mut dy, mut dz) = (d.x, d.y, d.z);

        // Undo camera yaw about the vertical axis.
        let (sin_yaw, cos_yaw) = (-pose.yaw).sin_cos();
        (dx, dz) = (dx * cos_yaw - dz * sin_yaw, dx * sin_yaw + dz * cos_yaw);

        if self.config.apply_pitch {
            let (sin_pitch, cos_pitch) = (-pose.pitch).sin_cos();
            (dy, dz) = (dy * cos_pitch - dz * sin_pitch, dy * sin_pitch + dz * cos_pitch);
        }

        // Negated comparison also rejects NaN depths.
        if !(dz > self.config.near_plane) {
            return None;
        }

        let scale = self.config.focal.pixels(viewport) / dz;
        let (cx, cy) = viewport.center();
        Some(ScreenPoint {
            x: dx * scale + cx,
            y: -dy * scale + cy,
            depth: dz,
        })
    }

    /// Projects a polyline, dropping every segment with an unprojectable endpoint.
    pub fn project_segments(
        &self,
        samples: &[Sample],
        pose: &CameraPose,
        viewport: &Viewport,
    ) -> Vec<ScreenSegment> {
        let projected: Vec<Option<ScreenPoint>> = samples
            .iter()
            .map(|s| self.project(&s.position, pose, viewport))
            .collect();

        projected
            .windows(2)
            .enumerate()
            .filter_map(|(index, pair)| match (pair[0], pair[1]) {
                (Some(from), Some(to)) => Some(ScreenSegment { index, from, to }),
                _ => None,
            })
            .collect()
    }
}

/// A point on the minimap canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    pub x: f64,
    pub y: f64,
}

/// Top-down, car-centred map projection.
///
/// World X maps to map X and world Z to map Y, both scaled by `scale`
/// pixels per meter, with the car pinned to the centre of a square canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinimapProjector {
    /// Canvas side length in pixels
    pub size: f64,
    /// Pixels per world meter
    pub scale: f64,
}

impl Default for MinimapProjector {
    fn default() -> Self {
        Self {
            size: 220.0,
            scale: 0.4,
        }
    }
}

impl MinimapProjector {
    /// Canvas centre, where the car dot is drawn.
    pub fn center(&self) -> MapPoint {
        MapPoint {
            x: self.size / 2.0,
            y: self.size / 2.0,
        }
    }

    pub fn project(&self, point: &Point3, car: &Point3) -> MapPoint {
        let c = self.center();
        MapPoint {
            x: c.x + (point.x - car.x) * self.scale,
            y: c.y + (point.z - car.z) * self.scale,
        }
    }

    pub fn polyline(&self, samples: &[Sample], car: &Point3) -> Vec<MapPoint> {
        samples.iter().map(|s| self.project(&s.position, car)).collect()
    }
}
