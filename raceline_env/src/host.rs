//! Host bridge abstraction: how Raceline reads the game each frame.

use crate::types::{CameraPose, UserIntent, VehicleState, Viewport};

/// Optional track-height query exposed by some hosts.
///
/// Used by the predictor to decide whether a predicted point is airborne.
pub trait Terrain {
    /// Ground height at the given ground-plane coordinates, if known.
    fn ground_height(&self, x: f64, z: f64) -> Option<f64>;
}

/// Everything the frame pipeline needs from the host for one frame.
///
/// Each field is optional because the host becomes ready asynchronously.
#[derive(Clone, Copy, Default)]
pub struct HostFrame<'a> {
    pub vehicle: Option<VehicleState>,
    pub camera: Option<CameraPose>,
    pub viewport: Option<Viewport>,
    pub terrain: Option<&'a dyn Terrain>,
}

impl<'a> HostFrame<'a> {
    /// A frame with all required inputs present.
    pub fn ready(vehicle: VehicleState, camera: CameraPose, viewport: Viewport) -> Self {
        Self {
            vehicle: Some(vehicle),
            camera: Some(camera),
            viewport: Some(viewport),
            terrain: None,
        }
    }

    /// Attaches a terrain query.
    pub fn with_terrain(mut self, terrain: &'a dyn Terrain) -> Self {
        self.terrain = Some(terrain);
        self
    }

    /// Returns true when vehicle, camera and viewport are all present.
    pub fn is_ready(&self) -> bool {
        self.vehicle.is_some() && self.camera.is_some() && self.viewport.is_some()
    }
}

impl std::fmt::Debug for HostFrame<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostFrame")
            .field("vehicle", &self.vehicle)
            .field("camera", &self.camera)
            .field("viewport", &self.viewport)
            .field("terrain", &self.terrain.is_some())
            .finish()
    }
}

/// Abstraction over the game host.
///
/// # Implementations
///
/// - **Production**: an adapter over the game's globals / update hook
/// - **Simulation**: `TrackOracle`, a scripted car on a synthetic track
///
/// # Readiness
///
/// Every getter may return `None` at any time. Values that fail
/// validation are treated exactly like missing ones by [`HostBridge::frame`].
pub trait HostBridge {
    /// Current player vehicle state.
    fn vehicle(&self) -> Option<VehicleState>;

    /// Current camera pose.
    fn camera(&self) -> Option<CameraPose>;

    /// Current drawing surface size.
    fn viewport(&self) -> Option<Viewport>;

    /// Optional track-height query.
    fn terrain(&self) -> Option<&dyn Terrain> {
        None
    }

    /// Returns and clears the user intents received since the last call.
    fn drain_intents(&mut self) -> Vec<UserIntent>;

    /// Collects a validated snapshot of the host for this frame.
    fn frame(&self) -> HostFrame<'_> {
        HostFrame {
            vehicle: self.vehicle().filter(|v| v.validate().is_ok()),
            camera: self.camera().filter(|c| c.validate().is_ok()),
            viewport: self.viewport().filter(|v| v.validate().is_ok()),
            terrain: self.terrain(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Point3, Vector3};

    struct Flat;

    impl Terrain for Flat {
        fn ground_height(&self, _x: f64, _z: f64) -> Option<f64> {
            Some(0.0)
        }
    }

    struct HalfReadyHost {
        intents: Vec<UserIntent>,
    }

    impl HostBridge for HalfReadyHost {
        fn vehicle(&self) -> Option<VehicleState> {
            Some(VehicleState::new(Point3::new(f64::NAN, 0.0, 0.0), Vector3::zeros()))
        }

        fn camera(&self) -> Option<CameraPose> {
            Some(CameraPose::level(Point3::origin(), 0.0))
        }

        fn viewport(&self) -> Option<Viewport> {
            Some(Viewport::new(800.0, 600.0))
        }

        fn drain_intents(&mut self) -> Vec<UserIntent> {
            std::mem::take(&mut self.intents)
        }
    }

    #[test]
    fn test_frame_filters_invalid_values() {
        let host = HalfReadyHost { intents: vec![] };
        let frame = host.frame();

        assert!(frame.vehicle.is_none());
        assert!(frame.camera.is_some());
        assert!(!frame.is_ready());
    }

    #[test]
    fn test_drain_intents_empties_queue() {
        let mut host = HalfReadyHost {
            intents: vec![UserIntent::ClearTrail, UserIntent::ToggleVisualization],
        };

        assert_eq!(host.drain_intents().len(), 2);
        assert!(host.drain_intents().is_empty());
    }

    #[test]
    fn test_ready_frame_with_terrain() {
        let flat = Flat;
        let frame = HostFrame::ready(
            VehicleState::at_rest(Point3::origin()),
            CameraPose::level(Point3::new(0.0, 2.0, -6.0), 0.0),
            Viewport::new(800.0, 600.0),
        )
        .with_terrain(&flat);

        assert!(frame.is_ready());
        assert_eq!(frame.terrain.and_then(|t| t.ground_height(3.0, 4.0)), Some(0.0));
    }
}
