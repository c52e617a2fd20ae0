//! Ground truth host for simulation.
//!
//! The TrackOracle plays the game: it drives a scripted car, keeps a chase
//! camera behind it, exposes a fixed viewport and (for jump runs) a ramp
//! terrain, and can withhold the vehicle or inject user intents on a
//! schedule.

use nalgebra::{Point3, Vector2, Vector3};
use raceline_core::projection::yaw_towards;
use raceline_env::{CameraPose, HostBridge, Terrain, UserIntent, VehicleState, Viewport};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const VIEWPORT_WIDTH: f64 = 1280.0;
pub const VIEWPORT_HEIGHT: f64 = 720.0;

/// Chase camera placement relative to the car
const CAMERA_BACK: f64 = 8.0;
const CAMERA_HEIGHT: f64 = 3.0;
const CAMERA_LOOK_AHEAD: f64 = 10.0;

/// Largest physics sub-step in seconds
const MAX_PHYSICS_STEP: f64 = 1.0 / 120.0;

const GRAVITY: f64 = 9.81;

/// A straight ramp along +Z: ground rises linearly to `height`, then drops to 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ramp {
    pub start_z: f64,
    pub length: f64,
    pub height: f64,
}

impl Ramp {
    pub fn contains(&self, z: f64) -> bool {
        z >= self.start_z && z < self.start_z + self.length
    }

    pub fn slope(&self) -> f64 {
        self.height / self.length
    }
}

impl Terrain for Ramp {
    fn ground_height(&self, _x: f64, z: f64) -> Option<f64> {
        if self.contains(z) {
            Some(self.slope() * (z - self.start_z))
        } else {
            Some(0.0)
        }
    }
}

/// How the scripted car moves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DriveProfile {
    /// Constant speed along +Z
    Straight { speed: f64 },
    /// Constant speed on a circle of the given radius
    Circle { speed: f64, radius: f64 },
    /// Straight line, decelerating to a stop
    Braking { speed: f64, decel: f64 },
    /// Parked
    Stationary,
    /// Straight line over a ramp
    Jump { speed: f64, ramp: Ramp },
}

impl DriveProfile {
    fn initial_speed(&self) -> f64 {
        match *self {
            DriveProfile::Straight { speed }
            | DriveProfile::Circle { speed, .. }
            | DriveProfile::Braking { speed, .. }
            | DriveProfile::Jump { speed, .. } => speed,
            DriveProfile::Stationary => 0.0,
        }
    }
}

/// The Oracle - scripted car plus everything else a game host provides.
pub struct TrackOracle {
    profile: DriveProfile,

    /// Car position in meters
    position: Point3<f64>,

    /// Unit ground-plane heading as (x, z)
    heading: Vector2<f64>,

    /// Ground speed in m/s
    speed: f64,

    /// Vertical speed in m/s (jump profile only)
    vertical_speed: f64,

    /// Simulation time in seconds
    time: f64,

    /// Window (seconds) during which the vehicle is not reported
    blackout: Option<(f64, f64)>,

    /// Intents still waiting for their time, sorted by time
    scheduled: Vec<(f64, UserIntent)>,

    /// Intents due but not yet drained
    pending: Vec<UserIntent>,

    viewport: Viewport,
}

impl TrackOracle {
    /// Creates an oracle with the car at the origin heading along +Z.
    pub fn new(profile: DriveProfile) -> Self {
        Self {
            profile,
            position: Point3::origin(),
            heading: Vector2::new(0.0, 1.0),
            speed: profile.initial_speed(),
            vertical_speed: 0.0,
            time: 0.0,
            blackout: None,
            scheduled: Vec::new(),
            pending: Vec::new(),
            viewport: Viewport::new(VIEWPORT_WIDTH, VIEWPORT_HEIGHT),
        }
    }

    /// Hides the vehicle between `from` and `to` seconds.
    pub fn with_blackout(mut self, from: f64, to: f64) -> Self {
        self.blackout = Some((from, to));
        self
    }

    /// Delivers `intent` once the simulation reaches `at` seconds.
    pub fn schedule_intent(&mut self, at: f64, intent: UserIntent) {
        self.scheduled.push((at, intent));
        self.scheduled.sort_by(|a, b| a.0.total_cmp(&b.0));
    }

    /// Advances physics to absolute time `now` in bounded sub-steps.
    pub fn advance_to(&mut self, now: Duration) {
        let target = now.as_secs_f64();
        while self.time < target {
            let dt = (target - self.time).min(MAX_PHYSICS_STEP);
            self.step(dt);
        }

        let due = self.scheduled.iter().take_while(|(t, _)| *t <= self.time).count();
        self.pending
            .extend(self.scheduled.drain(..due).map(|(_, intent)| intent));
    }

    /// Advances physics by dt seconds.
    pub fn step(&mut self, dt: f64) {
        self.time += dt;

        match self.profile {
            DriveProfile::Circle { radius, .. } => {
                let (sin, cos) = (self.speed / radius * dt).sin_cos();
                let h = self.heading;
                self.heading = Vector2::new(h.x * cos - h.y * sin, h.x * sin + h.y * cos);
            }
            DriveProfile::Braking { decel, .. } => {
                self.speed = (self.speed - decel * dt).max(0.0);
            }
            _ => {}
        }

        self.position.x += self.heading.x * self.speed * dt;
        self.position.z += self.heading.y * self.speed * dt;

        if let DriveProfile::Jump { ramp, .. } = self.profile {
            self.settle_on(&ramp, dt);
        }
    }

    fn settle_on(&mut self, ramp: &Ramp, dt: f64) {
        let ground = ramp.ground_height(self.position.x, self.position.z).unwrap_or(0.0);
        if self.position.y > ground + 1e-6 {
            self.vertical_speed -= GRAVITY * dt;
            self.position.y += self.vertical_speed * dt;
            if self.position.y <= ground {
                self.position.y = ground;
                self.vertical_speed = 0.0;
            }
        } else {
            self.position.y = ground;
            self.vertical_speed = if ramp.contains(self.position.z) {
                ramp.slope() * self.speed
            } else {
                0.0
            };
        }
    }

    /// Ground-truth vehicle state, ignoring any blackout.
    pub fn true_state(&self) -> VehicleState {
        VehicleState::new(
            self.position,
            Vector3::new(
                self.heading.x * self.speed,
                self.vertical_speed,
                self.heading.y * self.speed,
            ),
        )
    }

    /// True while the scripted blackout hides the vehicle.
    pub fn in_blackout(&self) -> bool {
        self.blackout
            .map_or(false, |(from, to)| self.time >= from && self.time < to)
    }

    /// Returns the current simulation time.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn position(&self) -> Point3<f64> {
        self.position
    }

    pub fn heading(&self) -> Vector2<f64> {
        self.heading
    }

    pub fn profile(&self) -> &DriveProfile {
        &self.profile
    }

    /// Chase camera: behind and above the car, looking at a point ahead of it.
    pub fn chase_camera(&self) -> CameraPose {
        let back = self.heading * CAMERA_BACK;
        let position = Point3::new(
            self.position.x - back.x,
            self.position.y + CAMERA_HEIGHT,
            self.position.z - back.y,
        );
        let pitch = CAMERA_HEIGHT.atan2(CAMERA_BACK + CAMERA_LOOK_AHEAD);
        CameraPose::new(position, yaw_towards(&self.heading), pitch)
    }
}

impl HostBridge for TrackOracle {
    fn vehicle(&self) -> Option<VehicleState> {
        if self.in_blackout() {
            None
        } else {
            Some(self.true_state())
        }
    }

    fn camera(&self) -> Option<CameraPose> {
        Some(self.chase_camera())
    }

    fn viewport(&self) -> Option<Viewport> {
        Some(self.viewport)
    }

    fn terrain(&self) -> Option<&dyn Terrain> {
        match &self.profile {
            DriveProfile::Jump { ramp, .. } => Some(ramp),
            _ => None,
        }
    }

    fn drain_intents(&mut self) -> Vec<UserIntent> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use raceline_core::Projector;

    #[test]
    fn test_straight_drive() {
        let mut oracle = TrackOracle::new(DriveProfile::Straight { speed: 20.0 });
        oracle.advance_to(Duration::from_secs(1));

        assert_relative_eq!(oracle.position().z, 20.0, epsilon = 1e-9);
        assert_relative_eq!(oracle.time(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_circle_keeps_radius() {
        let radius = 25.0;
        let mut oracle = TrackOracle::new(DriveProfile::Circle { speed: 15.0, radius });
        oracle.advance_to(Duration::from_secs(3));

        // The circle's centre sits one radius to the side of the start.
        let rotated = oracle.heading();
        assert_relative_eq!(rotated.norm(), 1.0, epsilon = 1e-9);
        let centre = Point3::new(-radius, 0.0, 0.0);
        let r = (oracle.position() - centre).xz().norm();
        assert_relative_eq!(r, radius, epsilon = 0.2);
    }

    #[test]
    fn test_braking_stops() {
        let mut oracle = TrackOracle::new(DriveProfile::Braking { speed: 30.0, decel: 10.0 });
        oracle.advance_to(Duration::from_secs(4));

        assert_eq!(oracle.speed(), 0.0);
        assert_relative_eq!(oracle.position().z, 45.0, epsilon = 0.2);
    }

    #[test]
    fn test_jump_leaves_and_lands() {
        let ramp = Ramp { start_z: 10.0, length: 10.0, height: 2.0 };
        let mut oracle = TrackOracle::new(DriveProfile::Jump { speed: 20.0, ramp });

        oracle.advance_to(Duration::from_millis(1100));
        assert!(oracle.position().y > 0.0);
        assert!(!ramp.contains(oracle.position().z));

        oracle.advance_to(Duration::from_secs(3));
        assert_eq!(oracle.position().y, 0.0);
    }

    #[test]
    fn test_blackout_hides_vehicle_only() {
        let mut oracle = TrackOracle::new(DriveProfile::Stationary).with_blackout(1.0, 2.0);
        oracle.advance_to(Duration::from_millis(1500));

        let frame = oracle.frame();
        assert!(frame.vehicle.is_none());
        assert!(frame.camera.is_some());

        oracle.advance_to(Duration::from_millis(2500));
        assert!(oracle.frame().is_ready());
    }

    #[test]
    fn test_intents_delivered_on_schedule() {
        let mut oracle = TrackOracle::new(DriveProfile::Stationary);
        oracle.schedule_intent(2.0, UserIntent::ClearTrail);
        oracle.schedule_intent(1.0, UserIntent::ToggleVisualization);

        oracle.advance_to(Duration::from_millis(1500));
        assert_eq!(oracle.drain_intents(), vec![UserIntent::ToggleVisualization]);
        assert!(oracle.drain_intents().is_empty());

        oracle.advance_to(Duration::from_secs(2));
        assert_eq!(oracle.drain_intents(), vec![UserIntent::ClearTrail]);
    }

    #[test]
    fn test_chase_camera_sees_car_centered() {
        let mut oracle = TrackOracle::new(DriveProfile::Circle { speed: 20.0, radius: 30.0 });
        oracle.advance_to(Duration::from_secs(2));

        let projector = Projector::default();
        let viewport = Viewport::new(VIEWPORT_WIDTH, VIEWPORT_HEIGHT);
        let sp = projector
            .project(&oracle.position(), &oracle.chase_camera(), &viewport)
            .unwrap();

        assert_relative_eq!(sp.x, VIEWPORT_WIDTH / 2.0, epsilon = 1e-6);
        // Below the horizon line: the camera looks down at the road.
        assert!(sp.y > VIEWPORT_HEIGHT / 2.0);
    }
}
