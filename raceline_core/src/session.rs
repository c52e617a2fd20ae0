//! The per-frame visualization pipeline.
//!
//! A [`VizSession`] owns the trail and runs, once per render callback:
//! gated sampling → prediction → projection → classification. It never
//! fails; a frame with missing inputs returns `None` and leaves all state
//! untouched.

use crate::config::VizConfig;
use crate::error::ConfigError;
use crate::feed::PositionFeed;
use crate::geometry::Sample;
use crate::prediction::{PredictedPath, SteeringPhase, TrajectoryPredictor};
use crate::projection::{MapPoint, MinimapProjector, Projector, ScreenSegment};
use crate::severity::{trail_style, SegmentStyle, SeverityClassifier};
use crate::trail::{SampleGate, TrailBuffer};
use raceline_env::{HostFrame, UserIntent};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, trace};

/// A projected segment together with how to draw it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StyledSegment {
    pub segment: ScreenSegment,
    pub style: SegmentStyle,
}

/// Car-centred minimap polylines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimapFrame {
    /// Where the car dot goes
    pub car: MapPoint,
    pub trail: Vec<MapPoint>,
    pub prediction: Vec<MapPoint>,
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameOutput {
    /// Frame time in seconds since the clock started
    pub time_sec: f64,
    /// Whether this frame appended to the trail
    pub sampled: bool,
    pub trail: Vec<Sample>,
    pub prediction: PredictedPath,
    pub trail_segments: Vec<StyledSegment>,
    pub prediction_segments: Vec<StyledSegment>,
    pub minimap: MinimapFrame,
}

/// Owns the trail for the lifetime of the visualization.
#[derive(Debug, Clone)]
pub struct VizSession {
    config: VizConfig,
    trail: TrailBuffer,
    gate: SampleGate,
    predictor: TrajectoryPredictor,
    projector: Projector,
    classifier: SeverityClassifier,
    minimap: MinimapProjector,
    enabled: bool,
}

impl VizSession {
    /// Creates a session with an empty trail.
    pub fn new(config: VizConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            trail: TrailBuffer::with_capacity(config.max_trail),
            gate: SampleGate::new(config.sampling_interval()),
            predictor: TrajectoryPredictor::new(config.predictor.clone()),
            projector: Projector::new(config.projector.clone()),
            classifier: SeverityClassifier::new(config.severity.clone()),
            minimap: config.minimap.clone(),
            enabled: config.start_enabled,
            config,
        })
    }

    pub fn config(&self) -> &VizConfig {
        &self.config
    }

    pub fn trail(&self) -> &TrailBuffer {
        &self.trail
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Applies a discrete user intent.
    pub fn handle(&mut self, intent: UserIntent) {
        match intent {
            UserIntent::ToggleVisualization => {
                self.enabled = !self.enabled;
                debug!("Visualization {}", if self.enabled { "enabled" } else { "disabled" });
            }
            UserIntent::ClearTrail => {
                let dropped = self.trail.len();
                self.trail.clear();
                self.gate.reset();
                debug!("Trail cleared ({} samples dropped)", dropped);
            }
        }
    }

    /// Runs the pipeline for one render callback.
    ///
    /// Returns `None` without touching any state when the overlay is
    /// disabled or the vehicle, camera or viewport is missing. Non-finite
    /// values count as missing.
    pub fn frame(&mut self, now: Duration, input: &HostFrame<'_>) -> Option<FrameOutput> {
        if !self.enabled {
            return None;
        }
        let (vehicle, camera, viewport) = match (input.vehicle, input.camera, input.viewport) {
            (Some(v), Some(c), Some(p)) => (v, c, p),
            _ => {
                trace!("Skipping frame at {:?}: host not ready", now);
                return None;
            }
        };
        if let Err(e) = vehicle
            .validate()
            .and_then(|_| camera.validate())
            .and_then(|_| viewport.validate())
        {
            trace!("Skipping frame at {:?}: {}", now, e);
            return None;
        }

        // All guards passed; from here on the frame may mutate the trail.
        let sampled = self.gate.ready(now);
        if sampled {
            self.trail.append(Sample::observe(vehicle.position, vehicle.velocity));
            trace!("Trail sample {} at {:?}", self.trail.len(), now);
        }

        let prediction = self.predictor.predict_over(
            vehicle.position,
            vehicle.velocity,
            SteeringPhase::from_elapsed(now),
            input.terrain,
        );

        let trail = self.trail.snapshot();
        let trail_segments = self
            .projector
            .project_segments(&trail, &camera, &viewport)
            .into_iter()
            .map(|segment| StyledSegment {
                segment,
                style: trail_style(segment.index, trail.len()),
            })
            .collect();

        let styles = self.classifier.classify_path(&prediction);
        let prediction_segments = self
            .projector
            .project_segments(prediction.samples(), &camera, &viewport)
            .into_iter()
            .map(|segment| StyledSegment {
                segment,
                style: styles[segment.index],
            })
            .collect();

        let minimap = MinimapFrame {
            car: self.minimap.center(),
            trail: self.minimap.polyline(&trail, &vehicle.position),
            prediction: self.minimap.polyline(prediction.samples(), &vehicle.position),
        };

        Some(FrameOutput {
            time_sec: now.as_secs_f64(),
            sampled,
            trail,
            prediction,
            trail_segments,
            prediction_segments,
            minimap,
        })
    }

    /// Runs a frame with the vehicle state taken from a position feed.
    ///
    /// Push and poll adapters both land here, so the trail is only ever
    /// appended through [`VizSession::frame`].
    pub fn frame_from_feed(
        &mut self,
        now: Duration,
        feed: &mut dyn PositionFeed,
        input: &HostFrame<'_>,
    ) -> Option<FrameOutput> {
        let input = HostFrame {
            vehicle: feed.latest(now),
            ..*input
        };
        self.frame(now, &input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{PollFeed, PushFeed};
    use crate::geometry::{Point3, Velocity3};
    use crate::severity::SeverityPolicy;
    use approx::assert_relative_eq;
    use raceline_env::{CameraPose, Terrain, VehicleState, Viewport};

    fn vehicle(z: f64) -> VehicleState {
        VehicleState::new(Point3::new(0.0, 0.0, z), Velocity3::new(0.0, 0.0, 20.0))
    }

    fn camera() -> CameraPose {
        CameraPose::new(Point3::new(0.0, 2.0, -8.0), 0.0, 0.0)
    }

    fn ready(z: f64) -> HostFrame<'static> {
        HostFrame::ready(vehicle(z), camera(), Viewport::new(800.0, 600.0))
    }

    fn ms(t: u64) -> Duration {
        Duration::from_millis(t)
    }

    #[test]
    fn test_sampling_is_time_gated() {
        let mut session = VizSession::new(VizConfig::default()).unwrap();

        // 60 Hz frames for half a second: ~30 Hz sampling.
        let mut sampled = 0;
        for frame in 0..30u64 {
            let out = session.frame(ms(frame * 1000 / 60), &ready(frame as f64)).unwrap();
            if out.sampled {
                sampled += 1;
            }
        }
        assert_eq!(sampled, session.trail().len());
        assert!((14..=16).contains(&sampled), "sampled {} times", sampled);
    }

    #[test]
    fn test_missing_input_mutates_nothing() {
        let mut session = VizSession::new(VizConfig::default()).unwrap();
        let mut half = ready(0.0);
        half.camera = None;

        assert!(session.frame(ms(0), &half).is_none());
        assert!(session.frame(ms(100), &HostFrame::default()).is_none());
        assert!(session.trail().is_empty());

        // The gate was never consumed, so the first ready frame samples.
        let out = session.frame(ms(101), &ready(0.0)).unwrap();
        assert!(out.sampled);
    }

    #[test]
    fn test_toggle_and_clear() {
        let mut session = VizSession::new(VizConfig::default()).unwrap();
        session.frame(ms(0), &ready(0.0));
        session.frame(ms(40), &ready(1.0));
        assert_eq!(session.trail().len(), 2);

        session.handle(UserIntent::ToggleVisualization);
        assert!(!session.is_enabled());
        assert!(session.frame(ms(80), &ready(2.0)).is_none());
        assert_eq!(session.trail().len(), 2);

        session.handle(UserIntent::ToggleVisualization);
        session.handle(UserIntent::ClearTrail);
        assert!(session.trail().is_empty());

        let out = session.frame(ms(81), &ready(3.0)).unwrap();
        assert!(out.sampled);
        assert_eq!(out.trail.len(), 1);
    }

    #[test]
    fn test_trail_respects_capacity() {
        let mut session = VizSession::new(VizConfig {
            max_trail: 3,
            ..Default::default()
        })
        .unwrap();

        for i in 0..4u64 {
            session.frame(ms(i * 50), &ready(i as f64));
        }
        let zs: Vec<f64> = session.trail().iter().map(|s| s.position.z).collect();
        assert_eq!(zs, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_frame_output_shapes() {
        let mut session = VizSession::new(VizConfig::default()).unwrap();
        let out = session.frame(ms(0), &ready(0.0)).unwrap();

        assert_eq!(out.prediction.len(), 61);
        // Camera sits behind the car looking forward: the whole path is visible.
        assert_eq!(out.prediction_segments.len(), 60);
        assert!(out.prediction_segments.iter().all(|s| s.segment.from.depth > 0.1));
        assert_eq!(out.minimap.prediction.len(), 61);
        assert_eq!(out.minimap.prediction[0], out.minimap.car);
        // A single trail sample has no segments.
        assert!(out.trail_segments.is_empty());
    }

    #[test]
    fn test_segments_behind_camera_are_dropped() {
        let mut session = VizSession::new(VizConfig::default()).unwrap();
        // Camera 10 m down the road looking back at the car: the far half
        // of the ~20 m path passes behind it.
        let facing_back = CameraPose::new(Point3::new(0.0, 2.0, 10.0), std::f64::consts::PI, 0.0);
        let input = HostFrame::ready(vehicle(0.0), facing_back, Viewport::new(800.0, 600.0));

        let out = session.frame(ms(0), &input).unwrap();
        assert!(!out.prediction_segments.is_empty());
        assert!(out.prediction_segments.len() < out.prediction.len() - 1);
        assert!(out.prediction_segments.iter().all(|s| s.segment.to.depth > 0.1));
    }

    #[test]
    fn test_steering_phase_follows_clock() {
        let mut a = VizSession::new(VizConfig::default()).unwrap();
        let mut b = VizSession::new(VizConfig::default()).unwrap();

        let pa = a.frame(ms(500), &ready(0.0)).unwrap().prediction;
        let pb = b.frame(ms(500), &ready(0.0)).unwrap().prediction;
        assert_eq!(pa, pb);

        let pc = b.frame(ms(900), &ready(0.0)).unwrap().prediction;
        assert_ne!(pa, pc);
    }

    #[test]
    fn test_speed_delta_policy_styles() {
        let mut session = VizSession::new(VizConfig {
            severity: SeverityPolicy::SpeedDelta {
                accel_threshold: 0.5,
                brake_threshold: -0.5,
                width: 5.0,
            },
            ..Default::default()
        })
        .unwrap();

        let out = session.frame(ms(0), &ready(0.0)).unwrap();
        assert!(out.prediction_segments.iter().all(|s| s.style.bucket.is_some()));
    }

    #[test]
    fn test_terrain_is_forwarded_to_predictor() {
        struct Flat;
        impl Terrain for Flat {
            fn ground_height(&self, _x: f64, _z: f64) -> Option<f64> {
                Some(0.0)
            }
        }

        let mut session = VizSession::new(VizConfig::default()).unwrap();
        let flat = Flat;
        let airborne =
            VehicleState::new(Point3::new(0.0, 3.0, 0.0), Velocity3::new(0.0, 0.0, 20.0));
        let input = HostFrame::ready(airborne, camera(), Viewport::new(800.0, 600.0))
            .with_terrain(&flat);

        let out = session.frame(ms(0), &input).unwrap();
        let end = out.prediction.endpoint().unwrap();
        assert!(end.position.y < 3.0);
    }

    #[test]
    fn test_non_finite_input_mutates_nothing() {
        let mut session = VizSession::new(VizConfig::default()).unwrap();

        let mut nan_vehicle = ready(0.0);
        nan_vehicle.vehicle = Some(VehicleState::new(
            Point3::new(f64::NAN, 0.0, 0.0),
            Velocity3::new(0.0, 0.0, 20.0),
        ));
        let mut nan_camera = ready(0.0);
        nan_camera.camera = Some(CameraPose::new(camera().position, f64::INFINITY, 0.0));
        let mut empty_viewport = ready(0.0);
        empty_viewport.viewport = Some(Viewport::new(0.0, 600.0));

        assert!(session.frame(ms(0), &nan_vehicle).is_none());
        assert!(session.frame(ms(50), &nan_camera).is_none());
        assert!(session.frame(ms(100), &empty_viewport).is_none());
        assert!(session.trail().is_empty());

        let out = session.frame(ms(101), &ready(0.0)).unwrap();
        assert!(out.sampled);
        assert!(out.trail[0].position.x.is_finite());
    }

    #[test]
    fn test_push_and_poll_feeds_share_the_trail_path() {
        let mut push_session = VizSession::new(VizConfig::default()).unwrap();
        let mut poll_session = VizSession::new(VizConfig::default()).unwrap();
        let host = HostFrame {
            vehicle: None,
            ..ready(0.0)
        };

        let mut push = PushFeed::new(ms(66));
        assert!(push_session.frame_from_feed(ms(0), &mut push, &host).is_none());
        push.push(ms(1), vehicle(4.0));
        let pushed = push_session.frame_from_feed(ms(1), &mut push, &host).unwrap();

        let mut poll = PollFeed::new(ms(33), || Some(vehicle(4.0)));
        let polled = poll_session.frame_from_feed(ms(1), &mut poll, &host).unwrap();

        assert_eq!(pushed.trail, polled.trail);
        assert_relative_eq!(pushed.trail[0].position.z, 4.0);
    }

    #[test]
    fn test_stale_push_stops_rendering() {
        let mut session = VizSession::new(VizConfig::default()).unwrap();
        let host = HostFrame {
            vehicle: None,
            ..ready(0.0)
        };
        let mut push = PushFeed::new(ms(66));
        push.push(ms(0), vehicle(1.0));

        let rendered = (0..21u64)
            .filter_map(|i| session.frame_from_feed(ms(i * 100), &mut push, &host))
            .count();

        assert_eq!(rendered, 1);
        assert_eq!(session.trail().len(), 1);
    }

    #[test]
    fn test_failed_poll_stops_rendering() {
        let mut session = VizSession::new(VizConfig::default()).unwrap();
        let host = HostFrame {
            vehicle: None,
            ..ready(0.0)
        };
        let mut first = true;
        let mut poll = PollFeed::new(ms(50), move || {
            let out = first.then(|| vehicle(1.0));
            first = false;
            out
        });

        let rendered = (0..20u64)
            .filter_map(|i| session.frame_from_feed(ms(i * 50), &mut poll, &host))
            .count();

        assert_eq!(rendered, 1);
        assert_eq!(session.trail().len(), 1);
    }
}
