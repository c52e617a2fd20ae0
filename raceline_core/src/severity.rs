//! Per-segment emphasis for the predicted path.
//!
//! Two policies exist and a session uses exactly one of them:
//!
//! - **Curvature**: turn angle between consecutive headings, weighted by
//!   speed, mapped continuously from green (hue 120) to red (hue 0) with
//!   line width growing alongside.
//! - **SpeedDelta**: the change in speed across a segment, bucketed into
//!   accelerating / steady / braking with fixed hues.

use crate::geometry::Sample;
use crate::prediction::PredictedPath;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

pub const BENIGN_HUE: f64 = 120.0;
pub const CRITICAL_HUE: f64 = 0.0;
pub const AMBER_HUE: f64 = 45.0;

/// Hue of the recorded trail (a green-teal, distinct from the prediction ramp)
pub const TRAIL_HUE: f64 = 155.0;
pub const TRAIL_WIDTH: f64 = 3.0;

/// Direction vectors shorter than this count as zero-length.
const MIN_DIRECTION_NORM: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum SeverityPolicy {
    Curvature {
        /// Normalizer: a turn of π radians at `k` m/s is fully critical
        k: f64,
        base_width: f64,
        width_gain: f64,
    },
    SpeedDelta {
        /// Δspeed above this is accelerating
        accel_threshold: f64,
        /// Δspeed below this is braking
        brake_threshold: f64,
        width: f64,
    },
}

impl Default for SeverityPolicy {
    fn default() -> Self {
        SeverityPolicy::Curvature {
            k: 40.0,
            base_width: 3.0,
            width_gain: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedBucket {
    Accelerating,
    Steady,
    Braking,
}

impl SpeedBucket {
    pub fn classify(delta: f64, accel_threshold: f64, brake_threshold: f64) -> Self {
        if delta > accel_threshold {
            SpeedBucket::Accelerating
        } else if delta < brake_threshold {
            SpeedBucket::Braking
        } else {
            SpeedBucket::Steady
        }
    }

    pub fn hue(&self) -> f64 {
        match self {
            SpeedBucket::Accelerating => BENIGN_HUE,
            SpeedBucket::Steady => AMBER_HUE,
            SpeedBucket::Braking => CRITICAL_HUE,
        }
    }
}

/// How a single segment should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentStyle {
    /// HSL hue in degrees
    pub hue: f64,
    /// Line width in pixels
    pub width: f64,
    /// Opacity in [0, 1]
    pub alpha: f64,
    /// Set only under the speed-delta policy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<SpeedBucket>,
}

impl SegmentStyle {
    /// CSS color string for canvas hosts.
    pub fn css(&self) -> String {
        format!("hsla({:.0}, 100%, 50%, {:.3})", self.hue, self.alpha)
    }

    /// RGBA bytes for the same fully saturated, mid-lightness color.
    pub fn rgba(&self) -> [u8; 4] {
        let h = self.hue.rem_euclid(360.0) / 60.0;
        let x = 1.0 - (h % 2.0 - 1.0).abs();
        let (r, g, b) = match h as u32 {
            0 => (1.0, x, 0.0),
            1 => (x, 1.0, 0.0),
            2 => (0.0, 1.0, x),
            3 => (0.0, x, 1.0),
            4 => (x, 0.0, 1.0),
            _ => (1.0, 0.0, x),
        };
        let byte = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [byte(r), byte(g), byte(b), byte(self.alpha)]
    }
}

/// Angle in radians between two ground-plane directions.
///
/// Zero-length inputs produce 0 rather than NaN.
pub fn turn_angle(prev: &Vector2<f64>, curr: &Vector2<f64>) -> f64 {
    let (np, nc) = (prev.norm(), curr.norm());
    if !(np > MIN_DIRECTION_NORM && nc > MIN_DIRECTION_NORM) {
        return 0.0;
    }
    let cos = (prev.dot(curr) / (np * nc)).clamp(-1.0, 1.0);
    cos.acos()
}

/// `clamp(turn_angle * average_speed / (π * k), 0, 1)`, NaN mapped to 0.
pub fn sharpness(turn_angle: f64, average_speed: f64, k: f64) -> f64 {
    let raw = turn_angle * average_speed / (PI * k);
    if raw.is_nan() {
        0.0
    } else {
        raw.clamp(0.0, 1.0)
    }
}

/// Linear hue ramp from benign (0) to critical (1).
pub fn sharpness_hue(sharpness: f64) -> f64 {
    BENIGN_HUE + (CRITICAL_HUE - BENIGN_HUE) * sharpness
}

/// Opacity of trail segment `index` for a trail of `len` samples: old segments fade out.
pub fn trail_alpha(index: usize, len: usize) -> f64 {
    if len == 0 {
        return 0.0;
    }
    (index as f64 / len as f64).clamp(0.0, 1.0)
}

/// Opacity of prediction segment `index` for a path of `len` samples: far segments fade out.
pub fn prediction_alpha(index: usize, len: usize) -> f64 {
    if len == 0 {
        return 0.0;
    }
    (1.0 - index as f64 / len as f64).clamp(0.0, 1.0)
}

/// Style for trail segment `index` of a trail holding `len` samples.
pub fn trail_style(index: usize, len: usize) -> SegmentStyle {
    SegmentStyle {
        hue: TRAIL_HUE,
        width: TRAIL_WIDTH,
        alpha: trail_alpha(index, len),
        bucket: None,
    }
}

/// Applies one [`SeverityPolicy`] to whole predicted paths.
#[derive(Debug, Clone, Default)]
pub struct SeverityClassifier {
    policy: SeverityPolicy,
}

impl SeverityClassifier {
    pub fn new(policy: SeverityPolicy) -> Self {
        Self { policy }
    }

    /// One style per segment of `path` (`path.len() - 1` entries).
    pub fn classify_path(&self, path: &PredictedPath) -> Vec<SegmentStyle> {
        let samples = path.samples();
        let n = samples.len();

        path.segments()
            .map(|(i, a, b)| {
                let prev = if i == 0 { None } else { Some(&samples[i - 1]) };
                let mut style = self.classify_segment(prev, a, b);
                style.alpha = prediction_alpha(i, n);
                style
            })
            .collect()
    }

    /// Styles the segment `a -> b`; `prev` is the sample before `a`, if any.
    ///
    /// Without a previous sample the heading is taken as unchanged. The
    /// returned alpha is fully opaque.
    pub fn classify_segment(&self, prev: Option<&Sample>, a: &Sample, b: &Sample) -> SegmentStyle {
        match self.policy {
            SeverityPolicy::Curvature { k, base_width, width_gain } => {
                let curr_dir = a.ground_delta(b);
                let prev_dir = prev.map_or(curr_dir, |p| p.ground_delta(a));
                let s = sharpness(turn_angle(&prev_dir, &curr_dir), (a.speed + b.speed) / 2.0, k);
                SegmentStyle {
                    hue: sharpness_hue(s),
                    width: base_width + width_gain * s,
                    alpha: 1.0,
                    bucket: None,
                }
            }
            SeverityPolicy::SpeedDelta { accel_threshold, brake_threshold, width } => {
                let bucket =
                    SpeedBucket::classify(b.speed - a.speed, accel_threshold, brake_threshold);
                SegmentStyle {
                    hue: bucket.hue(),
                    width,
                    alpha: 1.0,
                    bucket: Some(bucket),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point3, Velocity3};
    use crate::prediction::{PredictorConfig, SteeringPhase, TrajectoryPredictor};
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn at(x: f64, z: f64, speed: f64) -> Sample {
        Sample::new(Point3::new(x, 0.0, z), speed)
    }

    fn speed_delta() -> SeverityClassifier {
        SeverityClassifier::new(SeverityPolicy::SpeedDelta {
            accel_threshold: 0.5,
            brake_threshold: -0.5,
            width: 5.0,
        })
    }

    #[test]
    fn test_turn_angle_basics() {
        let east = Vector2::new(1.0, 0.0);
        let north = Vector2::new(0.0, 2.0);
        assert_relative_eq!(turn_angle(&east, &east), 0.0);
        assert_relative_eq!(turn_angle(&east, &north), PI / 2.0, epsilon = 1e-12);
        assert_relative_eq!(turn_angle(&east, &-east), PI, epsilon = 1e-12);
        assert_eq!(turn_angle(&Vector2::zeros(), &north), 0.0);
    }

    #[test]
    fn test_straight_path_is_benign() {
        let classifier = SeverityClassifier::default();
        let style = classifier.classify_segment(
            Some(&at(0.0, 0.0, 30.0)),
            &at(0.0, 1.0, 30.0),
            &at(0.0, 2.0, 30.0),
        );
        assert_relative_eq!(style.hue, BENIGN_HUE);
        assert_relative_eq!(style.width, 3.0);
    }

    #[test]
    fn test_sharp_fast_turn_is_critical() {
        let classifier = SeverityClassifier::default();
        // 90 degree turn at 80 m/s: 0.5π·80 / 40π = 1.0
        let style = classifier.classify_segment(
            Some(&at(0.0, 0.0, 80.0)),
            &at(0.0, 1.0, 80.0),
            &at(1.0, 1.0, 80.0),
        );
        assert_relative_eq!(style.hue, CRITICAL_HUE, epsilon = 1e-9);
        assert_relative_eq!(style.width, 8.0, epsilon = 1e-9);
    }

    #[test]
    fn test_hue_interpolates_linearly() {
        assert_relative_eq!(sharpness_hue(0.25), 90.0);
        assert_relative_eq!(sharpness(PI / 2.0, 40.0, 40.0), 0.5);
    }

    #[test]
    fn test_speed_delta_buckets() {
        let classifier = speed_delta();
        let accel = classifier.classify_segment(None, &at(0.0, 0.0, 10.0), &at(0.0, 1.0, 11.0));
        let steady = classifier.classify_segment(None, &at(0.0, 0.0, 10.0), &at(0.0, 1.0, 10.2));
        let brake = classifier.classify_segment(None, &at(0.0, 0.0, 10.0), &at(0.0, 1.0, 8.0));

        assert_eq!(accel.bucket, Some(SpeedBucket::Accelerating));
        assert_eq!(steady.bucket, Some(SpeedBucket::Steady));
        assert_eq!(brake.bucket, Some(SpeedBucket::Braking));
        assert_eq!(brake.hue, CRITICAL_HUE);
        assert_eq!(steady.hue, AMBER_HUE);
    }

    #[test]
    fn test_classify_path_one_style_per_segment() {
        let predictor = TrajectoryPredictor::new(PredictorConfig::default());
        let path = predictor.predict(
            Point3::origin(),
            Velocity3::new(5.0, 0.0, 20.0),
            SteeringPhase(1.0),
        );
        let styles = SeverityClassifier::default().classify_path(&path);

        assert_eq!(styles.len(), path.len() - 1);
        assert_relative_eq!(styles[0].alpha, 1.0);
        assert!(styles.windows(2).all(|w| w[1].alpha < w[0].alpha));
        assert!(styles.iter().all(|s| s.bucket.is_none()));
    }

    #[test]
    fn test_stationary_path_has_no_nan() {
        let predictor = TrajectoryPredictor::default();
        let path = predictor.predict(Point3::origin(), Velocity3::zeros(), SteeringPhase(0.0));

        for classifier in [SeverityClassifier::default(), speed_delta()] {
            for style in classifier.classify_path(&path) {
                assert!(style.hue.is_finite() && style.width.is_finite());
            }
        }
    }

    #[test]
    fn test_fade_alphas() {
        assert_eq!(trail_alpha(0, 10), 0.0);
        assert_relative_eq!(trail_alpha(5, 10), 0.5);
        assert_eq!(prediction_alpha(0, 10), 1.0);
        assert_relative_eq!(prediction_alpha(9, 10), 0.1);
        assert_eq!(trail_alpha(3, 0), 0.0);
    }

    #[test]
    fn test_rgba() {
        let green = SegmentStyle { hue: BENIGN_HUE, width: 1.0, alpha: 1.0, bucket: None };
        let red = SegmentStyle { hue: CRITICAL_HUE, alpha: 0.5, ..green };
        assert_eq!(green.rgba(), [0, 255, 0, 255]);
        assert_eq!(red.rgba(), [255, 0, 0, 128]);
    }

    #[test]
    fn test_css() {
        let style = trail_style(1, 4);
        assert_eq!(style.css(), "hsla(155, 100%, 50%, 0.250)");
    }

    proptest! {
        #[test]
        fn prop_curvature_hue_in_range(
            px in -1e3f64..1e3, pz in -1e3f64..1e3,
            cx in -1e3f64..1e3, cz in -1e3f64..1e3,
            speed in 0.0f64..1e4,
            zero_prev in any::<bool>(),
        ) {
            let prev = if zero_prev { Vector2::zeros() } else { Vector2::new(px, pz) };
            let s = sharpness(turn_angle(&prev, &Vector2::new(cx, cz)), speed, 40.0);
            let hue = sharpness_hue(s);

            prop_assert!((0.0..=1.0).contains(&s));
            prop_assert!((CRITICAL_HUE..=BENIGN_HUE).contains(&hue));
        }

        #[test]
        fn prop_speed_delta_hue_in_range(a in -1e4f64..1e4, b in -1e4f64..1e4) {
            let style = speed_delta().classify_segment(None, &at(0.0, 0.0, a), &at(0.0, 1.0, b));
            prop_assert!(style.bucket.is_some());
            prop_assert!((CRITICAL_HUE..=BENIGN_HUE).contains(&style.hue));
        }
    }
}
