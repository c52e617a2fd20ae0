//! Rerun visualization for simulation runs.
//!
//! Optional: only available with the `visualization` feature.
//!
//! # What Gets Logged
//!
//! - Ground-truth car as a yellow point
//! - Trail as one green line strip
//! - Predicted path as per-segment strips in their severity colors
//! - Trail length and drawn segment count as scalars

use crate::runner::{FrameRecord, FrameSink};
#[cfg(feature = "visualization")]
use rerun::{Color, LineStrips3D, Points3D, Position3D, Radius, RecordingStream};

/// Rerun logger for simulation visualization.
pub struct RerunLogger {
    #[cfg(feature = "visualization")]
    rec: Option<RecordingStream>,

    enabled: bool,
}

impl RerunLogger {
    /// Creates a new logger with visualization disabled.
    pub fn disabled() -> Self {
        Self {
            #[cfg(feature = "visualization")]
            rec: None,
            enabled: false,
        }
    }

    /// Spawns a viewer and streams into it.
    #[cfg(feature = "visualization")]
    pub fn new(name: &str) -> Self {
        match rerun::RecordingStreamBuilder::new(name).spawn() {
            Ok(rec) => {
                tracing::info!("Rerun visualization enabled");
                Self {
                    rec: Some(rec),
                    enabled: true,
                }
            }
            Err(e) => {
                tracing::warn!("Failed to initialize Rerun: {:?}", e);
                Self::disabled()
            }
        }
    }

    /// Creates a logger - returns disabled if visualization feature not enabled.
    #[cfg(not(feature = "visualization"))]
    pub fn new(_name: &str) -> Self {
        tracing::info!("Rerun visualization not available (compile with --features visualization)");
        Self::disabled()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[cfg(feature = "visualization")]
    fn log_frame(&self, frame: &FrameRecord<'_>) {
        let Some(rec) = &self.rec else { return };
        rec.set_time_seconds("sim_time", frame.now.as_secs_f64());

        let car = frame.truth.position;
        let _ = rec.log(
            "world/car",
            &Points3D::new([Position3D::new(car.x as f32, car.y as f32, car.z as f32)])
                .with_colors([Color::from_rgb(255, 255, 0)])
                .with_radii([Radius::new_scene_units(0.5)]),
        );

        let Some(out) = frame.output else {
            let _ = rec.log("world/trail", &rerun::Clear::flat());
            let _ = rec.log("world/prediction", &rerun::Clear::flat());
            return;
        };

        let trail: Vec<[f32; 3]> = out
            .trail
            .iter()
            .map(|s| [s.position.x as f32, s.position.y as f32, s.position.z as f32])
            .collect();
        let _ = rec.log(
            "world/trail",
            &LineStrips3D::new([trail]).with_colors([Color::from_rgb(0, 255, 150)]),
        );

        let samples = out.prediction.samples();
        let mut strips = Vec::with_capacity(out.prediction_segments.len());
        let mut colors = Vec::with_capacity(out.prediction_segments.len());
        for styled in &out.prediction_segments {
            let i = styled.segment.index;
            let (Some(a), Some(b)) = (samples.get(i), samples.get(i + 1)) else { continue };
            strips.push(vec![
                [a.position.x as f32, a.position.y as f32, a.position.z as f32],
                [b.position.x as f32, b.position.y as f32, b.position.z as f32],
            ]);
            let [r, g, b, a] = styled.style.rgba();
            colors.push(Color::from_unmultiplied_rgba(r, g, b, a));
        }
        let _ = rec.log(
            "world/prediction",
            &LineStrips3D::new(strips).with_colors(colors),
        );

        let _ = rec.log("metrics/trail_len", &rerun::Scalar::new(out.trail.len() as f64));
        let _ = rec.log(
            "metrics/segments_drawn",
            &rerun::Scalar::new(out.prediction_segments.len() as f64),
        );
    }

    #[cfg(not(feature = "visualization"))]
    fn log_frame(&self, _frame: &FrameRecord<'_>) {}
}

impl FrameSink for RerunLogger {
    fn record(&mut self, frame: &FrameRecord<'_>) {
        if self.enabled {
            self.log_frame(frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SimClock;
    use crate::runner::ScenarioRunner;
    use crate::scenarios::ScenarioId;

    #[tokio::test]
    async fn test_disabled_logger_is_a_valid_sink() {
        let mut logger = RerunLogger::disabled();
        assert!(!logger.is_enabled());

        let clock = SimClock::new(3);
        let result = ScenarioRunner::new(3)
            .with_duration(0.5)
            .run_on(&clock, ScenarioId::Stationary, &mut logger)
            .await;
        assert!(result.passed, "{:?}", result.failure_reason);
    }
}
