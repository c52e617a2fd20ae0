//! Session configuration: every tunable in one serde struct.
//!
//! Near-duplicate overlay variants (different drag/accel, color policy,
//! pitch handling) are expressed as different values of [`VizConfig`]
//! rather than separate code paths.

use crate::error::ConfigError;
use crate::prediction::PredictorConfig;
use crate::projection::{FocalLength, MinimapProjector, ProjectorConfig};
use crate::severity::SeverityPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VizConfig {
    /// Trail capacity (`maxTrail`)
    pub max_trail: usize,

    /// Minimum time between trail samples in milliseconds (~30 Hz)
    pub sampling_interval_ms: u64,

    /// Whether the overlay starts visible
    pub start_enabled: bool,

    pub predictor: PredictorConfig,
    pub projector: ProjectorConfig,
    pub severity: SeverityPolicy,
    pub minimap: MinimapProjector,
}

impl Default for VizConfig {
    fn default() -> Self {
        Self {
            max_trail: 200,
            sampling_interval_ms: 33,
            start_enabled: true,
            predictor: PredictorConfig::default(),
            projector: ProjectorConfig::default(),
            severity: SeverityPolicy::default(),
            minimap: MinimapProjector::default(),
        }
    }
}

impl VizConfig {
    /// Parses and validates a JSON config. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: VizConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn sampling_interval(&self) -> Duration {
        Duration::from_millis(self.sampling_interval_ms)
    }

    /// Checks ranges that would make the pipeline degenerate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_trail == 0 {
            return Err(ConfigError::invalid("max_trail must be at least 1"));
        }
        if self.sampling_interval_ms == 0 {
            return Err(ConfigError::invalid("sampling_interval_ms must be positive"));
        }

        let p = &self.predictor;
        if p.steps == 0 {
            return Err(ConfigError::invalid("predictor.steps must be at least 1"));
        }
        if !(p.dt > 0.0 && p.dt.is_finite()) {
            return Err(ConfigError::invalid(format!(
                "predictor.dt must be positive, got {}",
                p.dt
            )));
        }
        if !(p.drag > 0.0 && p.drag <= 1.0) {
            return Err(ConfigError::invalid(format!(
                "predictor.drag must be in (0, 1], got {}",
                p.drag
            )));
        }
        if !(p.min_speed > 0.0) {
            return Err(ConfigError::invalid("predictor.min_speed must be positive"));
        }
        let finite = [
            p.accel,
            p.max_turn,
            p.phase_step,
            p.phase_rate,
            p.turn_gain,
            p.surface_offset,
            p.gravity,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::invalid("predictor tunables must be finite"));
        }

        if !(self.projector.near_plane > 0.0) {
            return Err(ConfigError::invalid("projector.near_plane must be positive"));
        }
        if let FocalLength::Fixed(f) = self.projector.focal {
            if !(f > 0.0 && f.is_finite()) {
                return Err(ConfigError::invalid(format!(
                    "projector.focal must be positive, got {}",
                    f
                )));
            }
        }

        match self.severity {
            SeverityPolicy::Curvature { k, .. } if !(k > 0.0) => {
                return Err(ConfigError::invalid("severity.k must be positive"));
            }
            SeverityPolicy::SpeedDelta {
                accel_threshold,
                brake_threshold,
                ..
            } if brake_threshold > accel_threshold => {
                return Err(ConfigError::invalid(format!(
                    "severity.brake_threshold ({}) above accel_threshold ({})",
                    brake_threshold, accel_threshold
                )));
            }
            _ => {}
        }

        if !(self.minimap.size > 0.0 && self.minimap.scale > 0.0) {
            return Err(ConfigError::invalid("minimap size and scale must be positive"));
        }

        Ok(())
    }
}
