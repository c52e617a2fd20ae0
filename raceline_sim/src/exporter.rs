//! JSON exporter for offline inspection of a run.
//!
//! Frames carry the ground-truth vehicle next to the exact overlay output,
//! so a run can be replayed or plotted without re-simulating.

use crate::runner::{FrameRecord, FrameSink, ScenarioResult};
use raceline_core::FrameOutput;
use raceline_env::VehicleState;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// A single exported frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportFrame {
    /// Frame index within the run
    pub index: u64,

    /// Simulation time in seconds
    pub time_sec: f64,

    /// Ground truth, including while the host hides the car
    pub truth: VehicleState,

    /// Overlay output, absent on skipped frames
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<FrameOutput>,
}

/// Complete run export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimExport {
    /// Scenario name
    pub scenario: String,

    /// Seed used
    pub seed: u64,

    /// Duration in seconds
    pub duration_sec: f64,

    /// Only every n-th frame is kept
    pub frame_interval: u64,

    /// Exported frames
    pub frames: Vec<ExportFrame>,

    /// Final results
    pub passed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl SimExport {
    /// Creates a new export container keeping every frame.
    pub fn new(scenario: &str, seed: u64) -> Self {
        Self {
            scenario: scenario.to_string(),
            seed,
            duration_sec: 0.0,
            frame_interval: 1,
            frames: Vec::new(),
            passed: false,
            failure_reason: None,
        }
    }

    /// Keeps only every `n`-th frame.
    pub fn with_frame_interval(mut self, n: u64) -> Self {
        self.frame_interval = n.max(1);
        self
    }

    /// Adds a frame.
    pub fn add_frame(&mut self, frame: ExportFrame) {
        self.duration_sec = frame.time_sec;
        self.frames.push(frame);
    }

    /// Copies the verdict from a finished run.
    pub fn finalize(&mut self, result: &ScenarioResult) {
        self.passed = result.passed;
        self.failure_reason = result.failure_reason.clone();
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

impl FrameSink for SimExport {
    fn record(&mut self, frame: &FrameRecord<'_>) {
        if frame.index % self.frame_interval != 0 {
            return;
        }
        self.add_frame(ExportFrame {
            index: frame.index,
            time_sec: frame.now.as_secs_f64(),
            truth: frame.truth,
            output: frame.output.cloned(),
        });
    }
}
