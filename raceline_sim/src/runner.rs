//! Scenario runner - drives the overlay pipeline frame by frame.

use crate::context::SimClock;
use crate::oracle::{DriveProfile, Ramp, TrackOracle};
use crate::scenarios::ScenarioId;

use raceline_core::severity::{turn_angle, BENIGN_HUE, CRITICAL_HUE};
use raceline_core::{
    FrameOutput, PollFeed, PushFeed, SeverityPolicy, UserIntent, VehicleState, VizConfig,
    VizSession,
};
use raceline_env::{FrameClock, HostBridge};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Poll cadence of the poll-feed scenario.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Slack around blackout edges, where frame time and host time can differ
/// by float rounding.
const EDGE_MARGIN: f64 = 0.001;

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Whether scenario passed all assertions
    pub passed: bool,

    /// Total frames executed
    pub total_frames: u64,

    /// Final simulation time in seconds
    pub final_time_secs: f64,

    /// Failure message if any
    pub failure_reason: Option<String>,

    /// Metrics collected during run
    pub metrics: ScenarioMetrics,
}

/// Metrics collected during scenario execution.
#[derive(Debug, Clone, Default)]
pub struct ScenarioMetrics {
    /// Frames that produced output
    pub frames_rendered: u64,

    /// Frames skipped (disabled or host not ready)
    pub frames_skipped: u64,

    /// Frames that appended to the trail
    pub trail_samples: u64,

    /// Largest trail length observed
    pub max_trail_len: usize,

    /// Prediction segments handed to the renderer
    pub segments_drawn: u64,

    /// Prediction segments dropped for an unprojectable endpoint
    pub segments_culled: u64,

    /// User intents applied to the session
    pub intents_handled: u64,
}

/// How vehicle state reaches the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedMode {
    /// Read straight from the host snapshot
    Direct,
    /// Pushed by a host update hook
    Push,
    /// Polled from host globals at a fixed interval
    Poll(Duration),
}

/// One frame as seen by a [`FrameSink`].
#[derive(Debug, Clone, Copy)]
pub struct FrameRecord<'a> {
    pub index: u64,
    pub now: Duration,
    /// Ground truth, even while the host hides the vehicle
    pub truth: VehicleState,
    pub output: Option<&'a FrameOutput>,
}

/// Receives every frame of a run (exporters, viewers).
pub trait FrameSink {
    fn record(&mut self, frame: &FrameRecord<'_>);
}

/// Discards frames.
pub struct NullSink;

impl FrameSink for NullSink {
    fn record(&mut self, _frame: &FrameRecord<'_>) {}
}

/// Render-callback driver.
///
/// Each iteration advances the host to the clock, applies pending intents,
/// runs one session frame and then yields at the frame boundary.
pub struct FrameLoop {
    frame_interval: Duration,
    jitter: Option<Normal<f64>>,
    rng: ChaCha8Rng,
}

impl FrameLoop {
    /// Creates a loop at `fps` frames per second without jitter.
    pub fn new(seed: u64, fps: u32) -> Self {
        Self {
            frame_interval: Duration::from_secs_f64(1.0 / fps.max(1) as f64),
            jitter: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Adds zero-mean Gaussian jitter (milliseconds) to every frame interval.
    pub fn with_jitter(mut self, std_ms: f64) -> Self {
        self.jitter = Normal::new(0.0, std_ms).ok();
        self
    }

    fn next_interval(&mut self) -> Duration {
        let base = self.frame_interval.as_secs_f64();
        let jitter_ms = self
            .jitter
            .map_or(0.0, |normal| normal.sample(&mut self.rng));
        Duration::from_secs_f64((base + jitter_ms / 1000.0).max(0.001))
    }

    /// Runs `frames` render callbacks.
    pub async fn run<C: FrameClock>(
        &mut self,
        clock: &C,
        oracle: &mut TrackOracle,
        session: &mut VizSession,
        feed: FeedMode,
        frames: u64,
        metrics: &mut ScenarioMetrics,
        mut observe: impl FnMut(&FrameRecord<'_>),
    ) {
        // Stands in for the host globals a poll-based adapter reads.
        let host_globals: Rc<Cell<Option<VehicleState>>> = Rc::new(Cell::new(None));
        let globals = Rc::clone(&host_globals);
        let poll_interval = match feed {
            FeedMode::Poll(interval) => interval,
            _ => Duration::ZERO,
        };
        let mut poll = PollFeed::new(poll_interval, move || globals.get());
        let mut push = PushFeed::new(session.config().sampling_interval() * 2);

        for index in 0..frames {
            let now = clock.now();
            oracle.advance_to(now);

            for intent in oracle.drain_intents() {
                debug!("Frame {}: intent {}", index, intent);
                session.handle(intent);
                metrics.intents_handled += 1;
            }

            let host = oracle.frame();
            let output = match feed {
                FeedMode::Direct => session.frame(now, &host),
                FeedMode::Push => {
                    if let Some(vehicle) = host.vehicle {
                        push.push(now, vehicle);
                    }
                    session.frame_from_feed(now, &mut push, &host)
                }
                FeedMode::Poll(_) => {
                    host_globals.set(host.vehicle);
                    session.frame_from_feed(now, &mut poll, &host)
                }
            };

            match &output {
                Some(out) => {
                    metrics.frames_rendered += 1;
                    if out.sampled {
                        metrics.trail_samples += 1;
                    }
                    metrics.max_trail_len = metrics.max_trail_len.max(out.trail.len());
                    let possible = out.prediction.len().saturating_sub(1) as u64;
                    let drawn = out.prediction_segments.len() as u64;
                    metrics.segments_drawn += drawn;
                    metrics.segments_culled += possible - drawn;
                }
                None => metrics.frames_skipped += 1,
            }

            observe(&FrameRecord {
                index,
                now,
                truth: oracle.true_state(),
                output: output.as_ref(),
            });

            clock.sleep(self.next_interval()).await;
        }
    }
}

/// Frame summary kept for post-run assertions.
struct Observed {
    now: Duration,
    truth: VehicleState,
    output: Option<FrameOutput>,
}

/// Checks the per-frame guarantees that hold in every scenario.
pub fn check_frame(config: &VizConfig, out: &FrameOutput) -> Result<(), String> {
    if out.trail.len() > config.max_trail {
        return Err(format!("trail length {} exceeds {}", out.trail.len(), config.max_trail));
    }
    if out.prediction.len() != config.predictor.steps + 1 {
        return Err(format!(
            "prediction length {} != {}",
            out.prediction.len(),
            config.predictor.steps + 1
        ));
    }

    let near = config.projector.near_plane;
    for styled in out.trail_segments.iter().chain(out.prediction_segments.iter()) {
        let seg = &styled.segment;
        if !(seg.from.depth > near && seg.to.depth > near) {
            return Err(format!("segment {} at depth <= near plane", seg.index));
        }
        if ![seg.from.x, seg.from.y, seg.to.x, seg.to.y].iter().all(|c| c.is_finite()) {
            return Err(format!("segment {} has non-finite screen coordinates", seg.index));
        }
        if !(0.0..=1.0).contains(&styled.style.alpha) || !styled.style.width.is_finite() {
            return Err(format!("segment {} has invalid style {:?}", seg.index, styled.style));
        }
    }
    for styled in &out.prediction_segments {
        if !(CRITICAL_HUE..=BENIGN_HUE).contains(&styled.style.hue) {
            return Err(format!("prediction hue {} out of range", styled.style.hue));
        }
    }

    let samples_finite = out
        .trail
        .iter()
        .chain(out.prediction.samples())
        .all(|s| s.speed.is_finite() && s.position.iter().all(|c| c.is_finite()));
    if !samples_finite {
        return Err("non-finite sample".to_string());
    }

    Ok(())
}

/// Runs overlay scenarios.
pub struct ScenarioRunner {
    /// Configuration seed
    seed: u64,

    /// Render callback rate
    fps: u32,

    /// Duration in seconds
    duration_secs: f64,

    /// Base session configuration
    config: VizConfig,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            fps: 60,
            duration_secs: 5.0,
            config: VizConfig::default(),
        }
    }

    /// Sets the render rate.
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps.max(1);
        self
    }

    /// Sets the duration.
    pub fn with_duration(mut self, secs: f64) -> Self {
        self.duration_secs = secs;
        self
    }

    /// Sets the base session configuration.
    pub fn with_config(mut self, config: VizConfig) -> Self {
        self.config = config;
        self
    }

    /// Runs a scenario on a fresh virtual clock.
    pub async fn run(&self, scenario: ScenarioId) -> ScenarioResult {
        let clock = SimClock::new(self.seed);
        self.run_on(&clock, scenario, &mut NullSink).await
    }

    /// Runs a scenario on the given clock, reporting every frame to `sink`.
    pub async fn run_on<C: FrameClock>(
        &self,
        clock: &C,
        scenario: ScenarioId,
        sink: &mut dyn FrameSink,
    ) -> ScenarioResult {
        info!("Starting scenario: {} (seed={})", scenario.name(), self.seed);

        let duration = self.duration_secs;
        let mut config = self.config.clone();
        let mut feed = FeedMode::Direct;
        let mut frame_loop = FrameLoop::new(self.seed, self.fps);

        let mut oracle = match scenario {
            ScenarioId::Straight
            | ScenarioId::FrameJitter
            | ScenarioId::Reset
            | ScenarioId::PushFeed
            | ScenarioId::PollFeed => TrackOracle::new(DriveProfile::Straight { speed: 30.0 }),
            ScenarioId::Hairpin => TrackOracle::new(DriveProfile::Circle {
                speed: 20.0,
                radius: 25.0,
            }),
            ScenarioId::Braking => TrackOracle::new(DriveProfile::Braking {
                speed: 40.0,
                decel: 12.0,
            }),
            ScenarioId::Stationary => TrackOracle::new(DriveProfile::Stationary),
            ScenarioId::Blackout => TrackOracle::new(DriveProfile::Straight { speed: 25.0 }),
            ScenarioId::Jump => TrackOracle::new(DriveProfile::Jump {
                speed: 20.0,
                ramp: Ramp { start_z: 10.0, length: 10.0, height: 2.0 },
            }),
        };

        if matches!(
            scenario,
            ScenarioId::Blackout | ScenarioId::PushFeed | ScenarioId::PollFeed
        ) {
            let (from, to) = self.blackout_window();
            oracle = oracle.with_blackout(from, to);
        }

        match scenario {
            ScenarioId::Braking => {
                config.severity = SeverityPolicy::SpeedDelta {
                    accel_threshold: 0.3,
                    brake_threshold: -0.3,
                    width: 5.0,
                };
            }
            ScenarioId::FrameJitter => frame_loop = frame_loop.with_jitter(6.0),
            ScenarioId::Reset => oracle.schedule_intent(duration / 2.0, UserIntent::ClearTrail),
            ScenarioId::PushFeed => feed = FeedMode::Push,
            ScenarioId::PollFeed => feed = FeedMode::Poll(POLL_INTERVAL),
            _ => {}
        }

        let mut session = match VizSession::new(config.clone()) {
            Ok(session) => session,
            Err(e) => {
                warn!("Invalid session config: {}", e);
                return ScenarioResult {
                    scenario,
                    seed: self.seed,
                    passed: false,
                    total_frames: 0,
                    final_time_secs: 0.0,
                    failure_reason: Some(format!("invalid config: {}", e)),
                    metrics: ScenarioMetrics::default(),
                };
            }
        };

        let frames = (duration * self.fps as f64).round() as u64;
        let mut metrics = ScenarioMetrics::default();
        let mut observed: Vec<Observed> = Vec::with_capacity(frames as usize);
        let mut violation: Option<String> = None;

        frame_loop
            .run(clock, &mut oracle, &mut session, feed, frames, &mut metrics, |record| {
                sink.record(record);
                if let Some(out) = record.output {
                    if violation.is_none() {
                        if let Err(e) = check_frame(&config, out) {
                            violation = Some(format!("frame {}: {}", record.index, e));
                        }
                    }
                }
                observed.push(Observed {
                    now: record.now,
                    truth: record.truth,
                    output: record.output.cloned(),
                });
            })
            .await;

        let failure = violation.or_else(|| {
            self.check_scenario(scenario, &config, &observed, &metrics)
                .err()
        });
        let passed = failure.is_none();

        info!(
            "{} complete: {} rendered, {} skipped, {} samples, {} segments drawn / {} culled",
            scenario.name(),
            metrics.frames_rendered,
            metrics.frames_skipped,
            metrics.trail_samples,
            metrics.segments_drawn,
            metrics.segments_culled
        );

        ScenarioResult {
            scenario,
            seed: self.seed,
            passed,
            total_frames: frames,
            final_time_secs: oracle.time(),
            failure_reason: failure,
            metrics,
        }
    }

    /// The middle third of the run, when blackout scenarios hide the car.
    fn blackout_window(&self) -> (f64, f64) {
        (self.duration_secs / 3.0, 2.0 * self.duration_secs / 3.0)
    }

    fn check_scenario(
        &self,
        scenario: ScenarioId,
        config: &VizConfig,
        observed: &[Observed],
        metrics: &ScenarioMetrics,
    ) -> Result<(), String> {
        let outputs: Vec<&FrameOutput> =
            observed.iter().filter_map(|o| o.output.as_ref()).collect();
        let last = outputs.last().ok_or("no frame rendered")?;
        let span = observed.last().map_or(0.0, |o| o.now.as_secs_f64()).max(1e-9);
        let rate = metrics.trail_samples as f64 / span;

        match scenario {
            ScenarioId::Straight => {
                if metrics.frames_skipped > 0 {
                    return Err(format!("{} frames skipped", metrics.frames_skipped));
                }
                if !(27.0..=31.0).contains(&rate) {
                    return Err(format!("sampling rate {:.1} Hz, expected ~30 Hz", rate));
                }
                check_gate_spacing(observed, config.sampling_interval())?;
                check_prediction_leads(observed)?;
            }

            ScenarioId::PushFeed => {
                let (from, to) = self.blackout_window();
                check_feed_dropout(observed, from, to, config.sampling_interval() * 2)?;
                check_gate_spacing(observed, config.sampling_interval())?;
                check_prediction_leads(observed)?;
            }

            ScenarioId::Hairpin => {
                let trail = &last.trail;
                if trail.len() >= 4 && span >= 1.0 {
                    let first = trail[0].ground_delta(&trail[1]);
                    let latest = trail[trail.len() - 2].ground_delta(&trail[trail.len() - 1]);
                    let turned = turn_angle(&first, &latest);
                    if turned < 0.5 {
                        return Err(format!("trail turned only {:.2} rad", turned));
                    }
                }
                if metrics.segments_culled > 0 {
                    return Err(format!(
                        "{} prediction segments culled behind chase camera",
                        metrics.segments_culled
                    ));
                }
            }

            ScenarioId::Braking => {
                let speeds: Vec<f64> = last.trail.iter().map(|s| s.speed).collect();
                if speeds.windows(2).any(|w| w[1] > w[0] + 1e-9) {
                    return Err("trail speed increased while braking".to_string());
                }
                if outputs
                    .iter()
                    .any(|out| out.prediction_segments.iter().any(|s| s.style.bucket.is_none()))
                {
                    return Err("speed-delta policy produced an unbucketed segment".to_string());
                }
            }

            ScenarioId::Stationary => {
                for out in &outputs {
                    let start = out.prediction.samples()[0].position;
                    if out.prediction.samples().iter().any(|s| s.position != start) {
                        return Err("parked car has a moving prediction".to_string());
                    }
                }
            }

            ScenarioId::FrameJitter => {
                if !(20.0..=31.0).contains(&rate) {
                    return Err(format!("sampling rate {:.1} Hz under jitter", rate));
                }
                check_gate_spacing(observed, config.sampling_interval())?;
            }

            ScenarioId::Reset => {
                let reset_at = Duration::from_secs_f64(self.duration_secs / 2.0);
                let after = observed
                    .iter()
                    .find(|o| o.now >= reset_at)
                    .and_then(|o| o.output.as_ref())
                    .ok_or("no frame after reset")?;
                if after.trail.len() != 1 || !after.sampled {
                    return Err(format!(
                        "trail held {} samples right after reset",
                        after.trail.len()
                    ));
                }
                let half_ms = self.duration_secs / 2.0 * 1000.0;
                let max_after = (half_ms / config.sampling_interval_ms as f64).ceil() as usize + 1;
                if last.trail.len() > max_after {
                    return Err(format!(
                        "{} samples survived reset (max {})",
                        last.trail.len(),
                        max_after
                    ));
                }
            }

            ScenarioId::Blackout => {
                let mut before: Option<usize> = None;
                let mut in_window = false;
                for o in observed {
                    match &o.output {
                        None => in_window = true,
                        Some(out) if in_window => {
                            let prev = before.ok_or("blackout started before any frame")?;
                            if out.trail.len() > prev + 1 {
                                return Err("trail grew during blackout".to_string());
                            }
                            break;
                        }
                        Some(out) => before = Some(out.trail.len()),
                    }
                }
                if metrics.frames_skipped == 0 {
                    return Err("blackout skipped no frames".to_string());
                }
            }

            ScenarioId::Jump => {
                let mut landed_in_prediction = false;
                for o in observed.iter().filter(|o| o.truth.position.y > 0.1) {
                    let Some(out) = &o.output else { continue };
                    let heights: Vec<f64> =
                        out.prediction.samples().iter().map(|s| s.position.y).collect();
                    if heights.iter().any(|y| *y < 0.0) {
                        return Err("prediction went below the ground".to_string());
                    }
                    if heights.iter().skip(1).any(|y| *y == 0.0) {
                        landed_in_prediction = true;
                    }
                }
                if span >= 2.0 && !landed_in_prediction {
                    return Err("no airborne prediction reached the ground".to_string());
                }
            }

            ScenarioId::PollFeed => {
                let (from, to) = self.blackout_window();
                check_feed_dropout(observed, from, to, POLL_INTERVAL * 2)?;

                let trail = &last.trail;
                if trail.windows(2).any(|w| w[1].position.z < w[0].position.z) {
                    return Err("polled trail went backwards".to_string());
                }
                // 33 ms sampling over a 50 ms poll must repeat some states.
                if trail.len() > 3 && !trail.windows(2).any(|w| w[0].position == w[1].position) {
                    return Err("poll interval not visible in trail".to_string());
                }
            }
        }

        Ok(())
    }
}

/// The predicted endpoint must lie ahead of the car (+Z profiles only).
fn check_prediction_leads(observed: &[Observed]) -> Result<(), String> {
    for o in observed {
        let Some(out) = &o.output else { continue };
        let end = out.prediction.endpoint().ok_or("empty prediction")?;
        if end.position.z <= o.truth.position.z {
            return Err("prediction does not lead the car".to_string());
        }
    }
    Ok(())
}

/// A feed may serve the vehicle for at most `grace` after the host stops
/// reporting it, and must recover within `grace` once it reports again.
fn check_feed_dropout(
    observed: &[Observed],
    from: f64,
    to: f64,
    grace: Duration,
) -> Result<(), String> {
    let grace = grace.as_secs_f64();
    for o in observed {
        let t = o.now.as_secs_f64();
        let rendered = o.output.is_some();
        if t < from - EDGE_MARGIN && !rendered {
            return Err(format!("feed dropped the vehicle at {:.3}s", t));
        }
        if t >= from + grace && t < to - EDGE_MARGIN && rendered {
            return Err(format!("stale vehicle rendered at {:.3}s", t));
        }
        if t >= to + grace && !rendered {
            return Err(format!("feed did not recover at {:.3}s", t));
        }
    }
    Ok(())
}

/// Consecutive trail samples must be at least one sampling interval apart.
fn check_gate_spacing(observed: &[Observed], interval: Duration) -> Result<(), String> {
    let mut last: Option<Duration> = None;
    for o in observed {
        let Some(out) = &o.output else { continue };
        if !out.sampled {
            continue;
        }
        if let Some(prev) = last {
            if o.now - prev < interval {
                return Err(format!("samples {:?} apart at {:?}", o.now - prev, o.now));
            }
        }
        last = Some(o.now);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn run(scenario: ScenarioId, secs: f64) -> ScenarioResult {
        ScenarioRunner::new(42).with_duration(secs).run(scenario).await
    }

    #[tokio::test]
    async fn test_straight_scenario() {
        let result = run(ScenarioId::Straight, 2.0).await;

        assert!(result.passed, "{:?}", result.failure_reason);
        assert_eq!(result.total_frames, 120);
        assert_eq!(result.metrics.trail_samples, 60);
    }

    #[tokio::test]
    async fn test_trail_caps_on_long_runs() {
        let result = run(ScenarioId::Straight, 10.0).await;

        assert!(result.passed, "{:?}", result.failure_reason);
        assert_eq!(result.metrics.max_trail_len, 200);
    }

    #[tokio::test]
    async fn test_hairpin_scenario() {
        let result = run(ScenarioId::Hairpin, 3.0).await;
        assert!(result.passed, "{:?}", result.failure_reason);
    }

    #[tokio::test]
    async fn test_braking_scenario() {
        let result = run(ScenarioId::Braking, 4.0).await;
        assert!(result.passed, "{:?}", result.failure_reason);
    }

    #[tokio::test]
    async fn test_stationary_scenario() {
        let result = run(ScenarioId::Stationary, 1.0).await;
        assert!(result.passed, "{:?}", result.failure_reason);
    }

    #[tokio::test]
    async fn test_frame_jitter_scenario() {
        let result = run(ScenarioId::FrameJitter, 3.0).await;
        assert!(result.passed, "{:?}", result.failure_reason);
    }

    #[tokio::test]
    async fn test_reset_scenario() {
        let result = run(ScenarioId::Reset, 2.0).await;

        assert!(result.passed, "{:?}", result.failure_reason);
        assert_eq!(result.metrics.intents_handled, 1);
    }

    #[tokio::test]
    async fn test_blackout_scenario() {
        let result = run(ScenarioId::Blackout, 3.0).await;

        assert!(result.passed, "{:?}", result.failure_reason);
        assert!(result.metrics.frames_skipped >= 55);
    }

    #[tokio::test]
    async fn test_jump_scenario() {
        let result = run(ScenarioId::Jump, 3.0).await;
        assert!(result.passed, "{:?}", result.failure_reason);
    }

    #[tokio::test]
    async fn test_feed_scenarios() {
        for scenario in [ScenarioId::PushFeed, ScenarioId::PollFeed] {
            let result = run(scenario, 2.0).await;
            assert!(result.passed, "{}: {:?}", scenario, result.failure_reason);
            // 40 frames of host blackout, minus at most 100 ms of stale state.
            assert!(result.metrics.frames_skipped >= 30, "{}", scenario);
            assert!(result.metrics.frames_skipped <= 40, "{}", scenario);
        }
    }

    #[tokio::test]
    async fn test_push_feed_goes_quiet_during_blackout() {
        let clock = SimClock::new(5);
        let mut oracle =
            TrackOracle::new(DriveProfile::Straight { speed: 30.0 }).with_blackout(0.5, 1.5);
        let mut session = VizSession::new(VizConfig::default()).unwrap();
        let mut metrics = ScenarioMetrics::default();
        let mut trail_during = Vec::new();

        FrameLoop::new(5, 60)
            .run(&clock, &mut oracle, &mut session, FeedMode::Push, 120, &mut metrics, |r| {
                let t = r.now.as_secs_f64();
                if (0.6..1.5).contains(&t) {
                    trail_during.push(r.output.map(|o| o.trail.len()));
                }
            })
            .await;

        assert!(trail_during.iter().all(Option::is_none));
        assert_eq!(metrics.frames_rendered + metrics.frames_skipped, 120);
    }

    #[tokio::test]
    async fn test_same_seed_same_metrics() {
        let a = run(ScenarioId::FrameJitter, 2.0).await;
        let b = run(ScenarioId::FrameJitter, 2.0).await;

        assert_eq!(a.metrics.trail_samples, b.metrics.trail_samples);
        assert_eq!(a.final_time_secs, b.final_time_secs);
    }

    #[tokio::test]
    async fn test_invalid_config_fails_cleanly() {
        let mut config = VizConfig::default();
        config.max_trail = 0;

        let result = ScenarioRunner::new(1).with_config(config).run(ScenarioId::Straight).await;
        assert!(!result.passed);
        assert_eq!(result.total_frames, 0);
    }
}
