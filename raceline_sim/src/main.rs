//! Raceline simulator CLI
//!
//! Runs overlay scenarios against a scripted host and reports pass/fail.

use clap::Parser;
use raceline_core::VizConfig;
use raceline_env::{FrameClock, SystemClock};
use raceline_sim::scenarios::ScenarioId;
use raceline_sim::{
    FrameRecord, FrameSink, RerunLogger, ScenarioResult, ScenarioRunner, SimClock, SimExport,
};
use std::path::PathBuf;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Raceline deterministic simulation CLI
#[derive(Parser, Debug)]
#[command(name = "raceline-sim")]
#[command(about = "Run deterministic overlay scenarios for Raceline", long_about = None)]
struct Args {
    /// Master seed for determinism (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Scenario to run (straight, hairpin, braking, ..., all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Simulated duration in seconds
    #[arg(short, long, default_value = "5")]
    duration: f64,

    /// Session config (JSON); defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Export frames of a single scenario to a JSON file
    #[arg(long)]
    export: Option<PathBuf>,

    /// Keep every n-th frame in the export
    #[arg(long, default_value = "1")]
    export_every: u64,

    /// Stream frames to a Rerun viewer (needs the `visualization` feature)
    #[arg(long)]
    rerun: bool,

    /// Pace frames with the wall clock instead of virtual time
    #[arg(long)]
    realtime: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,
}

/// Fans frames out to the export and the viewer.
struct Sinks {
    export: Option<SimExport>,
    rerun: RerunLogger,
}

impl FrameSink for Sinks {
    fn record(&mut self, frame: &FrameRecord<'_>) {
        if let Some(export) = &mut self.export {
            export.record(frame);
        }
        self.rerun.record(frame);
    }
}

async fn run_one<C: FrameClock>(
    runner: &ScenarioRunner,
    clock: &C,
    scenario: ScenarioId,
    sinks: &mut Sinks,
) -> ScenarioResult {
    let result = runner.run_on(clock, scenario, sinks).await;
    if let Some(export) = &mut sinks.export {
        export.finalize(&result);
    }
    result
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    if !args.json {
        info!("Raceline simulator v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    let scenarios: Vec<ScenarioId> = if args.scenario == "all" {
        ScenarioId::all()
    } else {
        match args.scenario.parse() {
            Ok(scenario) => vec![scenario],
            Err(e) => {
                eprintln!("Error: {}", e);
                let names: Vec<&str> = ScenarioId::all().iter().map(|s| s.name()).collect();
                eprintln!("Available scenarios: {}, all", names.join(", "));
                std::process::exit(2);
            }
        }
    };

    if args.export.is_some() && scenarios.len() > 1 {
        eprintln!("Error: --export only supports a single scenario, not 'all'");
        std::process::exit(2);
    }

    let config = match &args.config {
        Some(path) => match VizConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: cannot load {}: {}", path.display(), e);
                std::process::exit(2);
            }
        },
        None => VizConfig::default(),
    };

    let seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(1, |d| d.as_nanos() as u64)
    } else {
        args.seed
    };

    let runner = ScenarioRunner::new(seed)
        .with_duration(args.duration)
        .with_config(config);

    let mut results: Vec<ScenarioResult> = Vec::new();
    for scenario in &scenarios {
        let mut sinks = Sinks {
            export: args
                .export
                .as_ref()
                .map(|_| {
                    SimExport::new(scenario.name(), seed).with_frame_interval(args.export_every)
                }),
            rerun: if args.rerun {
                RerunLogger::new(&format!("raceline_{}", scenario.name()))
            } else {
                RerunLogger::disabled()
            },
        };

        let result = if args.realtime {
            run_one(&runner, &SystemClock::new(), *scenario, &mut sinks).await
        } else {
            run_one(&runner, &SimClock::new(seed), *scenario, &mut sinks).await
        };

        if let (Some(path), Some(export)) = (&args.export, &sinks.export) {
            match export.write_to_file(path) {
                Ok(()) => info!("Exported {} frames to {}", export.frames.len(), path.display()),
                Err(e) => error!("Failed to write export: {:?}", e),
            }
        }

        if !args.json {
            if result.passed {
                info!("✓ {} (seed={}) PASSED", scenario.name(), seed);
            } else {
                error!(
                    "✗ {} (seed={}) FAILED: {}",
                    scenario.name(),
                    seed,
                    result.failure_reason.as_deref().unwrap_or("unknown")
                );
            }
        }

        results.push(result);
    }

    let total = results.len();
    let failed = results.iter().filter(|r| !r.passed).count();

    if args.json {
        let summary = serde_json::json!({
            "total": total,
            "passed": total - failed,
            "failed": failed,
            "results": results.iter().map(|r| {
                serde_json::json!({
                    "scenario": r.scenario.name(),
                    "seed": r.seed,
                    "passed": r.passed,
                    "frames": r.total_frames,
                    "time_secs": r.final_time_secs,
                    "frames_rendered": r.metrics.frames_rendered,
                    "frames_skipped": r.metrics.frames_skipped,
                    "trail_samples": r.metrics.trail_samples,
                    "segments_culled": r.metrics.segments_culled,
                    "failure_reason": r.failure_reason,
                })
            }).collect::<Vec<_>>(),
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("Failed to encode summary: {}", e),
        }
    } else {
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        if failed == 0 {
            info!("All {} scenario runs passed", total);
        } else {
            error!("{}/{} scenario runs failed", failed, total);
        }
    }

    if failed > 0 {
        std::process::exit(1);
    }
}
