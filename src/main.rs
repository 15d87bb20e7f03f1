//! Plinko Lab headless runner
//!
//! Drives the board on simulated time and reports slot statistics.

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;

use plinko_lab::analytics::{CycleHistory, CycleRecord, DistributionSeries, TimelineSeries};
use plinko_lab::consts::SIM_DT_MS;
use plinko_lab::sim::{HeatSample, PhysicsWorld, SimpleWorld, SimulationState, SlotRow, frame, spawn, tick};
use plinko_lab::{Settings, Tuning};

type Result<T> = std::result::Result<T, Box<dyn Error>>;

#[derive(Parser, Debug)]
#[command(author, version, about = "Run the plinko cycle headless and report slot statistics")]
struct Cli {
    /// Stop after this many completed cycles
    #[arg(short, long, default_value_t = 3)]
    cycles: usize,

    /// Seed for spawn jitter
    #[arg(short, long, default_value_t = 1)]
    seed: u64,

    /// Tuning JSON (missing fields use defaults)
    #[arg(long)]
    tuning: Option<PathBuf>,

    /// View settings JSON
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Write a JSON report here
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Simulated time limit
    #[arg(long, default_value_t = 600.0)]
    max_seconds: f64,
}

#[derive(Serialize)]
struct Report<'a> {
    seed: u64,
    ticks: u64,
    simulated_ms: f64,
    cycles: &'a [CycleRecord],
    slots: Vec<SlotRow>,
    distribution: DistributionSeries,
    timeline: TimelineSeries,
    /// Only present while the heat map is visible
    #[serde(skip_serializing_if = "Option::is_none")]
    heat: Option<Vec<HeatSample>>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = try_main() {
        log::error!("{err}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();

    // `Tuning::load` validates on its own
    let tuning = match &cli.tuning {
        Some(path) => Tuning::load(path)?,
        None => {
            let tuning = Tuning::default();
            tuning.validate()?;
            tuning
        }
    };
    let settings = cli.settings.as_ref().map(Settings::load).unwrap_or_default();

    log::info!("Plinko Lab starting (seed {}, batch {})", cli.seed, tuning.batch_size);

    let mut world = SimpleWorld::new();
    let mut state = SimulationState::new(&mut world, tuning, cli.seed, 0.0)?;
    let mut history = CycleHistory::new(0.0);

    let limit_ms = cli.max_seconds * 1000.0;
    let mut now_ms = 0.0;
    while history.completed_cycles() < cli.cycles && now_ms < limit_ms {
        now_ms += SIM_DT_MS;
        world.step(SIM_DT_MS);
        let _ = frame(&mut state, &mut world, now_ms);
        let _ = spawn(&mut state, &mut world, now_ms);
        let _ = tick(&mut state, &mut world, &mut history, now_ms);
    }

    if history.completed_cycles() < cli.cycles {
        log::warn!(
            "Stopped at {:.1}s with {} of {} cycles complete",
            now_ms / 1000.0,
            history.completed_cycles(),
            cli.cycles
        );
    }

    let slots = state.registry.table();
    for row in &slots {
        log::info!(
            "Slot {}: {} total ({:.1}%), expected {:.1}%",
            row.index,
            row.total_count,
            row.total_pct,
            row.expected_pct
        );
    }

    if let Some(path) = &cli.export {
        let report = Report {
            seed: cli.seed,
            ticks: state.ticks,
            simulated_ms: now_ms,
            cycles: &history.cycles,
            slots,
            distribution: history.distribution(),
            timeline: history.timeline(),
            heat: settings.heat_map_visible.then(|| state.heat.snapshot()),
        };
        fs::write(path, serde_json::to_string_pretty(&report)?)?;
        log::info!("Report written to {}", path.display());
    }

    Ok(())
}
