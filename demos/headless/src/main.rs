//! headless: drive one intersection from the command line.
//!
//! Runs a simulation through the registry, optionally switching the control
//! strategy part way, logs progress through `env_logger` (`RUST_LOG=info`),
//! and prints the final state as JSON on stdout.
//!
//! ```text
//! headless --steps 600 --algorithm static --switch-to adaptive --switch-at 300
//! ```

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use serde_json::json;

use tl_control::{AlgorithmKind, algorithm_info};
use tl_core::{Tick, VehicleId};
use tl_sim::{Metrics, SimObserver, SimulationConfig, SimulationRegistry};

#[derive(Parser)]
#[command(name = "headless")]
#[command(about = "Traffic-light intersection simulation without a UI")]
struct Cli {
    /// Steps to run in total
    #[arg(long, default_value = "500")]
    steps: u64,

    /// Initial vehicle count
    #[arg(long, default_value = "20")]
    vehicles: u32,

    /// Control strategy at start: static, adaptive or coordinated
    #[arg(long, default_value = "static")]
    algorithm: AlgorithmKind,

    /// Strategy to switch to during the run
    #[arg(long, requires = "switch_at")]
    switch_to: Option<AlgorithmKind>,

    /// Step at which `--switch-to` takes effect
    #[arg(long)]
    switch_at: Option<u64>,

    /// Per-algorithm settings as a JSON object
    #[arg(long, default_value = "{}")]
    algorithm_config: String,

    /// Probability that a completed vehicle is replaced
    #[arg(long, default_value = "0.1")]
    spawn_rate: f64,

    #[arg(long)]
    seed: Option<u64>,

    /// Log a progress line every N steps (0 disables)
    #[arg(long, default_value = "100")]
    log_every: u64,

    /// Print the strategy catalogue and exit
    #[arg(long)]
    list_algorithms: bool,
}

// ── Progress observer ─────────────────────────────────────────────────────────

struct Progress {
    every:     u64,
    completed: u64,
    travel:    u64,
}

impl SimObserver for Progress {
    fn on_step_end(&mut self, step: Tick, m: &Metrics) {
        if self.every != 0 && (step.0 + 1) % self.every == 0 {
            info!(
                "step {:>5}: {:>3} vehicles, avg wait {:>6.2}, avg speed {:.2}, {} completed",
                m.current_step, m.total_vehicles, m.avg_waiting_time, m.avg_speed, m.throughput
            );
        }
    }

    fn on_vehicle_completed(&mut self, _step: Tick, _vehicle: VehicleId, travel_time: u64) {
        self.completed += 1;
        self.travel += travel_time;
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    if cli.list_algorithms {
        println!("{}", serde_json::to_string_pretty(algorithm_info())?);
        return Ok(());
    }

    let algorithm_config: serde_json::Value =
        serde_json::from_str(&cli.algorithm_config).context("--algorithm-config is not JSON")?;

    let config = SimulationConfig {
        num_vehicles: cli.vehicles,
        algorithm: cli.algorithm,
        algorithm_config,
        spawn_rate: cli.spawn_rate,
        seed: cli.seed,
        ..SimulationConfig::default()
    };

    let registry = SimulationRegistry::new();
    let id = registry.create(config)?;

    let mut progress = Progress { every: cli.log_every, completed: 0, travel: 0 };
    let switch_at = cli.switch_at.unwrap_or(cli.steps).min(cli.steps);
    let t0 = Instant::now();

    registry.with(id, |sim| sim.run_steps(switch_at, &mut progress))?;
    if let Some(kind) = cli.switch_to {
        registry.change_algorithm(id, kind.as_str(), &json!({}))?;
    }
    registry.with(id, |sim| sim.run_steps(cli.steps - switch_at, &mut progress))?;

    let elapsed = t0.elapsed();
    let report = registry.metrics(id)?;
    info!(
        "{id}: {} steps in {:.2?} ({:.0} steps/s)",
        report.current_step,
        elapsed,
        report.current_step as f64 / elapsed.as_secs_f64().max(f64::EPSILON),
    );
    if progress.completed > 0 {
        info!(
            "{} vehicles completed, mean travel time {:.1} steps",
            progress.completed,
            progress.travel as f64 / progress.completed as f64
        );
    }

    let state = registry.get_state(id)?;
    println!("{}", serde_json::to_string_pretty(&state)?);
    registry.delete(id)?;
    Ok(())
}
