//! DRR link simulator CLI
//!
//! Runs the bundled CBR and Poisson scenarios, or a scenario loaded from a
//! JSON file, and prints the results.
//!
//! # Example
//!
//! ```bash
//! # Both bundled scenarios, 10 000 simulated seconds each, fixed seed
//! drrsim --seed 42
//!
//! # A custom scenario, results written next to it as JSON
//! drrsim --config mixed.json --output-dir out --json
//! ```

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use drrsim::{Scenario, ScenarioBuilder, SimulationReport};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Preset {
    /// Two CBR flows (264 kbps, 120 kbps)
    Cbr,
    /// Two Poisson flows (320 kbps, 160 kbps mean)
    Poisson,
    /// Both of the above
    All,
}

/// Deficit Round Robin link simulator
///
/// Single-threaded and reproducible when the same seed is used.
#[derive(Parser, Debug)]
#[command(name = "drrsim")]
#[command(version, about, long_about = None)]
struct Args {
    /// Bundled scenario to run (ignored when --config is given)
    #[arg(long, value_enum, default_value = "all")]
    preset: Preset,

    /// JSON scenario file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Simulated seconds to run, overriding the scenario's horizon
    #[arg(short = 't', long)]
    max_time: Option<f64>,

    /// Random seed for reproducible results. When omitted, a random seed is used.
    #[arg(long)]
    seed: Option<u64>,

    /// Directory to write `<scenario>_results` files into
    #[arg(short = 'o', long)]
    output_dir: Option<PathBuf>,

    /// Emit JSON instead of the text report
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);

    let scenarios = match &args.config {
        Some(path) => vec![Scenario::load(path)
            .with_context(|| format!("loading scenario {}", path.display()))?],
        None => match args.preset {
            Preset::Cbr => vec![ScenarioBuilder::cbr_pair().scenario()],
            Preset::Poisson => vec![ScenarioBuilder::poisson_pair().scenario()],
            Preset::All => vec![
                ScenarioBuilder::cbr_pair().scenario(),
                ScenarioBuilder::poisson_pair().scenario(),
            ],
        },
    };

    for scenario in scenarios {
        let max_time = args.max_time.unwrap_or(scenario.max_time);
        let mut sim = scenario
            .build(seed)
            .with_context(|| format!("building scenario {}", scenario.name))?;

        info!(
            scenario = %scenario.name,
            flows = sim.flow_count(),
            quantum = sim.quantum(),
            max_time,
            seed = scenario.seed.unwrap_or(seed),
            "Starting simulation"
        );
        let started = Instant::now();
        let events = sim.run_simulation(max_time);
        info!(
            scenario = %scenario.name,
            events,
            wall_ms = started.elapsed().as_millis() as u64,
            "Simulation finished"
        );

        let report = SimulationReport::from_simulator(&scenario.name, &sim);
        if args.json {
            println!("{}", report.to_json()?);
        } else {
            print!("{}", report.to_text());
        }

        if let Some(dir) = &args.output_dir {
            let path = report
                .write_to_dir(dir, args.json)
                .with_context(|| format!("writing results to {}", dir.display()))?;
            info!(path = %path.display(), "Results written");
        }
    }

    Ok(())
}
