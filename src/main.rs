use emsim::{Engine, FileSink, Scenario, SimulationConfig};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use std::path::PathBuf;

/// Sample electric and magnetic fields on a grid and evolve charged particles
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to the JSON configuration file
    config: PathBuf,

    /// Directory the snapshot files are written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Only write the grid coordinates, skip the field and particle passes
    #[arg(long)]
    grid_only: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let cfg = SimulationConfig::load(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;
    let scenario = Scenario::build_scenario(&cfg)?;
    let sink = FileSink::new(&args.output_dir)?;

    let mut engine = Engine::new(scenario, sink);
    if args.grid_only {
        let name = engine.write_grid()?;
        info!("grid written to {name}");
        return Ok(());
    }

    let summary = engine.run()?;
    if summary.skipped_contributions > 0 {
        info!(
            "{} field contributions at zero separation were skipped",
            summary.skipped_contributions
        );
    }
    if summary.skipped_pairs > 0 {
        info!("{} coincident particle pairs were skipped", summary.skipped_pairs);
    }

    Ok(())
}
