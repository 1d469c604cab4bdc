use std::fs::File;
use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use clap::Parser;
use flock_cli::args::{load_settings, Args};
use flock_cli::{RunOptions, Runner, Simulation};

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    log::info!("Flock simulation starting...");
    let settings = load_settings(&args)?;
    log::info!("Dimension: {:?}", settings.dimension);
    log::info!("Population: {}", settings.population);
    log::info!(
        "Weights: alignment {}, cohesion {}, separation {}",
        settings.alignment_weight,
        settings.cohesion_weight,
        settings.separation_weight
    );
    match settings.seed {
        Some(seed) => log::info!("Seed: {}", seed),
        None => log::info!("Seed: random"),
    }

    let simulation = Simulation::from_settings(&settings)?;
    let options = RunOptions {
        frames: args.frames,
        snapshot_every: args.snapshot_every,
        resizes: args.resizes.clone(),
        stats_every: args.stats_every,
    };
    let mut runner = Runner::new(simulation, options)?;

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    let summary = runner.run(&mut out)?;

    log::info!(
        "Recomputed {} boid updates, throttled {}, culled {}, dropped {}",
        summary.recomputed,
        summary.throttled,
        summary.culled,
        summary.dropped
    );
    Ok(())
}
