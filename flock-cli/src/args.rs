//! Command-line arguments and how they combine with a settings file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use flock_shared::{Dimension, FlockSettings};

use crate::runner::ResizeEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DimensionArg {
    #[value(name = "2d")]
    Planar,
    #[value(name = "3d")]
    Spatial,
}

impl From<DimensionArg> for Dimension {
    fn from(arg: DimensionArg) -> Self {
        match arg {
            DimensionArg::Planar => Dimension::Planar,
            DimensionArg::Spatial => Dimension::Spatial,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless flocking simulation", long_about = None)]
pub struct Args {
    /// Simulate on a 2D canvas or in a 3D cube (defaults to the settings file, then 2d)
    #[arg(short = 'D', long, value_enum)]
    pub dimension: Option<DimensionArg>,

    /// JSON settings file; flags below override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of boids
    #[arg(short = 'n', long)]
    pub population: Option<usize>,

    /// Number of frames to simulate
    #[arg(short, long, default_value_t = 600)]
    pub frames: u64,

    /// Seed for a reproducible run
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Alignment weight
    #[arg(long)]
    pub alignment: Option<f32>,

    /// Cohesion weight
    #[arg(long)]
    pub cohesion: Option<f32>,

    /// Separation weight
    #[arg(long)]
    pub separation: Option<f32>,

    /// Write a JSON snapshot of every boid every N frames
    #[arg(long, value_name = "N")]
    pub snapshot_every: Option<u64>,

    /// Snapshot destination (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Change the population before a frame, e.g. --resize 300:50
    #[arg(long = "resize", value_name = "FRAME:COUNT")]
    pub resizes: Vec<ResizeEvent>,

    /// Log frame statistics every N frames
    #[arg(long, value_name = "N", default_value_t = 60)]
    pub stats_every: u64,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,
}

/// Settings from `--config` (or the preset for `--dimension`) with the
/// command-line overrides applied.
pub fn load_settings(args: &Args) -> Result<FlockSettings> {
    let mut settings = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            let settings = FlockSettings::from_json(&json)
                .with_context(|| format!("Failed to parse settings in {}", path.display()))?;
            if let Some(dimension) = args.dimension {
                if Dimension::from(dimension) != settings.dimension {
                    anyhow::bail!(
                        "--dimension {:?} conflicts with the {:?} flock in {}",
                        dimension,
                        settings.dimension,
                        path.display()
                    );
                }
            }
            settings
        }
        None => FlockSettings::for_dimension(args.dimension.map(Dimension::from).unwrap_or_default()),
    };

    if let Some(population) = args.population {
        settings.population = population;
    }
    if let Some(seed) = args.seed {
        settings.seed = Some(seed);
    }
    if let Some(weight) = args.alignment {
        settings.alignment_weight = weight;
    }
    if let Some(weight) = args.cohesion {
        settings.cohesion_weight = weight;
    }
    if let Some(weight) = args.separation {
        settings.separation_weight = weight;
    }
    Ok(settings)
}
