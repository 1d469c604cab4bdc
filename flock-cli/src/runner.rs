//! Headless simulation driver.

use std::io::Write;
use std::str::FromStr;
use std::time::Instant;

use anyhow::{Context, Result};
use flock_core::{
    Boid, Bounds, Camera, Flock, Flock2D, Flock3D, FlockConfig, FrameStats, UpdateScheduler, Vector, Vector2D, Vector3D,
};
use flock_shared::{AgentSnapshot, Dimension, FlockSettings, FrameSnapshot, Heading, RunSummary};

use crate::settings;

/// Below this rate a warning is logged.
const LOW_FPS_THRESHOLD: f64 = 30.0;

/// A 2D flock, or a 3D flock with the view that throttles it.
pub enum Simulation {
    Planar(Flock2D),
    Spatial {
        flock: Flock3D,
        scheduler: UpdateScheduler,
        camera: Camera,
    },
}

impl Simulation {
    pub fn from_settings(settings: &FlockSettings) -> Result<Self> {
        let config = settings::flock_config(settings);
        let simulation = match settings.dimension {
            Dimension::Planar => {
                let bounds = settings::planar_bounds(settings).context("Invalid canvas size")?;
                Simulation::Planar(build(bounds, settings, config)?)
            }
            Dimension::Spatial => {
                let bounds = settings::spatial_bounds(settings).context("Invalid cube extent")?;
                let scheduler = UpdateScheduler::new(settings::lod_settings(&settings.lod))
                    .context("Invalid level-of-detail settings")?;
                let camera = settings::camera(&settings.camera).context("Invalid camera settings")?;
                Simulation::Spatial {
                    flock: build(bounds, settings, config)?,
                    scheduler,
                    camera,
                }
            }
        };
        Ok(simulation)
    }

    pub fn step(&mut self) -> FrameStats {
        match self {
            Simulation::Planar(flock) => flock.step(),
            Simulation::Spatial {
                flock,
                scheduler,
                camera,
            } => flock.step_with_view(scheduler, camera),
        }
    }

    pub fn resize(&mut self, population: usize) {
        match self {
            Simulation::Planar(flock) => flock.resize(population),
            Simulation::Spatial { flock, .. } => flock.resize(population),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Simulation::Planar(flock) => flock.len(),
            Simulation::Spatial { flock, .. } => flock.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of completed frames.
    pub fn frame(&self) -> u64 {
        match self {
            Simulation::Planar(flock) => flock.frame(),
            Simulation::Spatial { flock, .. } => flock.frame(),
        }
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        let agents = match self {
            Simulation::Planar(flock) => flock.boids().iter().map(planar_snapshot).collect(),
            Simulation::Spatial { flock, .. } => flock.boids().iter().map(spatial_snapshot).collect(),
        };
        FrameSnapshot {
            frame: self.frame(),
            agents,
        }
    }
}

fn build<V: Vector>(bounds: Bounds<V>, settings: &FlockSettings, config: FlockConfig) -> Result<Flock<V>> {
    let flock = match settings.seed {
        Some(seed) => Flock::with_seed(bounds, settings.population, config, seed),
        None => Flock::new(bounds, settings.population, config),
    };
    flock.context("Invalid flock settings")
}

fn planar_snapshot(boid: &Boid<Vector2D>) -> AgentSnapshot {
    AgentSnapshot {
        id: boid.id.0,
        position: [boid.position.x, boid.position.y, 0.0],
        velocity: [boid.velocity.x, boid.velocity.y, 0.0],
        heading: Heading::Angle(boid.heading()),
        visible: boid.visible,
    }
}

fn spatial_snapshot(boid: &Boid<Vector3D>) -> AgentSnapshot {
    let facing = boid.facing;
    AgentSnapshot {
        id: boid.id.0,
        position: [boid.position.x, boid.position.y, boid.position.z],
        velocity: [boid.velocity.x, boid.velocity.y, boid.velocity.z],
        heading: Heading::Direction([facing.x, facing.y, facing.z]),
        visible: boid.visible,
    }
}

/// Population change applied before the given frame runs, written
/// `FRAME:COUNT` on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeEvent {
    pub frame: u64,
    pub population: usize,
}

impl FromStr for ResizeEvent {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (frame, population) = s
            .split_once(':')
            .with_context(|| format!("Resize '{}' must look like FRAME:COUNT", s))?;
        Ok(Self {
            frame: frame
                .trim()
                .parse()
                .with_context(|| format!("Invalid frame in resize '{}'", s))?,
            population: population
                .trim()
                .parse()
                .with_context(|| format!("Invalid population in resize '{}'", s))?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub frames: u64,
    /// Write a snapshot every this many frames; never when `None`.
    pub snapshot_every: Option<u64>,
    pub resizes: Vec<ResizeEvent>,
    /// Log frame statistics every this many frames.
    pub stats_every: u64,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            frames: 600,
            snapshot_every: None,
            resizes: Vec::new(),
            stats_every: 60,
        }
    }
}

pub struct Runner {
    simulation: Simulation,
    options: RunOptions,
}

impl Runner {
    pub fn new(simulation: Simulation, mut options: RunOptions) -> Result<Self> {
        if options.snapshot_every == Some(0) {
            anyhow::bail!("Snapshot interval must be at least 1 frame");
        }
        if options.stats_every == 0 {
            anyhow::bail!("Statistics interval must be at least 1 frame");
        }
        options.resizes.sort_by_key(|event| event.frame);
        Ok(Self { simulation, options })
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    /// Runs every frame, writing snapshots to `out` as JSON lines.
    pub fn run<W: Write>(&mut self, out: &mut W) -> Result<RunSummary> {
        log::info!(
            "Running {} frames with {} boids",
            self.options.frames,
            self.simulation.len()
        );

        let started = Instant::now();
        let mut window_start = Instant::now();
        let mut summary = RunSummary::default();
        let mut resizes = self.options.resizes.iter().peekable();

        for frame in 0..self.options.frames {
            while let Some(event) = resizes.next_if(|event| event.frame <= frame) {
                log::info!("Frame {}: resizing flock to {} boids", frame, event.population);
                self.simulation.resize(event.population);
            }

            let stats = self.simulation.step();
            summary.frames += 1;
            summary.recomputed += stats.recomputed as u64;
            summary.throttled += stats.throttled as u64;
            summary.culled += stats.culled as u64;
            summary.dropped += stats.dropped as u64;
            summary.candidates += stats.candidates as u64;

            if let Some(every) = self.options.snapshot_every {
                if frame % every == 0 {
                    serde_json::to_writer(&mut *out, &self.simulation.snapshot())
                        .context("Failed to serialize snapshot")?;
                    writeln!(out).context("Failed to write snapshot")?;
                }
            }

            if (frame + 1) % self.options.stats_every == 0 {
                let fps = self.options.stats_every as f64 / window_start.elapsed().as_secs_f64();
                window_start = Instant::now();
                log::info!(
                    "Frame {}: {} boids, {} recomputed, {} throttled, {} culled, {} candidates",
                    stats.frame,
                    stats.agents,
                    stats.recomputed,
                    stats.throttled,
                    stats.culled,
                    stats.candidates
                );
                if fps < LOW_FPS_THRESHOLD {
                    log::warn!("Low frame rate: {:.1} FPS", fps);
                }
            }
        }

        out.flush().context("Failed to flush snapshots")?;
        summary.final_population = self.simulation.len();
        summary.elapsed_secs = started.elapsed().as_secs_f64();
        log::info!(
            "Finished {} frames in {:.2}s ({:.1} FPS)",
            summary.frames,
            summary.elapsed_secs,
            summary.frames_per_second()
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resize_event() {
        let event: ResizeEvent = "120:50".parse().unwrap();
        assert_eq!(
            event,
            ResizeEvent {
                frame: 120,
                population: 50
            }
        );
        assert!("120".parse::<ResizeEvent>().is_err());
        assert!("a:5".parse::<ResizeEvent>().is_err());
        assert!("5:-1".parse::<ResizeEvent>().is_err());
    }

    #[test]
    fn test_rejects_zero_intervals() {
        let settings = FlockSettings {
            seed: Some(1),
            population: 3,
            ..FlockSettings::planar()
        };
        let options = RunOptions {
            snapshot_every: Some(0),
            ..RunOptions::default()
        };
        let simulation = Simulation::from_settings(&settings).unwrap();
        assert!(Runner::new(simulation, options).is_err());
    }
}
