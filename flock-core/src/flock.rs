use alloc::boxed::Box;
use alloc::vec::Vec;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::behavior;
use crate::boid::{Boid, BoidId};
use crate::bounds::Bounds;
use crate::config::{FlockConfig, SteeringMode, Weights};
use crate::error::ConfigError;
use crate::grid::SpatialGrid;
use crate::lod::{Camera, UpdateDecision, UpdateScheduler};
use crate::render::RenderHost;
use crate::vector::{Vector, Vector2D, Vector3D};

/// Counters for the most recent frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frame: u64,
    pub agents: usize,
    /// Boids whose steering forces were computed this frame.
    pub recomputed: usize,
    /// Visible boids that coasted on their current velocity.
    pub throttled: usize,
    pub culled: usize,
    /// Boids left out of the grid because they were outside the bounds.
    pub dropped: usize,
    /// Neighbor candidates returned by grid queries, before distance filtering.
    pub candidates: usize,
}

#[derive(Debug, Clone, Copy)]
struct Pending<V> {
    visible: bool,
    force: Option<V>,
}

/// A flock of boids inside wrap-around bounds.
///
/// Each [`step`](Flock::step) rebuilds the spatial grid, computes every
/// boid's steering force from frame-start state, and only then integrates
/// and wraps them all.
pub struct Flock<V: Vector> {
    boids: Vec<Boid<V>>,
    config: FlockConfig,
    bounds: Bounds<V>,
    grid: SpatialGrid<V>,
    rng: SmallRng,
    next_id: u64,
    frame: u64,
    pending: Vec<Pending<V>>,
    candidates: Vec<usize>,
    host: Option<Box<dyn RenderHost>>,
    stats: FrameStats,
}

pub type Flock2D = Flock<Vector2D>;
pub type Flock3D = Flock<Vector3D>;

impl<V: Vector> Flock<V> {
    /// Spawns `count` boids with a random seed.
    #[cfg(feature = "std")]
    pub fn new(bounds: Bounds<V>, count: usize, config: FlockConfig) -> Result<Self, ConfigError> {
        let mut bytes = [0u8; 8];
        let seed = match getrandom::getrandom(&mut bytes) {
            Ok(()) => u64::from_le_bytes(bytes),
            Err(err) => {
                log::warn!("no entropy source ({}), falling back to the clock", err);
                std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .map(|elapsed| elapsed.as_nanos() as u64)
                    .unwrap_or_default()
            }
        };
        log::debug!("flock seed {}", seed);
        Self::with_seed(bounds, count, config, seed)
    }

    /// Spawns `count` boids from a deterministic seed.
    pub fn with_seed(
        bounds: Bounds<V>,
        count: usize,
        config: FlockConfig,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = SpatialGrid::new(&bounds, config.cell_size())?;

        let mut flock = Self {
            boids: Vec::with_capacity(count),
            config,
            bounds,
            grid,
            rng: SmallRng::seed_from_u64(seed),
            next_id: 0,
            frame: 0,
            pending: Vec::with_capacity(count),
            candidates: Vec::new(),
            host: None,
            stats: FrameStats::default(),
        };
        flock.spawn(count);
        Ok(flock)
    }

    pub fn boids(&self) -> &[Boid<V>] {
        &self.boids
    }

    pub fn len(&self) -> usize {
        self.boids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boids.is_empty()
    }

    pub fn config(&self) -> &FlockConfig {
        &self.config
    }

    pub fn bounds(&self) -> &Bounds<V> {
        &self.bounds
    }

    pub fn grid(&self) -> &SpatialGrid<V> {
        &self.grid
    }

    /// Number of completed steps.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn last_stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Adds one boid and returns its id. Speed and force limits come from the
    /// current configuration.
    pub fn add_boid(&mut self, position: V, velocity: V) -> BoidId {
        let id = BoidId(self.next_id);
        self.next_id += 1;

        let mut boid = Boid::new(id, position, velocity, self.config.max_speed, self.config.max_force);
        if let Some(host) = self.host.as_mut() {
            boid.attach_render(host.acquire(id));
        }
        self.boids.push(boid);
        id
    }

    /// Grows the flock with random boids or shrinks it from the end.
    /// Removed boids release their render handles before this returns.
    pub fn resize(&mut self, count: usize) {
        let current = self.boids.len();
        if count > current {
            self.spawn(count - current);
        } else if count < current {
            for mut boid in self.boids.drain(count..) {
                boid.dispose();
            }
            self.pending.truncate(count);
            self.pending.shrink_to(count);
        }
        log::debug!("flock resized from {} to {} boids", current, self.boids.len());
    }

    pub fn set_config(&mut self, config: FlockConfig) -> Result<(), ConfigError> {
        config.validate().map_err(|err| rejected("config", err))?;

        if config.cell_size() != self.config.cell_size() {
            self.grid =
                SpatialGrid::new(&self.bounds, config.cell_size()).map_err(|err| rejected("config", err))?;
            log::debug!("grid re-laid out with cell size {}", config.cell_size());
        }
        for boid in &mut self.boids {
            boid.max_speed = config.max_speed;
            boid.max_force = config.max_force;
        }
        self.config = config;
        Ok(())
    }

    pub fn set_weights(&mut self, weights: Weights) -> Result<(), ConfigError> {
        weights.validate().map_err(|err| rejected("weights", err))?;
        self.config.weights = weights;
        Ok(())
    }

    /// Moves the walls. Boids left outside wrap back in on their next update.
    pub fn set_bounds(&mut self, bounds: Bounds<V>) -> Result<(), ConfigError> {
        let grid = SpatialGrid::new(&bounds, self.config.cell_size()).map_err(|err| rejected("bounds", err))?;
        log::debug!("grid re-laid out for new bounds: {:?} cells", grid.dims());
        self.grid = grid;
        self.bounds = bounds;
        Ok(())
    }

    /// Installs a render host and gives every boid without a handle one.
    pub fn set_render_host(&mut self, mut host: Box<dyn RenderHost>) {
        for boid in &mut self.boids {
            if !boid.has_render_handle() {
                boid.attach_render(host.acquire(boid.id));
            }
        }
        self.host = Some(host);
    }

    /// Advances every boid by one frame.
    pub fn step(&mut self) -> FrameStats {
        self.advance(|_, _| UpdateDecision::FULL)
    }

    fn spawn(&mut self, count: usize) {
        let speed = self.config.initial_speed;
        for _ in 0..count {
            let position = self.bounds.sample(&mut self.rng, self.config.spawn_scale);
            let velocity = V::random_unit(&mut self.rng) * self.rng.gen_range(speed.min..=speed.max);
            self.add_boid(position, velocity);
        }
    }

    fn advance<F>(&mut self, mut plan: F) -> FrameStats
    where
        F: FnMut(u64, &Boid<V>) -> UpdateDecision,
    {
        let dropped = self.grid.rebuild(self.boids.iter().map(|boid| boid.position));
        let mut stats = FrameStats {
            frame: self.frame,
            agents: self.boids.len(),
            dropped,
            ..FrameStats::default()
        };

        let radii = self.config.radii;
        let weights = self.config.weights;
        let query_radius = radii.max();

        self.pending.clear();
        for boid in &self.boids {
            let decision = plan(self.frame, boid);
            let force = if decision.recompute {
                self.grid.query_into(&boid.position, query_radius, &mut self.candidates);
                stats.candidates += self.candidates.len();
                stats.recomputed += 1;

                let neighbors = self.candidates.iter().map(|&index| &self.boids[index]);
                Some(match self.config.steering {
                    SteeringMode::PerBehavior => behavior::flock(boid, neighbors, &radii, &weights),
                    SteeringMode::SinglePass => behavior::flock_single_pass(boid, neighbors, &radii, &weights),
                })
            } else {
                if decision.visible {
                    stats.throttled += 1;
                }
                None
            };
            if !decision.visible {
                stats.culled += 1;
            }
            self.pending.push(Pending {
                visible: decision.visible,
                force,
            });
        }

        for (boid, pending) in self.boids.iter_mut().zip(&self.pending) {
            boid.visible = pending.visible;
            if let Some(force) = pending.force {
                boid.apply_force(force);
            }
            boid.update();
            boid.wrap_edges(&self.bounds);
        }

        self.frame += 1;
        self.stats = stats;
        stats
    }
}

impl Flock<Vector3D> {
    /// Advances the flock, throttling or culling boids by their distance
    /// from `camera` and whether its frustum sees them.
    pub fn step_with_view(&mut self, scheduler: &UpdateScheduler, camera: &Camera) -> FrameStats {
        let frustum = camera.frustum();
        let eye = camera.position;
        self.advance(|frame, boid| scheduler.plan(frame, boid, &eye, &frustum))
    }
}

fn rejected(what: &str, err: ConfigError) -> ConfigError {
    log::debug!("rejected {} update: {}", what, err);
    err
}
