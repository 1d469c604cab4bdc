use crate::error::{non_negative, positive, within, ConfigError};

/// Multipliers applied to each steering force before it is added to a boid's
/// acceleration. Applied linearly, never normalized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    pub alignment: f32,
    pub cohesion: f32,
    pub separation: f32,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            alignment: 1.0,
            cohesion: 1.0,
            separation: 1.0,
        }
    }
}

impl Weights {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("alignment weight", self.alignment)?;
        non_negative("cohesion weight", self.cohesion)?;
        non_negative("separation weight", self.separation)
    }
}

/// Perception radius of each behavior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Radii {
    pub alignment: f32,
    pub cohesion: f32,
    pub separation: f32,
}

impl Radii {
    pub fn uniform(radius: f32) -> Self {
        Self {
            alignment: radius,
            cohesion: radius,
            separation: radius,
        }
    }

    /// Neighbor queries use the widest radius so one lookup serves all three
    /// behaviors.
    pub fn max(&self) -> f32 {
        self.alignment.max(self.cohesion).max(self.separation)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("alignment radius", self.alignment)?;
        positive("cohesion radius", self.cohesion)?;
        positive("separation radius", self.separation)
    }
}

/// Range new boids draw their initial speed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedRange {
    pub min: f32,
    pub max: f32,
}

impl SpeedRange {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min.is_finite() && self.max.is_finite() && 0.0 <= self.min && self.min <= self.max {
            Ok(())
        } else {
            Err(ConfigError::InvalidSpeedRange {
                min: self.min,
                max: self.max,
            })
        }
    }
}

/// How the three steering behaviors walk the neighbor candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SteeringMode {
    /// One pass per behavior.
    PerBehavior,
    /// One pass accumulating all three behaviors.
    #[default]
    SinglePass,
}

/// Configuration for the flock simulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlockConfig {
    pub weights: Weights,
    pub radii: Radii,
    pub max_speed: f32,
    pub max_force: f32,
    pub initial_speed: SpeedRange,
    pub steering: SteeringMode,
    /// Grid cell edge length; the widest behavior radius when unset.
    pub cell_size: Option<f32>,
    /// Fraction of the bounds, about their center, that new boids spawn in.
    pub spawn_scale: f32,
}

impl Default for FlockConfig {
    fn default() -> Self {
        Self::planar()
    }
}

impl FlockConfig {
    /// Defaults for a flock on a 2D canvas.
    pub fn planar() -> Self {
        Self {
            weights: Weights::default(),
            radii: Radii {
                alignment: 50.0,
                cohesion: 100.0,
                separation: 50.0,
            },
            max_speed: 4.0,
            max_force: 0.2,
            initial_speed: SpeedRange { min: 2.0, max: 4.0 },
            steering: SteeringMode::default(),
            cell_size: None,
            spawn_scale: 1.0,
        }
    }

    /// Defaults for a flock inside a 3D cube.
    pub fn spatial() -> Self {
        Self::spatial_with_perception(25.0)
    }

    /// 3D boids share one perception radius for alignment and cohesion and
    /// keep separation at half of it.
    pub fn spatial_with_perception(perception_radius: f32) -> Self {
        Self {
            weights: Weights::default(),
            radii: Radii {
                alignment: perception_radius,
                cohesion: perception_radius,
                separation: perception_radius * 0.5,
            },
            max_speed: 2.0,
            max_force: 0.03,
            initial_speed: SpeedRange { min: 1.0, max: 3.0 },
            steering: SteeringMode::default(),
            cell_size: None,
            spawn_scale: 0.8,
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size.unwrap_or_else(|| self.radii.max())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        self.radii.validate()?;
        positive("max speed", self.max_speed)?;
        positive("max force", self.max_force)?;
        self.initial_speed.validate()?;
        if let Some(cell_size) = self.cell_size {
            positive("cell size", cell_size)?;
        }
        within("spawn scale", self.spawn_scale, 0.0, 1.0)
    }
}
