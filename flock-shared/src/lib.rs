#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

/// Whether the flock lives on a 2D canvas or in a 3D cube.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Dimension {
    #[default]
    #[serde(rename = "2d")]
    Planar,
    #[serde(rename = "3d")]
    Spatial,
}

/// Level-of-detail knobs for 3D flocks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LevelOfDetail {
    pub near: f32,
    pub mid: f32,
    pub far: f32,
    pub mid_interval: u32,
    pub far_interval: u32,
    pub bounding_radius: f32,
}

impl Default for LevelOfDetail {
    fn default() -> Self {
        Self {
            near: 50.0,
            mid: 100.0,
            far: 200.0,
            mid_interval: 2,
            far_interval: 4,
            bounding_radius: 2.0,
        }
    }
}

/// Camera the 3D flock is viewed from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraSettings {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub fov_degrees: f32,
    pub aspect: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 80.0],
            target: [0.0, 0.0, 0.0],
            fov_degrees: 75.0,
            aspect: 16.0 / 9.0,
        }
    }
}

/// Flock simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlockSettings {
    pub dimension: Dimension,
    pub population: usize,
    pub alignment_weight: f32,
    pub cohesion_weight: f32,
    pub separation_weight: f32,
    pub alignment_radius: f32,
    pub cohesion_radius: f32,
    pub separation_radius: f32,
    pub max_speed: f32,
    pub max_force: f32,
    pub min_initial_speed: f32,
    pub max_initial_speed: f32,
    /// Grid cell size; the widest radius when absent.
    pub cell_size: Option<f32>,
    /// Canvas size for 2D flocks.
    pub width: f32,
    pub height: f32,
    /// Cube half extent for 3D flocks.
    pub half_extent: f32,
    pub seed: Option<u64>,
    pub lod: LevelOfDetail,
    pub camera: CameraSettings,
}

impl Default for FlockSettings {
    fn default() -> Self {
        Self::planar()
    }
}

impl FlockSettings {
    pub fn for_dimension(dimension: Dimension) -> Self {
        match dimension {
            Dimension::Planar => Self::planar(),
            Dimension::Spatial => Self::spatial(),
        }
    }

    pub fn planar() -> Self {
        Self {
            dimension: Dimension::Planar,
            population: 200,
            alignment_weight: 1.0,
            cohesion_weight: 1.0,
            separation_weight: 1.0,
            alignment_radius: 50.0,
            cohesion_radius: 100.0,
            separation_radius: 50.0,
            max_speed: 4.0,
            max_force: 0.2,
            min_initial_speed: 2.0,
            max_initial_speed: 4.0,
            cell_size: None,
            width: 800.0,
            height: 600.0,
            half_extent: 50.0,
            seed: None,
            lod: LevelOfDetail::default(),
            camera: CameraSettings::default(),
        }
    }

    pub fn spatial() -> Self {
        Self {
            dimension: Dimension::Spatial,
            population: 500,
            alignment_radius: 25.0,
            cohesion_radius: 25.0,
            separation_radius: 12.5,
            max_speed: 2.0,
            max_force: 0.03,
            min_initial_speed: 1.0,
            max_initial_speed: 3.0,
            cell_size: Some(25.0),
            ..Self::planar()
        }
    }

    /// Parses settings from JSON. Fields left out take the defaults of the
    /// dimension the document names (2D when it names none).
    #[cfg(feature = "std")]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        use serde_json::Value;

        let mut overrides: Value = serde_json::from_str(json)?;
        let dimension = match overrides.get("dimension") {
            Some(value) => Dimension::deserialize(value)?,
            None => Dimension::default(),
        };

        let mut merged = serde_json::to_value(Self::for_dimension(dimension))?;
        merge(&mut merged, overrides.take());
        serde_json::from_value(merged)
    }

    #[cfg(feature = "std")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Writes every key of `overrides` into `base`, descending into nested objects.
#[cfg(feature = "std")]
fn merge(base: &mut serde_json::Value, overrides: serde_json::Value) {
    use serde_json::Value;

    match (base, overrides) {
        (Value::Object(base), Value::Object(overrides)) => {
            for (key, value) in overrides {
                match base.get_mut(&key) {
                    Some(slot) => merge(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overrides) => *base = overrides,
    }
}

/// Facing handed to renderers: an angle in radians for 2D boids, a unit
/// direction for 3D ones.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Heading {
    Angle(f32),
    Direction([f32; 3]),
}

/// One boid as a renderer needs it. 2D positions carry `z = 0`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AgentSnapshot {
    pub id: u64,
    pub position: [f32; 3],
    pub velocity: [f32; 3],
    pub heading: Heading,
    pub visible: bool,
}

impl AgentSnapshot {
    pub fn speed(&self) -> f32 {
        let [x, y, z] = self.velocity;
        libm::sqrtf(x * x + y * y + z * z)
    }
}

/// Every boid at the end of one frame
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FrameSnapshot {
    pub frame: u64,
    pub agents: Vec<AgentSnapshot>,
}

/// Totals over a headless run
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub final_population: usize,
    pub recomputed: u64,
    pub throttled: u64,
    pub culled: u64,
    pub dropped: u64,
    pub candidates: u64,
    pub elapsed_secs: f64,
}

impl RunSummary {
    pub fn frames_per_second(&self) -> f64 {
        if self.elapsed_secs > 0.0 {
            self.frames as f64 / self.elapsed_secs
        } else {
            0.0
        }
    }
}
