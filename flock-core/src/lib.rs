#![cfg_attr(not(feature = "std"), no_std)]

//! Flocking simulation core: Reynolds boids in 2D and 3D with a uniform
//! spatial grid for neighbor lookup and distance-based level of detail.

extern crate alloc;

pub mod behavior;
pub mod boid;
pub mod bounds;
pub mod config;
pub mod error;
pub mod flock;
pub mod grid;
pub mod lod;
mod math;
pub mod render;
pub mod vector;

pub use boid::{Boid, Boid2D, Boid3D, BoidId};
pub use bounds::Bounds;
pub use config::{FlockConfig, Radii, SpeedRange, SteeringMode, Weights};
pub use error::ConfigError;
pub use flock::{Flock, Flock2D, Flock3D, FrameStats};
pub use grid::{SpatialGrid, MAX_CELLS};
pub use lod::{Camera, Frustum, LodSettings, LodTier, UpdateDecision, UpdateScheduler};
pub use render::{RenderGuard, RenderHandle, RenderHost};
pub use vector::{Vector, Vector2D, Vector3D};
