//! Conversion from serialized settings to simulation types.

use flock_core::{Bounds, Camera, ConfigError, FlockConfig, LodSettings, Radii, SpeedRange, Vector2D, Vector3D, Weights};
use flock_shared::{CameraSettings, Dimension, FlockSettings, LevelOfDetail};

/// Flock configuration for `settings`, starting from the preset of its
/// dimension so that knobs the file cannot express keep their defaults.
pub fn flock_config(settings: &FlockSettings) -> FlockConfig {
    let preset = match settings.dimension {
        Dimension::Planar => FlockConfig::planar(),
        Dimension::Spatial => FlockConfig::spatial(),
    };

    FlockConfig {
        weights: Weights {
            alignment: settings.alignment_weight,
            cohesion: settings.cohesion_weight,
            separation: settings.separation_weight,
        },
        radii: Radii {
            alignment: settings.alignment_radius,
            cohesion: settings.cohesion_radius,
            separation: settings.separation_radius,
        },
        max_speed: settings.max_speed,
        max_force: settings.max_force,
        initial_speed: SpeedRange {
            min: settings.min_initial_speed,
            max: settings.max_initial_speed,
        },
        cell_size: settings.cell_size,
        ..preset
    }
}

pub fn planar_bounds(settings: &FlockSettings) -> Result<Bounds<Vector2D>, ConfigError> {
    Bounds::planar(settings.width, settings.height)
}

pub fn spatial_bounds(settings: &FlockSettings) -> Result<Bounds<Vector3D>, ConfigError> {
    Bounds::cube(settings.half_extent)
}

pub fn lod_settings(lod: &LevelOfDetail) -> LodSettings {
    LodSettings {
        near: lod.near,
        mid: lod.mid,
        far: lod.far,
        mid_interval: lod.mid_interval,
        far_interval: lod.far_interval,
        bounding_radius: lod.bounding_radius,
    }
}

pub fn camera(settings: &CameraSettings) -> Result<Camera, ConfigError> {
    let [px, py, pz] = settings.position;
    let [tx, ty, tz] = settings.target;
    let camera = Camera {
        fov_y: settings.fov_degrees.to_radians(),
        aspect: settings.aspect,
        ..Camera::looking_at(Vector3D::new(px, py, pz), Vector3D::new(tx, ty, tz))
    };
    camera.validate()?;
    Ok(camera)
}
