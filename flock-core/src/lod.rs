//! Level of detail for 3D flocks.
//!
//! Boids far from the camera, or outside its view, recompute their steering
//! less often or not at all. They keep integrating and wrapping every frame
//! so the flock never freezes.

use crate::boid::Boid3D;
use crate::error::ConfigError;
use crate::math;
use crate::vector::{Vector, Vector3D};

/// Distance band a boid falls in, measured from the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LodTier {
    Near,
    Mid,
    Far,
    /// Past the far distance: culled.
    Beyond,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LodSettings {
    pub near: f32,
    pub mid: f32,
    pub far: f32,
    /// Mid-tier boids recompute once every `mid_interval` frames.
    pub mid_interval: u32,
    pub far_interval: u32,
    /// Radius of the sphere tested against the view frustum.
    pub bounding_radius: f32,
}

impl Default for LodSettings {
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

impl LodSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.near.is_finite() && self.mid.is_finite() && self.far.is_finite()) {
            return Err(ConfigError::InvalidLod("distances must be finite"));
        }
        if !(0.0 < self.near && self.near < self.mid && self.mid < self.far) {
            return Err(ConfigError::InvalidLod("distances must be positive and increasing"));
        }
        if self.mid_interval == 0 || self.far_interval == 0 {
            return Err(ConfigError::InvalidLod("update intervals must be at least 1"));
        }
        if !(self.bounding_radius.is_finite() && self.bounding_radius >= 0.0) {
            return Err(ConfigError::InvalidLod("bounding radius must be non-negative"));
        }
        Ok(())
    }
}

/// Perspective camera the 3D flock is viewed through.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vector3D,
    pub target: Vector3D,
    pub up: Vector3D,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::looking_at(Vector3D::new(0.0, 0.0, 80.0), Vector3D::zero())
    }
}

impl Camera {
    pub fn looking_at(position: Vector3D, target: Vector3D) -> Self {
        Self {
            position,
            target,
            up: Vector3D::new(0.0, 1.0, 0.0),
            fov_y: 75.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }

    pub fn frustum(&self) -> Frustum {
        Frustum::from_camera(self)
    }

    /// Checks that the camera spans a proper frustum: a positive aspect, a
    /// field of view strictly between 0 and pi, clip distances with
    /// `0 < near < far`, and an up vector that is not along the view axis.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.aspect.is_finite() && self.aspect > 0.0) {
            return Err(ConfigError::InvalidCamera("aspect ratio must be positive"));
        }
        if !(self.fov_y.is_finite() && self.fov_y > 0.0 && self.fov_y < core::f32::consts::PI) {
            return Err(ConfigError::InvalidCamera("field of view must be between 0 and 180 degrees"));
        }
        if !(self.near.is_finite() && self.far.is_finite() && 0.0 < self.near && self.near < self.far) {
            return Err(ConfigError::InvalidCamera("clip distances must satisfy 0 < near < far"));
        }
        let forward = self.target - self.position;
        if forward.is_zero() || !(forward.x.is_finite() && forward.y.is_finite() && forward.z.is_finite()) {
            return Err(ConfigError::InvalidCamera("target must differ from position"));
        }
        if forward.cross(&self.up).is_zero() {
            return Err(ConfigError::InvalidCamera("up vector must not lie along the view direction"));
        }
        Ok(())
    }
}

/// Oriented plane; points with a non-negative signed distance are inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vector3D,
    pub offset: f32,
}

impl Plane {
    pub fn through(normal: Vector3D, point: Vector3D) -> Self {
        let normal = normal.normalize();
        Self {
            normal,
            offset: -normal.dot(&point),
        }
    }

    pub fn signed_distance(&self, point: &Vector3D) -> f32 {
        self.normal.dot(point) + self.offset
    }

    fn facing(self, inside: &Vector3D) -> Self {
        if self.signed_distance(inside) < 0.0 {
            Self {
                normal: -self.normal,
                offset: -self.offset,
            }
        } else {
            self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Builds the near, far and four side planes of `camera`.
    ///
    /// A degenerate camera (target on the eye, or up along the view axis)
    /// yields zero-normal side planes that accept everything.
    pub fn from_camera(camera: &Camera) -> Self {
        let eye = camera.position;
        let forward = (camera.target - eye).normalize();
        let right = forward.cross(&camera.up).normalize();
        let up = right.cross(&forward);

        let tan_v = math::tan(camera.fov_y * 0.5);
        let tan_h = tan_v * camera.aspect;
        let inside = eye + forward * ((camera.near + camera.far) * 0.5);

        let right_edge = forward + right * tan_h;
        let left_edge = forward - right * tan_h;
        let top_edge = forward + up * tan_v;
        let bottom_edge = forward - up * tan_v;

        let planes = [
            Plane::through(forward, eye + forward * camera.near),
            Plane::through(-forward, eye + forward * camera.far),
            Plane::through(right_edge.cross(&up), eye),
            Plane::through(up.cross(&left_edge), eye),
            Plane::through(top_edge.cross(&right), eye),
            Plane::through(right.cross(&bottom_edge), eye),
        ];

        Self {
            planes: planes.map(|plane| plane.facing(&inside)),
        }
    }

    pub fn contains(&self, point: &Vector3D) -> bool {
        self.intersects_sphere(point, 0.0)
    }

    pub fn intersects_sphere(&self, center: &Vector3D, radius: f32) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.signed_distance(center) >= -radius)
    }
}

/// What one boid does this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateDecision {
    pub tier: LodTier,
    pub visible: bool,
    /// Whether steering forces are recomputed this frame.
    pub recompute: bool,
}

impl UpdateDecision {
    /// Full update, used when no view is involved.
    pub const FULL: UpdateDecision = UpdateDecision {
        tier: LodTier::Near,
        visible: true,
        recompute: true,
    };
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateScheduler {
    settings: LodSettings,
}

impl UpdateScheduler {
    pub fn new(settings: LodSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &LodSettings {
        &self.settings
    }

    pub fn classify(&self, distance: f32) -> LodTier {
        if distance < self.settings.near {
            LodTier::Near
        } else if distance < self.settings.mid {
            LodTier::Mid
        } else if distance < self.settings.far {
            LodTier::Far
        } else {
            LodTier::Beyond
        }
    }

    /// Throttled tiers are staggered by boid id so that each frame
    /// recomputes a similar share of them.
    pub fn plan(&self, frame: u64, boid: &Boid3D, eye: &Vector3D, frustum: &Frustum) -> UpdateDecision {
        let tier = self.classify(boid.position.distance(eye));
        let in_view = frustum.intersects_sphere(&boid.position, self.settings.bounding_radius);
        let visible = in_view && tier != LodTier::Beyond;

        let due = |interval: u32| frame.wrapping_add(boid.id.0) % u64::from(interval) == 0;
        let recompute = visible
            && match tier {
                LodTier::Near => true,
                LodTier::Mid => due(self.settings.mid_interval),
                LodTier::Far => due(self.settings.far_interval),
                LodTier::Beyond => false,
            };

        UpdateDecision {
            tier,
            visible,
            recompute,
        }
    }
}
