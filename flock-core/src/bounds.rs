use rand::Rng;

use crate::error::ConfigError;
use crate::vector::{Vector, Vector2D, Vector3D};

/// Axis-aligned region the flock lives in. Boids leaving one face re-enter
/// through the opposite one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds<V: Vector> {
    pub min: V,
    pub max: V,
}

impl<V: Vector> Bounds<V> {
    pub fn new(min: V, max: V) -> Result<Self, ConfigError> {
        let bounds = Self { min, max };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for axis in 0..V::DIM {
            let extent = self.extent(axis);
            if !(extent.is_finite() && extent > 0.0) {
                return Err(ConfigError::EmptyBounds { axis, extent });
            }
        }
        Ok(())
    }

    pub fn extent(&self, axis: usize) -> f32 {
        self.max.axis(axis) - self.min.axis(axis)
    }

    pub fn center(&self) -> V {
        (self.min + self.max) * 0.5
    }

    /// Closed on both faces: a boid just wrapped onto a face is inside.
    pub fn contains(&self, point: &V) -> bool {
        (0..V::DIM).all(|axis| {
            let value = point.axis(axis);
            value >= self.min.axis(axis) && value <= self.max.axis(axis)
        })
    }

    /// Moves `point` to the opposite face on every axis it has crossed.
    /// Returns whether any axis wrapped.
    ///
    /// Distances are not wrap-aware: two boids on opposite faces are as far
    /// apart as their raw coordinates say.
    pub fn wrap(&self, point: &mut V) -> bool {
        let mut wrapped = false;
        for axis in 0..V::DIM {
            let value = point.axis(axis);
            if value > self.max.axis(axis) {
                point.set_axis(axis, self.min.axis(axis));
                wrapped = true;
            } else if value < self.min.axis(axis) {
                point.set_axis(axis, self.max.axis(axis));
                wrapped = true;
            }
        }
        wrapped
    }

    /// Uniform point in the box scaled by `scale` about its center.
    pub fn sample<R: Rng>(&self, rng: &mut R, scale: f32) -> V {
        let center = self.center();
        let mut point = center;
        for axis in 0..V::DIM {
            let half = self.extent(axis) * 0.5 * scale;
            if half > 0.0 {
                point.set_axis(axis, center.axis(axis) + rng.gen_range(-half..half));
            }
        }
        point
    }
}

impl Bounds<Vector2D> {
    /// Canvas-style bounds `[0, width] x [0, height]`.
    pub fn planar(width: f32, height: f32) -> Result<Self, ConfigError> {
        Self::new(Vector2D::zero(), Vector2D::new(width, height))
    }
}

impl Bounds<Vector3D> {
    /// Cube `[-half_extent, half_extent]` on every axis.
    pub fn cube(half_extent: f32) -> Result<Self, ConfigError> {
        Self::new(
            Vector3D::new(-half_extent, -half_extent, -half_extent),
            Vector3D::new(half_extent, half_extent, half_extent),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_rejects_empty_extent() {
        assert!(Bounds::planar(0.0, 100.0).is_err());
        assert!(Bounds::cube(-5.0).is_err());
        assert!(Bounds::planar(f32::NAN, 100.0).is_err());
    }

    #[test]
    fn test_wrap_each_axis_independently() {
        let bounds = Bounds::cube(50.0).unwrap();
        let mut p = Vector3D::new(50.5, -10.0, -51.0);

        assert!(bounds.wrap(&mut p));
        assert_eq!(p, Vector3D::new(-50.0, -10.0, 50.0));
    }

    #[test]
    fn test_wrap_planar() {
        let bounds = Bounds::planar(800.0, 600.0).unwrap();
        let mut p = Vector2D::new(-1.0, 601.0);

        assert!(bounds.wrap(&mut p));
        assert_eq!(p, Vector2D::new(800.0, 0.0));

        let mut inside = Vector2D::new(800.0, 0.0);
        assert!(!bounds.wrap(&mut inside));
    }

    #[test]
    fn test_sample_stays_inside_scaled_region() {
        let bounds = Bounds::cube(50.0).unwrap();
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..500 {
            let p = bounds.sample(&mut rng, 0.8);
            assert!(p.x.abs() <= 40.0 && p.y.abs() <= 40.0 && p.z.abs() <= 40.0);
        }
    }
}
