use core::f32::consts::TAU;
use core::fmt::Debug;
use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use rand::Rng;

use crate::math;

/// Operations shared by the 2D and 3D vector types.
///
/// Everything in the simulation is written against this trait so that one
/// grid, one set of steering behaviors and one driver serve both dimensions.
pub trait Vector:
    Copy
    + Debug
    + Default
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<f32, Output = Self>
    + Div<f32, Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
{
    /// Number of axes.
    const DIM: usize;

    /// What a renderer needs to orient a boid moving along this vector.
    type Heading: Copy + Debug + PartialEq;

    fn zero() -> Self;

    fn axis(&self, axis: usize) -> f32;

    fn set_axis(&mut self, axis: usize, value: f32);

    fn dot(&self, other: &Self) -> f32;

    /// Uniformly distributed unit vector.
    fn random_unit<R: Rng>(rng: &mut R) -> Self;

    fn heading(&self) -> Self::Heading;

    fn magnitude_sq(&self) -> f32 {
        self.dot(self)
    }

    /// Euclidean length. Vectors whose squared length would overflow or
    /// underflow `f32` are rescaled by their largest component first.
    fn magnitude(&self) -> f32 {
        let squared = self.magnitude_sq();
        if squared.is_finite() && squared >= f32::MIN_POSITIVE {
            return math::sqrt(squared);
        }

        let largest = (0..Self::DIM)
            .map(|axis| {
                let value = self.axis(axis);
                if value < 0.0 {
                    -value
                } else {
                    value
                }
            })
            .fold(0.0, f32::max);
        if largest == 0.0 || !largest.is_finite() {
            return math::sqrt(squared);
        }
        math::sqrt((*self / largest).magnitude_sq()) * largest
    }

    fn is_zero(&self) -> bool {
        (0..Self::DIM).all(|axis| self.axis(axis) == 0.0)
    }

    /// Unit vector along `self`, or the zero vector when `self` is zero.
    fn normalize(&self) -> Self {
        let mag = self.magnitude();
        if mag > 0.0 {
            *self / mag
        } else {
            Self::zero()
        }
    }

    /// Rescales to length `len`. A zero vector has no direction and is
    /// returned unchanged.
    fn set_mag(&self, len: f32) -> Self {
        let mag = self.magnitude();
        if mag > 0.0 {
            *self * (len / mag)
        } else {
            *self
        }
    }

    fn limit(&self, max: f32) -> Self {
        if self.magnitude() > max {
            self.set_mag(max)
        } else {
            *self
        }
    }

    fn distance_sq(&self, other: &Self) -> f32 {
        (*self - *other).magnitude_sq()
    }

    fn distance(&self, other: &Self) -> f32 {
        math::sqrt(self.distance_sq(other))
    }
}

/// A 2D vector used for position and velocity
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector2D {
    pub x: f32,
    pub y: f32,
}

/// A 3D vector used for position and velocity
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector3D {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector2D {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Vector3D {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn cross(&self, other: &Vector3D) -> Vector3D {
        Vector3D::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }
}

macro_rules! impl_vector_ops {
    ($ty:ident { $($field:ident),+ }) => {
        impl Add for $ty {
            type Output = Self;

            fn add(self, other: Self) -> Self {
                Self { $($field: self.$field + other.$field),+ }
            }
        }

        impl Sub for $ty {
            type Output = Self;

            fn sub(self, other: Self) -> Self {
                Self { $($field: self.$field - other.$field),+ }
            }
        }

        impl Mul<f32> for $ty {
            type Output = Self;

            fn mul(self, scalar: f32) -> Self {
                Self { $($field: self.$field * scalar),+ }
            }
        }

        /// Division by zero yields the zero vector instead of infinities.
        impl Div<f32> for $ty {
            type Output = Self;

            fn div(self, scalar: f32) -> Self {
                if scalar == 0.0 {
                    log::warn!("{}: division of {:?} by zero", stringify!($ty), self);
                    return Self::default();
                }
                Self { $($field: self.$field / scalar),+ }
            }
        }

        impl Neg for $ty {
            type Output = Self;

            fn neg(self) -> Self {
                Self { $($field: -self.$field),+ }
            }
        }

        impl AddAssign for $ty {
            fn add_assign(&mut self, other: Self) {
                $(self.$field += other.$field;)+
            }
        }

        impl SubAssign for $ty {
            fn sub_assign(&mut self, other: Self) {
                $(self.$field -= other.$field;)+
            }
        }
    };
}

impl_vector_ops!(Vector2D { x, y });
impl_vector_ops!(Vector3D { x, y, z });

impl Vector for Vector2D {
    const DIM: usize = 2;

    /// Angle in radians, `atan2(y, x)`.
    type Heading = f32;

    fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    fn axis(&self, axis: usize) -> f32 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => 0.0,
        }
    }

    fn set_axis(&mut self, axis: usize, value: f32) {
        match axis {
            0 => self.x = value,
            1 => self.y = value,
            _ => {}
        }
    }

    fn dot(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    fn random_unit<R: Rng>(rng: &mut R) -> Self {
        let angle = rng.gen_range(0.0..TAU);
        let (sin, cos) = math::sin_cos(angle);
        Self::new(cos, sin)
    }

    fn heading(&self) -> f32 {
        math::atan2(self.y, self.x)
    }
}

impl Vector for Vector3D {
    const DIM: usize = 3;

    /// Unit direction of travel.
    type Heading = Vector3D;

    fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    fn axis(&self, axis: usize) -> f32 {
        match axis {
            0 => self.x,
            1 => self.y,
            2 => self.z,
            _ => 0.0,
        }
    }

    fn set_axis(&mut self, axis: usize, value: f32) {
        match axis {
            0 => self.x = value,
            1 => self.y = value,
            2 => self.z = value,
            _ => {}
        }
    }

    fn dot(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    // Sampling phi as acos(2u - 1) keeps points from bunching at the poles.
    fn random_unit<R: Rng>(rng: &mut R) -> Self {
        let theta = rng.gen_range(0.0..TAU);
        let phi = math::acos(2.0 * rng.gen::<f32>() - 1.0);
        let (sin_theta, cos_theta) = math::sin_cos(theta);
        let (sin_phi, cos_phi) = math::sin_cos(phi);
        Self::new(sin_phi * cos_theta, sin_phi * sin_theta, cos_phi)
    }

    fn heading(&self) -> Vector3D {
        self.normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_vector2d_magnitude() {
        let v = Vector2D::new(3.0, 4.0);
        assert_eq!(v.magnitude(), 5.0);
        assert_eq!(v.magnitude_sq(), 25.0);
    }

    #[test]
    fn test_vector2d_operations() {
        let v1 = Vector2D::new(1.0, 2.0);
        let v2 = Vector2D::new(3.0, 4.0);

        assert_eq!(v1 + v2, Vector2D::new(4.0, 6.0));
        assert_eq!(v2 - v1, Vector2D::new(2.0, 2.0));
        assert_eq!(v1 * 2.0, Vector2D::new(2.0, 4.0));
        assert_eq!(v2 / 2.0, Vector2D::new(1.5, 2.0));
        assert_eq!(-v1, Vector2D::new(-1.0, -2.0));
    }

    #[test]
    fn test_limit_keeps_direction_of_huge_vectors() {
        let clamped = Vector2D::new(1e20, 1e20).limit(4.0);
        assert!((clamped.magnitude() - 4.0).abs() < 1e-4);
        assert!((clamped.x - clamped.y).abs() < 1e-5);
        assert!(clamped.x > 0.0);

        let huge = Vector3D::new(-3e30, 0.0, 4e30);
        assert!((huge.magnitude() - 5e30).abs() < 1e25);
        let unit = huge.normalize();
        assert!((unit.x + 0.6).abs() < 1e-5 && (unit.z - 0.8).abs() < 1e-5);
    }

    #[test]
    fn test_tiny_vectors_keep_direction() {
        let tiny = Vector2D::new(3e-25, 4e-25);
        assert!(!tiny.is_zero());
        assert!((tiny.magnitude() - 5e-25).abs() < 1e-30);
        let unit = tiny.normalize();
        assert!((unit.x - 0.6).abs() < 1e-5 && (unit.y - 0.8).abs() < 1e-5);
    }

    #[test]
    fn test_division_by_zero_is_zero_vector() {
        assert_eq!(Vector2D::new(1.0, 1.0) / 0.0, Vector2D::zero());
        assert_eq!(Vector3D::new(1.0, -2.0, 3.0) / 0.0, Vector3D::zero());
    }

    #[test]
    fn test_normalize_zero_vector() {
        assert_eq!(Vector2D::zero().normalize(), Vector2D::zero());
        assert_eq!(Vector3D::zero().normalize(), Vector3D::zero());
    }

    #[test]
    fn test_set_mag() {
        let v = Vector3D::new(0.0, 3.0, 4.0).set_mag(10.0);
        assert!((v.magnitude() - 10.0).abs() < 1e-5);
        assert!((v.y - 6.0).abs() < 1e-5);

        assert_eq!(Vector3D::zero().set_mag(10.0), Vector3D::zero());
    }

    #[test]
    fn test_limit() {
        let long = Vector2D::new(30.0, 40.0).limit(5.0);
        assert!((long.magnitude() - 5.0).abs() < 1e-5);

        let short = Vector2D::new(1.0, 1.0);
        assert_eq!(short.limit(5.0), short);
    }

    #[test]
    fn test_distance() {
        let a = Vector3D::new(1.0, 2.0, 3.0);
        let b = Vector3D::new(4.0, 6.0, 3.0);
        assert_eq!(a.distance(&b), 5.0);
        assert_eq!(a.distance_sq(&b), 25.0);
    }

    #[test]
    fn test_cross() {
        let x = Vector3D::new(1.0, 0.0, 0.0);
        let y = Vector3D::new(0.0, 1.0, 0.0);
        assert_eq!(x.cross(&y), Vector3D::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_random_units_have_unit_length() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..200 {
            assert!((Vector2D::random_unit(&mut rng).magnitude() - 1.0).abs() < 1e-5);
            assert!((Vector3D::random_unit(&mut rng).magnitude() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_random_sphere_points_cover_both_hemispheres() {
        let mut rng = SmallRng::seed_from_u64(11);
        let samples: Vec<Vector3D> = (0..2000).map(|_| Vector3D::random_unit(&mut rng)).collect();

        let mean_z = samples.iter().map(|v| v.z).sum::<f32>() / samples.len() as f32;
        assert!(mean_z.abs() < 0.1);

        // Uniform on the sphere means z is uniform in [-1, 1]: about 10 % of
        // samples fall in each polar cap of height 0.2.
        let polar = samples.iter().filter(|v| v.z > 0.8).count();
        assert!(polar > 120 && polar < 280, "polar cap count {}", polar);
    }

    #[test]
    fn test_heading() {
        let h = Vector2D::new(0.0, 2.0).heading();
        assert!((h - core::f32::consts::FRAC_PI_2).abs() < 1e-6);

        let d = Vector3D::new(0.0, 0.0, -3.0).heading();
        assert_eq!(d, Vector3D::new(0.0, 0.0, -1.0));
    }
}
