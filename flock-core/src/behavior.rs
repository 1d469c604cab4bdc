//! Reynolds steering behaviors.
//!
//! Every behavior takes a candidate set that may contain the boid itself and
//! boids outside the behavior's radius (a grid query result or the whole
//! flock); both are filtered here by identity and exact squared distance.

use crate::boid::Boid;
use crate::config::{Radii, Weights};
use crate::vector::Vector;

/// The three steering forces acting on one boid, before weighting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Steering<V: Vector> {
    pub alignment: V,
    pub cohesion: V,
    pub separation: V,
}

impl<V: Vector> Steering<V> {
    pub fn blend(&self, weights: &Weights) -> V {
        self.alignment * weights.alignment
            + self.cohesion * weights.cohesion
            + self.separation * weights.separation
    }
}

/// Reynolds: steering = desired - velocity, where the desired velocity points
/// along `direction` at full speed.
fn steer<V: Vector>(boid: &Boid<V>, direction: V) -> V {
    (direction.set_mag(boid.max_speed) - boid.velocity).limit(boid.max_force)
}

/// Push away from a neighbor at `offset = position - other.position`,
/// weighted by inverse squared distance.
pub fn separation_term<V: Vector>(offset: V) -> V {
    let dist_sq = offset.magnitude_sq();
    if dist_sq > 0.0 {
        offset / dist_sq
    } else {
        V::zero()
    }
}

pub fn alignment<'a, V, I>(boid: &Boid<V>, others: I, radius: f32) -> V
where
    V: Vector + 'a,
    I: IntoIterator<Item = &'a Boid<V>>,
{
    let radius_sq = radius * radius;
    let mut sum = V::zero();
    let mut count = 0;

    for other in others {
        if other.id != boid.id && boid.position.distance_sq(&other.position) < radius_sq {
            sum += other.velocity;
            count += 1;
        }
    }

    if count > 0 {
        steer(boid, sum / count as f32)
    } else {
        V::zero()
    }
}

pub fn cohesion<'a, V, I>(boid: &Boid<V>, others: I, radius: f32) -> V
where
    V: Vector + 'a,
    I: IntoIterator<Item = &'a Boid<V>>,
{
    let radius_sq = radius * radius;
    let mut sum = V::zero();
    let mut count = 0;

    for other in others {
        if other.id != boid.id && boid.position.distance_sq(&other.position) < radius_sq {
            sum += other.position;
            count += 1;
        }
    }

    if count > 0 {
        seek(boid, sum / count as f32)
    } else {
        V::zero()
    }
}

pub fn separation<'a, V, I>(boid: &Boid<V>, others: I, radius: f32) -> V
where
    V: Vector + 'a,
    I: IntoIterator<Item = &'a Boid<V>>,
{
    let radius_sq = radius * radius;
    let mut sum = V::zero();
    let mut count = 0;

    for other in others {
        if other.id == boid.id {
            continue;
        }
        let offset = boid.position - other.position;
        let dist_sq = offset.magnitude_sq();
        // Coincident boids have no direction to push apart along.
        if dist_sq > 0.0 && dist_sq < radius_sq {
            sum += separation_term(offset);
            count += 1;
        }
    }

    if count > 0 {
        steer(boid, sum / count as f32)
    } else {
        V::zero()
    }
}

pub fn seek<V: Vector>(boid: &Boid<V>, target: V) -> V {
    steer(boid, (target - boid.position).normalize())
}

/// All three behaviors, each walking the candidates on its own.
pub fn steering<'a, V, I>(boid: &Boid<V>, others: I, radii: &Radii) -> Steering<V>
where
    V: Vector + 'a,
    I: IntoIterator<Item = &'a Boid<V>>,
    I::IntoIter: Clone,
{
    let others = others.into_iter();
    Steering {
        alignment: alignment(boid, others.clone(), radii.alignment),
        cohesion: cohesion(boid, others.clone(), radii.cohesion),
        separation: separation(boid, others, radii.separation),
    }
}

/// Same forces as [`steering`] from a single walk over the candidates.
pub fn steering_single_pass<'a, V, I>(boid: &Boid<V>, others: I, radii: &Radii) -> Steering<V>
where
    V: Vector + 'a,
    I: IntoIterator<Item = &'a Boid<V>>,
{
    let alignment_sq = radii.alignment * radii.alignment;
    let cohesion_sq = radii.cohesion * radii.cohesion;
    let separation_sq = radii.separation * radii.separation;

    let mut velocity_sum = V::zero();
    let mut position_sum = V::zero();
    let mut push_sum = V::zero();
    let mut alignment_count = 0;
    let mut cohesion_count = 0;
    let mut separation_count = 0;

    for other in others {
        if other.id == boid.id {
            continue;
        }

        let offset = boid.position - other.position;
        let dist_sq = offset.magnitude_sq();

        if dist_sq < alignment_sq {
            velocity_sum += other.velocity;
            alignment_count += 1;
        }
        if dist_sq < cohesion_sq {
            position_sum += other.position;
            cohesion_count += 1;
        }
        if dist_sq > 0.0 && dist_sq < separation_sq {
            push_sum += offset / dist_sq;
            separation_count += 1;
        }
    }

    let mut forces = Steering {
        alignment: V::zero(),
        cohesion: V::zero(),
        separation: V::zero(),
    };
    if alignment_count > 0 {
        forces.alignment = steer(boid, velocity_sum / alignment_count as f32);
    }
    if cohesion_count > 0 {
        forces.cohesion = seek(boid, position_sum / cohesion_count as f32);
    }
    if separation_count > 0 {
        forces.separation = steer(boid, push_sum / separation_count as f32);
    }
    forces
}

/// Weighted blend of the three behaviors, ready to be applied as a force.
pub fn flock<'a, V, I>(boid: &Boid<V>, others: I, radii: &Radii, weights: &Weights) -> V
where
    V: Vector + 'a,
    I: IntoIterator<Item = &'a Boid<V>>,
    I::IntoIter: Clone,
{
    steering(boid, others, radii).blend(weights)
}

pub fn flock_single_pass<'a, V, I>(boid: &Boid<V>, others: I, radii: &Radii, weights: &Weights) -> V
where
    V: Vector + 'a,
    I: IntoIterator<Item = &'a Boid<V>>,
{
    steering_single_pass(boid, others, radii).blend(weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boid::BoidId;
    use crate::vector::{Vector2D, Vector3D};
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    const EPS: f32 = 1e-5;

    fn boid(id: u64, x: f32, y: f32, vx: f32, vy: f32) -> Boid<Vector2D> {
        Boid::new(BoidId(id), Vector2D::new(x, y), Vector2D::new(vx, vy), 4.0, 0.2)
    }

    #[test]
    fn test_no_neighbors_gives_zero_forces() {
        let me = boid(0, 0.0, 0.0, 1.0, 0.0);
        let far = boid(1, 500.0, 500.0, 0.0, 1.0);
        let candidates = [&me, &far];
        let radii = Radii::uniform(50.0);

        let forces = steering(&me, candidates, &radii);
        assert_eq!(forces.alignment, Vector2D::zero());
        assert_eq!(forces.cohesion, Vector2D::zero());
        assert_eq!(forces.separation, Vector2D::zero());
    }

    #[test]
    fn test_self_is_never_a_neighbor() {
        let me = boid(0, 0.0, 0.0, 1.0, 0.0);
        assert_eq!(alignment(&me, [&me], 50.0), Vector2D::zero());
        assert_eq!(cohesion(&me, [&me], 50.0), Vector2D::zero());
        assert_eq!(separation(&me, [&me], 50.0), Vector2D::zero());
    }

    #[test]
    fn test_alignment_steers_towards_neighbor_heading() {
        let me = boid(0, 0.0, 0.0, 1.0, 0.0);
        let other = boid(1, 10.0, 0.0, 0.0, 1.0);

        let force = alignment(&me, [&other], 50.0);

        assert!(force.y > 0.0);
        assert!(force.x < 0.0);
        assert!((force.magnitude() - 0.2).abs() < EPS);
    }

    #[test]
    fn test_cohesion_steers_towards_centroid() {
        let me = boid(0, 0.0, 0.0, 0.0, 0.0);
        let a = boid(1, 10.0, 10.0, 0.0, 0.0);
        let b = boid(2, 10.0, -10.0, 0.0, 0.0);

        let force = cohesion(&me, [&a, &b], 50.0);

        assert!(force.x > 0.0);
        assert!(force.y.abs() < EPS);
    }

    #[test]
    fn test_separation_pushes_away() {
        let me = boid(0, 0.0, 0.0, 0.0, 0.0);
        let other = boid(1, 5.0, 0.0, 0.0, 0.0);

        let force = separation(&me, [&other], 50.0);

        assert!(force.x < 0.0);
        assert!(force.y.abs() < EPS);
    }

    #[test]
    fn test_separation_ignores_coincident_boid() {
        let me = boid(0, 3.0, 3.0, 1.0, 0.0);
        let twin = boid(1, 3.0, 3.0, 0.0, 1.0);

        assert_eq!(separation(&me, [&twin], 50.0), Vector2D::zero());
        // Alignment and cohesion still count it.
        assert!(!alignment(&me, [&twin], 50.0).is_zero());
    }

    #[test]
    fn test_separation_term_is_monotonic_in_distance() {
        let mut previous = f32::INFINITY;
        for d in [0.5, 1.0, 2.0, 5.0, 10.0, 49.0] {
            let term = separation_term(Vector3D::new(d, 0.0, 0.0)).magnitude();
            assert!(term <= previous, "contribution at {} grew to {}", d, term);
            assert!((term - 1.0 / d).abs() < EPS);
            previous = term;
        }
        assert_eq!(separation_term(Vector3D::zero()), Vector3D::zero());
    }

    #[test]
    fn test_seek() {
        let me = boid(0, 0.0, 0.0, 0.0, 0.0);
        let force = seek(&me, Vector2D::new(0.0, 100.0));
        assert!((force.y - 0.2).abs() < EPS);

        // Already at the target: only braking remains.
        let moving = boid(1, 5.0, 5.0, 1.0, 0.0);
        let brake = seek(&moving, Vector2D::new(5.0, 5.0));
        assert!(brake.x < 0.0);
    }

    #[test]
    fn test_blend_is_linear_in_weights() {
        let forces = Steering {
            alignment: Vector2D::new(1.0, 0.0),
            cohesion: Vector2D::new(0.0, 1.0),
            separation: Vector2D::new(-1.0, -1.0),
        };
        let weights = Weights {
            alignment: 2.0,
            cohesion: 3.0,
            separation: 0.0,
        };
        assert_eq!(forces.blend(&weights), Vector2D::new(2.0, 3.0));
    }

    #[test]
    fn test_forces_never_exceed_max_force() {
        let mut rng = SmallRng::seed_from_u64(42);
        let flock: Vec<Boid<Vector3D>> = (0..60)
            .map(|i| {
                let position = Vector3D::new(
                    rng.gen_range(-30.0..30.0),
                    rng.gen_range(-30.0..30.0),
                    rng.gen_range(-30.0..30.0),
                );
                let velocity = Vector3D::random_unit(&mut rng) * rng.gen_range(0.0..2.0);
                Boid::new(BoidId(i), position, velocity, 2.0, 0.03)
            })
            .collect();
        let radii = Radii {
            alignment: 25.0,
            cohesion: 25.0,
            separation: 12.5,
        };

        for me in &flock {
            let forces = steering(me, &flock, &radii);
            for force in [forces.alignment, forces.cohesion, forces.separation] {
                assert!(force.magnitude() <= me.max_force + EPS);
            }
        }
    }

    #[test]
    fn test_single_pass_matches_per_behavior() {
        let mut rng = SmallRng::seed_from_u64(9);
        let flock: Vec<Boid<Vector2D>> = (0..80)
            .map(|i| {
                boid(
                    i,
                    rng.gen_range(0.0..300.0),
                    rng.gen_range(0.0..300.0),
                    rng.gen_range(-4.0..4.0),
                    rng.gen_range(-4.0..4.0),
                )
            })
            .collect();
        let radii = Radii {
            alignment: 50.0,
            cohesion: 100.0,
            separation: 30.0,
        };

        for me in &flock {
            let naive = steering(me, &flock, &radii);
            let fused = steering_single_pass(me, &flock, &radii);
            assert!(naive.alignment.distance(&fused.alignment) < 1e-4);
            assert!(naive.cohesion.distance(&fused.cohesion) < 1e-4);
            assert!(naive.separation.distance(&fused.separation) < 1e-4);
        }
    }
}
