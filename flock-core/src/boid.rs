use alloc::boxed::Box;

use crate::bounds::Bounds;
use crate::render::{RenderGuard, RenderHandle};
use crate::vector::{Vector, Vector2D, Vector3D};

/// Stable identity of a boid within its flock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BoidId(pub u64);

/// A single boid entity
#[derive(Debug)]
pub struct Boid<V: Vector> {
    pub id: BoidId,
    pub position: V,
    pub velocity: V,
    /// Per-frame force accumulator, zeroed by every [`Boid::update`].
    pub acceleration: V,
    pub max_speed: f32,
    pub max_force: f32,
    /// Unit direction the boid is drawn facing. Only changes while moving.
    pub facing: V,
    /// Cleared when the view culls this boid.
    pub visible: bool,
    render: RenderGuard,
}

pub type Boid2D = Boid<Vector2D>;
pub type Boid3D = Boid<Vector3D>;

impl<V: Vector> Boid<V> {
    pub fn new(id: BoidId, position: V, velocity: V, max_speed: f32, max_force: f32) -> Self {
        Self {
            id,
            position,
            velocity,
            acceleration: V::zero(),
            max_speed,
            max_force,
            facing: velocity.normalize(),
            visible: true,
            render: RenderGuard::default(),
        }
    }

    pub fn apply_force(&mut self, force: V) {
        self.acceleration += force;
    }

    /// Integrates one frame: velocity from acceleration (clamped to
    /// `max_speed`), then position from velocity.
    pub fn update(&mut self) {
        self.velocity += self.acceleration;
        self.velocity = self.velocity.limit(self.max_speed);
        self.position += self.velocity;
        self.acceleration = V::zero();

        if !self.velocity.is_zero() {
            self.facing = self.velocity.normalize();
        }
    }

    pub fn wrap_edges(&mut self, bounds: &Bounds<V>) -> bool {
        bounds.wrap(&mut self.position)
    }

    pub fn heading(&self) -> V::Heading {
        self.velocity.heading()
    }

    pub fn attach_render(&mut self, handle: Box<dyn RenderHandle>) {
        self.render.release();
        self.render = RenderGuard::new(handle);
    }

    pub fn has_render_handle(&self) -> bool {
        self.render.is_attached()
    }

    /// Releases the render handle. Safe to call more than once.
    pub fn dispose(&mut self) {
        self.render.release();
    }
}
