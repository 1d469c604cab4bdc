//! Render resources owned by boids.
//!
//! A renderer hands each boid an opaque handle when it is spawned. The boid
//! owns it for the rest of its life and the handle is disposed exactly once:
//! explicitly when the flock shrinks, or on drop otherwise.

use alloc::boxed::Box;
use core::fmt;

use crate::boid::BoidId;

/// An externally owned resource (mesh, sprite, buffer slot, ...) drawn for one boid.
pub trait RenderHandle {
    fn dispose(&mut self);
}

/// Creates render handles for newly spawned boids.
pub trait RenderHost {
    fn acquire(&mut self, id: BoidId) -> Box<dyn RenderHandle>;
}

impl<F> RenderHost for F
where
    F: FnMut(BoidId) -> Box<dyn RenderHandle>,
{
    fn acquire(&mut self, id: BoidId) -> Box<dyn RenderHandle> {
        self(id)
    }
}

/// Holds at most one handle and disposes it at most once.
#[derive(Default)]
pub struct RenderGuard {
    handle: Option<Box<dyn RenderHandle>>,
}

impl RenderGuard {
    pub fn new(handle: Box<dyn RenderHandle>) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.handle.is_some()
    }

    /// Disposes the handle if one is still held.
    pub fn release(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.dispose();
        }
    }
}

impl Drop for RenderGuard {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for RenderGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderGuard")
            .field("attached", &self.is_attached())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Counted(Rc<Cell<u32>>);

    impl RenderHandle for Counted {
        fn dispose(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_release_disposes_once() {
        let disposed = Rc::new(Cell::new(0));
        let mut guard = RenderGuard::new(Box::new(Counted(disposed.clone())));

        guard.release();
        guard.release();
        drop(guard);

        assert_eq!(disposed.get(), 1);
    }

    #[test]
    fn test_drop_disposes() {
        let disposed = Rc::new(Cell::new(0));
        {
            let _guard = RenderGuard::new(Box::new(Counted(disposed.clone())));
        }
        assert_eq!(disposed.get(), 1);
    }

    #[test]
    fn test_closure_host() {
        let disposed = Rc::new(Cell::new(0));
        let counter = disposed.clone();
        let mut host = move |_id: BoidId| -> Box<dyn RenderHandle> { Box::new(Counted(counter.clone())) };

        let mut guard = RenderGuard::new(host.acquire(BoidId(3)));
        assert!(guard.is_attached());
        guard.release();
        assert!(!guard.is_attached());
        assert_eq!(disposed.get(), 1);
    }
}
