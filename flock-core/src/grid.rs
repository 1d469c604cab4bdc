//! Uniform spatial grid for neighbor lookup.
//!
//! The grid stores indices into the flock's boid list and is rebuilt from
//! scratch every frame. A query returns a superset of the boids within the
//! radius; callers filter by exact distance.

use alloc::vec::Vec;

use crate::bounds::Bounds;
use crate::error::{positive, ConfigError};
use crate::math;
use crate::vector::Vector;

/// Cell coordinates, one per axis. Axes the vector type does not have stay 0.
pub type Cell = [usize; 3];

/// Upper limit on the number of cells. A cell size that would need more is
/// doubled until the layout fits.
pub const MAX_CELLS: usize = 1 << 20;

#[derive(Debug, Clone)]
pub struct SpatialGrid<V: Vector> {
    cell_size: f32,
    bounds: Bounds<V>,
    dims: [usize; 3],
    cells: Vec<Vec<usize>>,
    len: usize,
}

impl<V: Vector> SpatialGrid<V> {
    /// Lays out cells of `cell_size` over `bounds`. When that would take more
    /// than [`MAX_CELLS`] cells the grid uses coarser cells instead, see
    /// [`cell_size`](Self::cell_size).
    pub fn new(bounds: &Bounds<V>, cell_size: f32) -> Result<Self, ConfigError> {
        positive("cell size", cell_size)?;
        bounds.validate()?;

        let mut cell_size = cell_size;
        let mut dims = Self::layout(bounds, cell_size);
        while dims.iter().product::<f64>() > MAX_CELLS as f64 {
            cell_size *= 2.0;
            dims = Self::layout(bounds, cell_size);
        }
        let dims = dims.map(|dim| dim as usize);
        log::debug!("grid laid out as {:?} cells of size {}", dims, cell_size);

        let mut cells = Vec::new();
        cells.resize_with(dims[0] * dims[1] * dims[2], Vec::new);

        Ok(Self {
            cell_size,
            bounds: *bounds,
            dims,
            cells,
            len: 0,
        })
    }

    /// Edge length of a cell. Larger than requested when the requested size
    /// would have exceeded [`MAX_CELLS`].
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn bounds(&self) -> &Bounds<V> {
        &self.bounds
    }

    /// Number of cells along each axis.
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of indices currently stored.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Empties every cell, keeping their allocations.
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
        self.len = 0;
    }

    /// Cell holding `point`, or `None` when it lies outside the bounds.
    ///
    /// The upper face belongs to the last cell so that a boid wrapped onto
    /// it is still indexed.
    pub fn cell_of(&self, point: &V) -> Option<Cell> {
        if !self.bounds.contains(point) {
            return None;
        }
        let mut cell = [0; 3];
        for (axis, coord) in cell.iter_mut().enumerate().take(V::DIM) {
            let raw = self.raw_coord(axis, point.axis(axis));
            *coord = raw.clamp(0, self.dims[axis] as isize - 1) as usize;
        }
        Some(cell)
    }

    pub fn cell_contents(&self, cell: Cell) -> &[usize] {
        match self.flat(cell) {
            Some(flat) => &self.cells[flat],
            None => &[],
        }
    }

    /// Stores `index` at `point`. Points outside the bounds are dropped and
    /// `false` is returned.
    pub fn insert(&mut self, index: usize, point: &V) -> bool {
        let Some(cell) = self.cell_of(point) else {
            log::trace!("dropping index {} at {:?}: outside grid bounds", index, point);
            return false;
        };
        let flat = cell[0] + self.dims[0] * (cell[1] + self.dims[1] * cell[2]);
        self.cells[flat].push(index);
        self.len += 1;
        true
    }

    /// Clears the grid and inserts every point under its position in the
    /// iteration. Returns how many were dropped.
    pub fn rebuild<I>(&mut self, points: I) -> usize
    where
        I: IntoIterator<Item = V>,
    {
        self.clear();
        let mut dropped = 0;
        for (index, point) in points.into_iter().enumerate() {
            if !self.insert(index, &point) {
                dropped += 1;
            }
        }
        dropped
    }

    pub fn query(&self, point: &V, radius: f32) -> Vec<usize> {
        let mut found = Vec::new();
        self.query_into(point, radius, &mut found);
        found
    }

    /// Replaces the contents of `found` with every index stored in a cell
    /// within `ceil(radius / cell_size)` cells of `point`'s cell on each axis.
    pub fn query_into(&self, point: &V, radius: f32, found: &mut Vec<usize>) {
        found.clear();
        if !(radius.is_finite() && radius >= 0.0) {
            return;
        }
        if !(0..V::DIM).all(|axis| point.axis(axis).is_finite()) {
            return;
        }

        let reach = math::ceil(radius / self.cell_size) as isize;
        let mut lo = [0usize; 3];
        let mut hi = [0usize; 3];
        for axis in 0..V::DIM {
            let last = self.dims[axis] as isize - 1;
            // Clamping the center keeps points just outside the bounds
            // reaching the boundary cells.
            let center = self.raw_coord(axis, point.axis(axis)).clamp(0, last);
            lo[axis] = (center - reach).max(0) as usize;
            hi[axis] = (center + reach).min(last) as usize;
        }

        for z in lo[2]..=hi[2] {
            for y in lo[1]..=hi[1] {
                let row = self.dims[0] * (y + self.dims[1] * z);
                for x in lo[0]..=hi[0] {
                    found.extend_from_slice(&self.cells[row + x]);
                }
            }
        }
    }

    fn layout(bounds: &Bounds<V>, cell_size: f32) -> [f64; 3] {
        let mut dims = [1.0; 3];
        for (axis, dim) in dims.iter_mut().enumerate().take(V::DIM) {
            *dim = f64::from(math::ceil(bounds.extent(axis) / cell_size)).max(1.0);
        }
        dims
    }

    fn raw_coord(&self, axis: usize, value: f32) -> isize {
        math::floor((value - self.bounds.min.axis(axis)) / self.cell_size) as isize
    }

    fn flat(&self, cell: Cell) -> Option<usize> {
        if cell[0] < self.dims[0] && cell[1] < self.dims[1] && cell[2] < self.dims[2] {
            Some(cell[0] + self.dims[0] * (cell[1] + self.dims[1] * cell[2]))
        } else {
            None
        }
    }
}
