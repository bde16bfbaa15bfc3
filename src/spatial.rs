use crate::particle::Particle;
use glam::Vec2;
use std::collections::HashMap;

/// Particle indices bucketed by grid cell, valid for a single step.
///
/// Cells are keyed by `column + row * row_stride`; only occupied cells are stored.
#[derive(Debug, Default)]
pub struct SpatialIndex {
    cell_size: f32,
    row_stride: i32,
    cells: HashMap<i32, Vec<usize>>,
}

impl SpatialIndex {
    pub fn new(cell_size: f32, row_stride: i32) -> Self {
        Self {
            cell_size,
            row_stride,
            cells: HashMap::new(),
        }
    }

    /// Grid (column, row) containing `pos`
    #[inline]
    pub fn cell_of(&self, pos: Vec2) -> (i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        )
    }

    #[inline]
    fn key(&self, column: i32, row: i32) -> i32 {
        column + row * self.row_stride
    }

    /// Cell id for `pos`
    pub fn cell_id(&self, pos: Vec2) -> i32 {
        let (column, row) = self.cell_of(pos);
        self.key(column, row)
    }

    /// Discard the previous buckets and re-bucket every particle
    pub fn rebuild(&mut self, particles: &[Particle]) {
        self.cells.clear();
        for (i, p) in particles.iter().enumerate() {
            let id = self.cell_id(p.pos);
            self.cells.entry(id).or_default().push(i);
        }
    }

    /// Visit every particle index in the 3x3 block of cells around `pos`
    pub fn for_each_near<F>(&self, pos: Vec2, mut f: F)
    where
        F: FnMut(usize),
    {
        let (column, row) = self.cell_of(pos);
        for dy in -1..=1 {
            for dx in -1..=1 {
                if let Some(bucket) = self.cells.get(&self.key(column + dx, row + dy)) {
                    for &i in bucket {
                        f(i);
                    }
                }
            }
        }
    }

    /// Number of occupied cells
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Number of indexed particles
    pub fn len(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }
}
