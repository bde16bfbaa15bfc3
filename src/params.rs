use crate::error::SimError;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::ops::RangeInclusive;

/// Accepted maze dimensions (cells per side)
pub const MAZE_LENGTH_RANGE: RangeInclusive<u32> = 5..=50;

/// Hard limit on the particle population
pub const MAX_PARTICLE_CAP: usize = 2500;

/// Accepted wall probability thresholds
pub const MAZE_THRESHOLD_RANGE: RangeInclusive<f32> = 0.3..=0.7;

/// How the force pass finds interaction partners
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum NeighborSearch {
    /// Scan every other particle and filter by distance
    #[default]
    AllPairs,
    /// Reuse the spatial index built for the density pass
    Grid,
}

impl NeighborSearch {
    pub fn name(&self) -> &str {
        match self {
            NeighborSearch::AllPairs => "All pairs",
            NeighborSearch::Grid => "Grid",
        }
    }
}

/// Base physical and domain parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimParams {
    // === Fluid ===
    /// External acceleration applied to every particle
    pub gravity: Vec2,
    /// Density the fluid relaxes towards
    pub rest_density: f32,
    /// Stiffness of the linear equation of state
    pub gas_constant: f32,
    /// Kernel support radius (h)
    pub smoothing_radius: f32,
    /// Mass of every particle
    pub mass: f32,
    /// Viscosity coefficient
    pub viscosity: f32,
    /// Fixed integration step
    pub time_step: f32,
    /// Velocity scale applied on collision, in (-1, 0)
    pub boundary_damping: f32,
    /// Speeds below this snap to zero
    pub rest_speed: f32,

    // === Domain ===
    pub domain_width: f32,
    pub domain_height: f32,
    /// Height of the maze entrance row
    pub maze_top: f32,

    // === Spatial index ===
    pub cell_size: f32,
    /// Cell-id multiplier for the row component
    pub row_stride: i32,
    #[serde(default)]
    pub force_search: NeighborSearch,

    // === Population ===
    /// Particles seeded by initialize/reset
    pub initial_particles: usize,
    /// Hard cap enforced by add requests
    pub max_particles: usize,
}

impl Default for SimParams {
    fn default() -> Self {
        let domain_width = 1.5 * 600.0;
        let domain_height = 1.5 * 1000.0;
        Self {
            gravity: Vec2::new(0.0, -10.0),
            rest_density: 300.0,
            gas_constant: 2000.0,
            smoothing_radius: 16.0,
            mass: 2.5,
            viscosity: 200.0,
            time_step: 0.0007,
            boundary_damping: -0.5,
            rest_speed: 1e-5,

            domain_width,
            domain_height,
            maze_top: domain_height - 400.0,

            cell_size: (domain_width / 60.0).floor(),
            row_stride: 1000,
            force_search: NeighborSearch::default(),

            initial_particles: 500,
            max_particles: MAX_PARTICLE_CAP,
        }
    }
}

impl SimParams {
    /// Check that the parameters describe a usable simulation
    pub fn validate(&self) -> Result<(), SimError> {
        let fail = |msg: &str| Err(SimError::InvalidParams(msg.to_string()));

        if !(self.smoothing_radius > 0.0) {
            return fail("smoothing radius must be positive");
        }
        if !(self.mass > 0.0) {
            return fail("particle mass must be positive");
        }
        if !(self.time_step > 0.0) {
            return fail("time step must be positive");
        }
        if !(self.rest_density > 0.0) {
            return fail("rest density must be positive");
        }
        if self.viscosity < 0.0 {
            return fail("viscosity must be non-negative");
        }
        if !(self.boundary_damping > -1.0 && self.boundary_damping < 0.0) {
            return fail("boundary damping must lie strictly between -1 and 0");
        }
        if !(self.cell_size > 0.0) {
            return fail("cell size must be positive");
        }
        if self.domain_width <= 2.0 * self.smoothing_radius
            || self.domain_height <= 2.0 * self.smoothing_radius
        {
            return fail("domain is too small for the smoothing radius");
        }
        if !(self.maze_top > 0.0 && self.maze_top < self.domain_height) {
            return fail("maze top must lie inside the domain");
        }
        // Distinct (column, row) pairs must never share a cell id
        let columns = (self.domain_width / self.cell_size).ceil() as i64 + 2;
        if (self.row_stride as i64) <= columns {
            return fail("row stride is too small for the domain width");
        }
        let rows = (self.domain_height / self.cell_size).ceil() as i64 + 2;
        if rows * self.row_stride as i64 + columns >= i32::MAX as i64 {
            return fail("cell ids overflow for this cell size and row stride");
        }
        if self.max_particles > MAX_PARTICLE_CAP {
            return fail("particle cap exceeds 2500");
        }
        if self.initial_particles > self.max_particles {
            return fail("initial particle count exceeds the particle cap");
        }
        Ok(())
    }
}

/// Normalization constants of the three smoothing kernels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kernels {
    /// Poly6 density kernel
    pub poly6: f32,
    /// Spiky kernel gradient (pressure)
    pub spiky_grad: f32,
    /// Viscosity kernel laplacian
    pub visc_lap: f32,
}

impl Kernels {
    /// 2D normalizations for support radius `h`
    pub fn new(h: f32) -> Self {
        Self {
            poly6: 4.0 / (PI * h.powi(8)),
            spiky_grad: -10.0 / (PI * h.powi(5)),
            visc_lap: 40.0 / (PI * h.powi(5)),
        }
    }
}

/// Validated parameters plus their derived constants, shared read-only by
/// every solver pass.
#[derive(Debug, Clone)]
pub struct SimConstants {
    pub params: SimParams,
    pub kernels: Kernels,
    /// Smoothing radius squared
    pub h_sq: f32,
}

impl SimConstants {
    pub fn new(params: SimParams) -> Result<Self, SimError> {
        params.validate()?;
        let h = params.smoothing_radius;
        Ok(Self {
            kernels: Kernels::new(h),
            h_sq: h * h,
            params,
        })
    }

    /// Radius within which a wall deflects a particle
    pub fn wall_radius(&self) -> f32 {
        self.params.smoothing_radius / 2.0
    }
}

impl Default for SimConstants {
    fn default() -> Self {
        let params = SimParams::default();
        let h = params.smoothing_radius;
        Self {
            kernels: Kernels::new(h),
            h_sq: h * h,
            params,
        }
    }
}
