use crate::params::{NeighborSearch, SimConstants};
use crate::particle::Particle;
use crate::spatial::SpatialIndex;
use glam::Vec2;

/// A density that can safely be divided by
#[inline]
fn usable(density: f32) -> bool {
    density > 0.0 && density.is_finite()
}

/// Estimate density from the 3x3 cell block around each particle (the
/// particle itself included), then derive pressure from the linear equation
/// of state. Pressure goes negative below rest density.
///
/// `index` must have been rebuilt from `particles` in their current order.
pub fn compute_density_pressure(
    particles: &mut [Particle],
    index: &SpatialIndex,
    constants: &SimConstants,
) {
    let params = &constants.params;
    let poly6 = constants.kernels.poly6;
    let h_sq = constants.h_sq;

    let densities: Vec<f32> = particles
        .iter()
        .map(|pi| {
            let mut density = 0.0;
            index.for_each_near(pi.pos, |j| {
                if let Some(pj) = particles.get(j) {
                    let r_sq = (pj.pos - pi.pos).length_squared();
                    if r_sq < h_sq {
                        density += params.mass * poly6 * (h_sq - r_sq).powi(3);
                    }
                }
            });
            density
        })
        .collect();

    for (p, density) in particles.iter_mut().zip(densities) {
        p.density = density;
        p.pressure = params.gas_constant * (density - params.rest_density);
    }
}

/// Pressure and viscosity contribution of `pj` on `pi`, if they interact
#[inline]
fn pair_force(pi: &Particle, pj: &Particle, constants: &SimConstants) -> Vec2 {
    if pi.id == pj.id || !usable(pj.density) {
        return Vec2::ZERO;
    }

    let params = &constants.params;
    let h = params.smoothing_radius;
    let rij = pj.pos - pi.pos;
    let r = rij.length();
    if r >= h {
        return Vec2::ZERO;
    }

    let reach = h - r;
    let viscosity = params.viscosity * params.mass * (pj.vel - pi.vel) / pj.density
        * constants.kernels.visc_lap
        * reach;

    // Coincident particles have no pressure direction
    if r == 0.0 {
        return viscosity;
    }

    let pressure = -(rij / r) * params.mass * (pi.pressure + pj.pressure)
        / (2.0 * pj.density)
        * constants.kernels.spiky_grad
        * reach.powi(3);

    pressure + viscosity
}

/// Gravity scaled by the particle's own density, zero when that density is
/// degenerate
#[inline]
fn gravity_force(pi: &Particle, constants: &SimConstants) -> Vec2 {
    if usable(pi.density) {
        constants.params.gravity * constants.params.mass / pi.density
    } else {
        Vec2::ZERO
    }
}

/// Net force on every particle: pressure gradient, viscosity and gravity.
///
/// Partners are either every other particle or the grid block around each
/// particle, per [`NeighborSearch`]. Self-pairs are excluded by id. Forces are
/// gathered first and written back afterwards.
pub fn compute_forces(particles: &mut [Particle], index: &SpatialIndex, constants: &SimConstants) {
    let forces: Vec<Vec2> = match constants.params.force_search {
        NeighborSearch::AllPairs => particles
            .iter()
            .map(|pi| {
                let pairs: Vec2 = particles.iter().map(|pj| pair_force(pi, pj, constants)).sum();
                pairs + gravity_force(pi, constants)
            })
            .collect(),
        NeighborSearch::Grid => particles
            .iter()
            .map(|pi| {
                let mut pairs = Vec2::ZERO;
                index.for_each_near(pi.pos, |j| {
                    if let Some(pj) = particles.get(j) {
                        pairs += pair_force(pi, pj, constants);
                    }
                });
                pairs + gravity_force(pi, constants)
            })
            .collect(),
    };

    for (p, force) in particles.iter_mut().zip(forces) {
        p.force = force;
    }
}
