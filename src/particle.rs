use crate::params::SimParams;
use glam::Vec2;
use rand::Rng;

/// RGBA display color, carried for the presentation layer only
pub type Tint = [f32; 4];

/// Lightest palette tier (10% of particles)
pub const TINT_LIGHT: Tint = [0.7, 0.9, 0.98, 1.0];
/// Middle palette tier (60% of particles)
pub const TINT_MID: Tint = [0.2, 0.365, 0.655, 1.0];
/// Darkest palette tier (30% of particles)
pub const TINT_DARK: Tint = [0.23, 0.54, 0.77, 1.0];

/// A single fluid sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Stable id, unique within the owning system until the next re-seed
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub force: Vec2,
    pub density: f32,
    pub pressure: f32,
    pub tint: Tint,
}

impl Particle {
    pub fn new(id: u32, pos: Vec2) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            force: Vec2::ZERO,
            density: 0.0,
            pressure: 0.0,
            tint: TINT_MID,
        }
    }
}

/// Pick a palette tier from a uniform draw in [0, 1)
pub fn tint_for(draw: f32) -> Tint {
    if draw < 0.1 {
        TINT_LIGHT
    } else if draw < 0.7 {
        TINT_MID
    } else {
        TINT_DARK
    }
}

/// Fill the dam-break region with particles until `limit` is reached.
///
/// Rows start four radii above the maze entrance and climb by `row_spacing`;
/// columns span the middle third of the domain at one radius apart. Each
/// particle takes one uniform draw that both picks its tint and jitters its x.
/// Returns the number of particles appended.
pub fn fill_block<R: Rng>(
    particles: &mut Vec<Particle>,
    params: &SimParams,
    row_spacing: f32,
    limit: usize,
    next_id: &mut u32,
    rng: &mut R,
) -> usize {
    let h = params.smoothing_radius;
    let x_start = params.domain_width / 3.0;
    let x_end = 2.0 * params.domain_width / 3.0;
    let y_end = params.domain_height - h;
    let before = particles.len();

    let mut y = params.maze_top + 4.0 * h;
    'rows: while y < y_end {
        let mut x = x_start;
        while x <= x_end {
            if particles.len() >= limit {
                break 'rows;
            }
            let draw: f32 = rng.gen();
            let mut particle = Particle::new(*next_id, Vec2::new(x + draw, y));
            particle.tint = tint_for(draw);
            particles.push(particle);
            *next_id += 1;
            x += h;
        }
        y += row_spacing;
    }

    particles.len() - before
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_tint_tiers() {
        assert_eq!(tint_for(0.0), TINT_LIGHT);
        assert_eq!(tint_for(0.099), TINT_LIGHT);
        assert_eq!(tint_for(0.1), TINT_MID);
        assert_eq!(tint_for(0.69), TINT_MID);
        assert_eq!(tint_for(0.7), TINT_DARK);
        assert_eq!(tint_for(0.999), TINT_DARK);
    }

    #[test]
    fn test_fill_block_respects_limit() {
        let params = SimParams::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut particles = Vec::new();
        let mut next_id = 0;

        let added = fill_block(&mut particles, &params, 16.0, 100, &mut next_id, &mut rng);

        assert_eq!(added, 100);
        assert_eq!(particles.len(), 100);
        assert_eq!(next_id, 100);
    }

    #[test]
    fn test_fill_block_region() {
        let params = SimParams::default();
        let h = params.smoothing_radius;
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut particles = Vec::new();
        let mut next_id = 0;

        fill_block(&mut particles, &params, h, 500, &mut next_id, &mut rng);

        for p in &particles {
            assert!(p.pos.x >= params.domain_width / 3.0);
            assert!(p.pos.x < 2.0 * params.domain_width / 3.0 + 1.0);
            assert!(p.pos.y >= params.maze_top + 4.0 * h);
            assert!(p.pos.y < params.domain_height - h);
            assert_eq!(p.vel, Vec2::ZERO);
        }
        assert_eq!(particles[0].pos.y, params.maze_top + 4.0 * h);
    }

    #[test]
    fn test_ids_are_sequential() {
        let params = SimParams::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut particles = Vec::new();
        let mut next_id = 10;

        fill_block(&mut particles, &params, 16.0, 20, &mut next_id, &mut rng);

        let ids: Vec<u32> = particles.iter().map(|p| p.id).collect();
        assert_eq!(ids, (10..30).collect::<Vec<u32>>());
    }

    #[test]
    fn test_region_exhaustion_stops_early() {
        let params = SimParams::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut particles = Vec::new();
        let mut next_id = 0;

        let added = fill_block(&mut particles, &params, 16.0, usize::MAX, &mut next_id, &mut rng);

        // 20 rows (1164..=1468) of 19 columns (300..=588)
        assert_eq!(added, 20 * 19);
    }
}
