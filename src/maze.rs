use crate::error::SimError;
use crate::params::{SimParams, MAZE_LENGTH_RANGE, MAZE_THRESHOLD_RANGE};
use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Extra margin that makes horizontal walls rarer than vertical ones
const HORIZONTAL_BIAS: f32 = 0.1;

/// Which axis a wall runs along
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// A static, axis-aligned wall segment.
///
/// `start` is always the lower coordinate along the running axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wall {
    pub start: Vec2,
    pub end: Vec2,
    pub orientation: Orientation,
}

impl Wall {
    pub fn horizontal(x0: f32, x1: f32, y: f32) -> Self {
        Self {
            start: Vec2::new(x0.min(x1), y),
            end: Vec2::new(x0.max(x1), y),
            orientation: Orientation::Horizontal,
        }
    }

    pub fn vertical(x: f32, y0: f32, y1: f32) -> Self {
        Self {
            start: Vec2::new(x, y0.min(y1)),
            end: Vec2::new(x, y0.max(y1)),
            orientation: Orientation::Vertical,
        }
    }
}

/// Validated maze dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MazeSettings {
    /// Cells per side
    pub length: u32,
    /// Wall probability threshold; higher means fewer walls
    pub threshold: f32,
}

impl Default for MazeSettings {
    fn default() -> Self {
        Self {
            length: 10,
            threshold: 0.5,
        }
    }
}

impl MazeSettings {
    pub fn new(length: u32, threshold: f32) -> Result<Self, SimError> {
        let settings = Self { length, threshold };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if !MAZE_LENGTH_RANGE.contains(&self.length) {
            return Err(SimError::InvalidMazeLength(self.length));
        }
        if !MAZE_THRESHOLD_RANGE.contains(&self.threshold) {
            return Err(SimError::InvalidThreshold(self.threshold));
        }
        Ok(())
    }
}

/// Generate the wall set for one maze: a `length × length` lattice hanging
/// below the entrance row, with a gap over the middle of the entrance and exit
/// rows.
///
/// Consumes exactly two draws per interior lattice point (minus the skipped
/// boundary cases) in a fixed order, so the same rng state always yields the
/// same maze.
pub fn generate<R: Rng>(maze: &MazeSettings, params: &SimParams, rng: &mut R) -> Vec<Wall> {
    let n = maze.length;
    let width = params.domain_width;
    let top = params.maze_top;
    let segment = width / n as f32;

    // Gap over the middle column, widened to two columns for even lengths
    let gap_start = (n / 2 - u32::from(n % 2 == 0)) as f32 * segment;
    let gap_end = (n / 2 + 1) as f32 * segment;

    let mut walls = Vec::new();
    walls.push(Wall::horizontal(0.0, gap_start, top));
    walls.push(Wall::horizontal(gap_end, width, top));

    for i in 0..n {
        for j in 1..=n {
            let y = top - segment * j as f32;

            if j != n {
                let draw: f32 = rng.gen();
                if draw > maze.threshold + HORIZONTAL_BIAS {
                    let x = segment * i as f32;
                    walls.push(Wall::horizontal(x, x + segment, y));
                }
            }

            if i != n - 1 {
                let draw: f32 = rng.gen();
                if draw > maze.threshold {
                    let x = segment * (i + 1) as f32;
                    walls.push(Wall::vertical(x, y, y + segment));
                }
            }
        }
    }

    let bottom = top - n as f32 * segment;
    walls.push(Wall::horizontal(0.0, gap_start, bottom));
    walls.push(Wall::horizontal(gap_end, width, bottom));

    walls
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn build(length: u32, threshold: f32, seed: u64) -> Vec<Wall> {
        let maze = MazeSettings::new(length, threshold).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        generate(&maze, &SimParams::default(), &mut rng)
    }

    #[test]
    fn test_settings_validation() {
        assert!(MazeSettings::new(5, 0.3).is_ok());
        assert!(MazeSettings::new(50, 0.7).is_ok());
        assert_eq!(MazeSettings::new(4, 0.5), Err(SimError::InvalidMazeLength(4)));
        assert_eq!(MazeSettings::new(51, 0.5), Err(SimError::InvalidMazeLength(51)));
        assert_eq!(MazeSettings::new(10, 0.29), Err(SimError::InvalidThreshold(0.29)));
        assert_eq!(MazeSettings::new(10, 0.71), Err(SimError::InvalidThreshold(0.71)));
    }

    #[test]
    fn test_same_seed_same_maze() {
        assert_eq!(build(10, 0.5, 42), build(10, 0.5, 42));
        assert_eq!(build(33, 0.4, 9), build(33, 0.4, 9));
    }

    #[test]
    fn test_different_seed_different_maze() {
        assert_ne!(build(20, 0.5, 1), build(20, 0.5, 2));
    }

    #[test]
    fn test_entrance_and_exit_gaps_odd() {
        let params = SimParams::default();
        let walls = build(5, 0.5, 0);
        let segment = params.domain_width / 5.0;

        let entrance = &walls[..2];
        assert_eq!(entrance[0], Wall::horizontal(0.0, 2.0 * segment, params.maze_top));
        assert_eq!(
            entrance[1],
            Wall::horizontal(3.0 * segment, params.domain_width, params.maze_top)
        );

        let bottom = params.maze_top - 5.0 * segment;
        let exit = &walls[walls.len() - 2..];
        assert_eq!(exit[0], Wall::horizontal(0.0, 2.0 * segment, bottom));
        assert_eq!(exit[1], Wall::horizontal(3.0 * segment, params.domain_width, bottom));
    }

    #[test]
    fn test_entrance_gap_even_spans_two_columns() {
        let params = SimParams::default();
        let walls = build(10, 0.5, 0);
        let segment = params.domain_width / 10.0;

        assert_eq!(walls[0].end.x, 4.0 * segment);
        assert_eq!(walls[1].start.x, 6.0 * segment);
    }

    #[test]
    fn test_interior_walls_on_lattice() {
        let params = SimParams::default();
        let n = 12;
        let walls = build(n, 0.3, 5);
        let segment = params.domain_width / n as f32;
        let bottom = params.maze_top - n as f32 * segment;

        for wall in &walls[2..walls.len() - 2] {
            let length = (wall.end - wall.start).length();
            assert!((length - segment).abs() < 1e-3);
            assert!(wall.start.y >= bottom - 1e-3);
            assert!(wall.end.y <= params.maze_top + 1e-3);
            match wall.orientation {
                Orientation::Horizontal => {
                    // Never on the entrance or exit rows
                    assert!(wall.start.y < params.maze_top - 1e-3);
                    assert!(wall.start.y > bottom + 1e-3);
                }
                Orientation::Vertical => {
                    // Never on the outer right edge
                    assert!(wall.start.x < params.domain_width - 1e-3);
                    assert!(wall.start.x > 0.0);
                }
            }
        }
    }

    #[test]
    fn test_threshold_controls_density() {
        let sparse = build(30, 0.7, 11).len();
        let dense = build(30, 0.3, 11).len();
        assert!(dense > sparse);
    }

    #[test]
    fn test_wall_endpoints_are_ordered() {
        let w = Wall::horizontal(10.0, 2.0, 5.0);
        assert_eq!(w.start, Vec2::new(2.0, 5.0));
        assert_eq!(w.orientation, Orientation::Horizontal);
        let w = Wall::vertical(1.0, 9.0, 3.0);
        assert_eq!(w.start, Vec2::new(1.0, 3.0));
        assert_eq!(w.end, Vec2::new(1.0, 9.0));
    }
}
