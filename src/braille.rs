use crate::color::{ColorLut, ColorMode, ColorScale};
use crate::maze::Orientation;
use crate::system::ParticleSystem;
use glam::Vec2;
use ratatui::style::Color;

/// Braille character rendering for high-resolution terminal graphics.
/// Each Braille character represents a 2x4 grid of dots (8 dots total).
///
/// Dot positions and their bit values:
/// ```text
/// (0,0)=0x01  (1,0)=0x08
/// (0,1)=0x02  (1,1)=0x10
/// (0,2)=0x04  (1,2)=0x20
/// (0,3)=0x40  (1,3)=0x80
/// ```
///
/// Unicode Braille patterns: U+2800 to U+28FF (256 patterns)
const BRAILLE_BASE: u32 = 0x2800;

/// Dot position to bit mapping for Braille characters
const BRAILLE_DOTS: [[u8; 4]; 2] = [
    [0x01, 0x02, 0x04, 0x40], // Left column (x=0): rows 0,1,2,3
    [0x08, 0x10, 0x20, 0x80], // Right column (x=1): rows 0,1,2,3
];

/// Maze walls always draw in this color
pub const WALL_COLOR: Color = Color::Rgb(235, 235, 235);

/// A single rendered Braille cell with position and color
#[derive(Clone, Copy)]
pub struct BrailleCell {
    pub x: u16,
    pub y: u16,
    pub char: char,
    pub color: Color,
}

/// Per-character accumulator
#[derive(Clone, Copy, Default)]
struct CellAccum {
    pattern: u8,
    rgb_sum: [u32; 3],
    particle_dots: u32,
    wall: bool,
}

/// Maps domain coordinates (y up) onto the dot grid (y down)
struct DotGrid {
    width: usize,
    height: usize,
    scale_x: f32,
    scale_y: f32,
}

impl DotGrid {
    fn new(canvas_width: u16, canvas_height: u16, domain_width: f32, domain_height: f32) -> Self {
        let width = canvas_width as usize * 2;
        let height = canvas_height as usize * 4;
        Self {
            width,
            height,
            scale_x: width as f32 / domain_width,
            scale_y: height as f32 / domain_height,
        }
    }

    /// Dot containing `pos`, clamped to the grid
    fn dot(&self, pos: Vec2) -> (usize, usize) {
        let bx = (pos.x * self.scale_x).floor().max(0.0) as usize;
        let by = ((self.height as f32 - pos.y * self.scale_y).floor()).max(0.0) as usize;
        (bx.min(self.width - 1), by.min(self.height - 1))
    }
}

/// Render particles and maze walls to Braille characters.
///
/// Walls win over particles when both share a character. Particle colors in
/// the same character are averaged.
pub fn render_to_braille(
    system: &ParticleSystem,
    canvas_width: u16,
    canvas_height: u16,
    color_mode: ColorMode,
    color_lut: &ColorLut,
) -> Vec<BrailleCell> {
    if canvas_width == 0 || canvas_height == 0 {
        return Vec::new();
    }

    let params = system.params();
    let grid = DotGrid::new(canvas_width, canvas_height, params.domain_width, params.domain_height);
    let mut accum = vec![CellAccum::default(); canvas_width as usize * canvas_height as usize];
    let cell_index = |bx: usize, by: usize| (by / 4) * canvas_width as usize + bx / 2;

    for wall in system.walls() {
        let (x0, y0) = grid.dot(wall.start);
        let (x1, y1) = grid.dot(wall.end);
        let dots: Vec<(usize, usize)> = match wall.orientation {
            Orientation::Horizontal => (x0.min(x1)..=x0.max(x1)).map(|bx| (bx, y0)).collect(),
            Orientation::Vertical => (y0.min(y1)..=y0.max(y1)).map(|by| (x0, by)).collect(),
        };
        for (bx, by) in dots {
            let cell = &mut accum[cell_index(bx, by)];
            cell.pattern |= BRAILLE_DOTS[bx % 2][by % 4];
            cell.wall = true;
        }
    }

    let scale = ColorScale::from_particles(system.particles());
    for p in system.particles() {
        let (bx, by) = grid.dot(p.pos);
        let rgb = scale.particle_rgb(p, color_mode, color_lut);
        let cell = &mut accum[cell_index(bx, by)];
        cell.pattern |= BRAILLE_DOTS[bx % 2][by % 4];
        for (sum, c) in cell.rgb_sum.iter_mut().zip(rgb) {
            *sum += c as u32;
        }
        cell.particle_dots += 1;
    }

    let mut cells = Vec::new();
    for (i, cell) in accum.iter().enumerate() {
        // Only emit cells that have at least one dot
        if cell.pattern == 0 {
            continue;
        }
        let braille_char = char::from_u32(BRAILLE_BASE + cell.pattern as u32).unwrap_or(' ');
        let color = if cell.wall || cell.particle_dots == 0 {
            WALL_COLOR
        } else {
            let [r, g, b] = cell.rgb_sum.map(|sum| (sum / cell.particle_dots) as u8);
            Color::Rgb(r, g, b)
        };
        cells.push(BrailleCell {
            x: (i % canvas_width as usize) as u16,
            y: (i / canvas_width as usize) as u16,
            char: braille_char,
            color,
        });
    }

    cells
}
