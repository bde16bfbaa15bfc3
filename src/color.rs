use crate::particle::{Particle, Tint};
use serde::{Deserialize, Serialize};

/// Number of entries in a color lookup table
const LUT_SIZE: usize = 256;

/// Gradient used for the scalar color modes (deep water to foam)
const OCEAN_STOPS: [[u8; 3]; 4] = [
    [8, 24, 88],
    [30, 110, 190],
    [90, 200, 230],
    [235, 250, 255],
];

/// What property determines particle color
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum ColorMode {
    /// Each particle's own palette tint
    #[default]
    Palette,
    /// Local density, relative to the densest particle
    Density,
    /// Speed, relative to the fastest particle
    Speed,
}

impl ColorMode {
    pub fn name(&self) -> &str {
        match self {
            ColorMode::Palette => "Palette",
            ColorMode::Density => "Density",
            ColorMode::Speed => "Speed",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            ColorMode::Palette => ColorMode::Density,
            ColorMode::Density => ColorMode::Speed,
            ColorMode::Speed => ColorMode::Palette,
        }
    }
}

/// Precomputed gradient samples
#[derive(Debug, Clone)]
pub struct ColorLut {
    colors: Vec<[u8; 3]>,
}

impl Default for ColorLut {
    fn default() -> Self {
        Self::gradient(&OCEAN_STOPS)
    }
}

impl ColorLut {
    /// Linear gradient through evenly spaced stops
    pub fn gradient(stops: &[[u8; 3]]) -> Self {
        let colors = match stops {
            [] => vec![[255, 255, 255]; LUT_SIZE],
            [only] => vec![*only; LUT_SIZE],
            _ => (0..LUT_SIZE)
                .map(|i| {
                    let t = i as f32 / (LUT_SIZE - 1) as f32 * (stops.len() - 1) as f32;
                    let lo = (t.floor() as usize).min(stops.len() - 2);
                    let frac = t - lo as f32;
                    let (a, b) = (stops[lo], stops[lo + 1]);
                    [0, 1, 2].map(|c| {
                        (a[c] as f32 + (b[c] as f32 - a[c] as f32) * frac).round() as u8
                    })
                })
                .collect(),
        };
        Self { colors }
    }

    /// Sample at `t` in [0, 1] (clamped)
    pub fn sample(&self, t: f32) -> [u8; 3] {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let idx = (t * (self.colors.len() - 1) as f32).round() as usize;
        self.colors[idx]
    }
}

/// Convert an RGBA tint to 8-bit RGB
pub fn tint_rgb(tint: Tint) -> [u8; 3] {
    [0, 1, 2].map(|c| (tint[c].clamp(0.0, 1.0) * 255.0).round() as u8)
}

/// Frame-wide maxima used to normalize the scalar color modes
#[derive(Debug, Clone, Copy)]
pub struct ColorScale {
    pub max_density: f32,
    pub max_speed: f32,
}

impl ColorScale {
    pub fn from_particles(particles: &[Particle]) -> Self {
        let finite_max = |values: &mut dyn Iterator<Item = f32>| {
            values
                .filter(|v| v.is_finite())
                .fold(0.0_f32, f32::max)
                .max(f32::EPSILON)
        };
        Self {
            max_density: finite_max(&mut particles.iter().map(|p| p.density)),
            max_speed: finite_max(&mut particles.iter().map(|p| p.vel.length())),
        }
    }

    /// RGB color of a particle under `mode`
    pub fn particle_rgb(&self, p: &Particle, mode: ColorMode, lut: &ColorLut) -> [u8; 3] {
        match mode {
            ColorMode::Palette => tint_rgb(p.tint),
            ColorMode::Density => lut.sample(p.density / self.max_density),
            ColorMode::Speed => lut.sample(p.vel.length() / self.max_speed),
        }
    }
}
