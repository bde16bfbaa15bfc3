use crate::color::{ColorLut, ColorMode, ColorScale};
use crate::maze::Orientation;
use crate::system::ParticleSystem;
use image::{Rgba, RgbaImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;

const BACKGROUND: Rgba<u8> = Rgba([10, 12, 20, 255]);
const WALL: Rgba<u8> = Rgba([235, 235, 235, 255]);

/// GIF frame delay in hundredths of a second
const GIF_FRAME_DELAY: u16 = 5;

/// NeuQuant sampling speed for GIF palette quantization (1 = best, 30 = fastest)
const GIF_QUANT_SPEED: i32 = 10;

/// Render the current state to an RGBA image `width` pixels wide. Height
/// follows the domain aspect ratio.
pub fn render_frame(
    system: &ParticleSystem,
    width: u32,
    color_mode: ColorMode,
    color_lut: &ColorLut,
) -> RgbaImage {
    let params = system.params();
    let width = width.max(1);
    let scale = width as f32 / params.domain_width;
    let height = ((params.domain_height * scale).round() as u32).max(1);
    let mut img = RgbaImage::from_pixel(width, height, BACKGROUND);

    let to_pixel = |x: f32, y: f32| -> (i64, i64) {
        ((x * scale).floor() as i64, (height as f32 - y * scale).floor() as i64)
    };
    let plot = |img: &mut RgbaImage, px: i64, py: i64, color: Rgba<u8>| {
        if px >= 0 && py >= 0 && (px as u32) < width && (py as u32) < height {
            img.put_pixel(px as u32, py as u32, color);
        }
    };

    let color_scale = ColorScale::from_particles(system.particles());
    // Particles drawn at half a smoothing radius across
    let radius = (params.smoothing_radius * 0.25 * scale).max(1.0) as i64;
    for p in system.particles() {
        let [r, g, b] = color_scale.particle_rgb(p, color_mode, color_lut);
        let (cx, cy) = to_pixel(p.pos.x, p.pos.y);
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= radius * radius {
                    plot(&mut img, cx + dx, cy + dy, Rgba([r, g, b, 255]));
                }
            }
        }
    }

    for wall in system.walls() {
        let (x0, y0) = to_pixel(wall.start.x, wall.start.y);
        let (x1, y1) = to_pixel(wall.end.x, wall.end.y);
        match wall.orientation {
            Orientation::Horizontal => {
                for px in x0.min(x1)..=x0.max(x1) {
                    plot(&mut img, px, y0, WALL);
                }
            }
            Orientation::Vertical => {
                for py in y0.min(y1)..=y0.max(y1) {
                    plot(&mut img, x0, py, WALL);
                }
            }
        }
    }

    img
}

/// Write a PNG snapshot of the current state
pub fn save_png(
    system: &ParticleSystem,
    path: &Path,
    width: u32,
    color_mode: ColorMode,
    color_lut: &ColorLut,
) -> Result<(), String> {
    render_frame(system, width, color_mode, color_lut)
        .save(path)
        .map_err(|e| format!("Failed to write snapshot: {}", e))?;
    info!(path = %path.display(), "saved snapshot");
    Ok(())
}

/// File name for an export of `system` at its current step
pub fn export_file_name(system: &ParticleSystem, extension: &str) -> String {
    format!(
        "sph-maze-{}-{:06}.{}",
        system.seed(),
        system.step_count(),
        extension
    )
}

/// Streams rendered frames into an animated GIF
pub struct GifRecorder {
    encoder: gif::Encoder<BufWriter<File>>,
    path: PathBuf,
    width: u32,
    frames: usize,
}

impl GifRecorder {
    /// Start a looping GIF at `path`. Frames are `width` pixels wide.
    pub fn create(path: &Path, system: &ParticleSystem, width: u32) -> Result<Self, String> {
        let params = system.params();
        let width = width.clamp(1, u16::MAX as u32);
        let height = ((params.domain_height * width as f32 / params.domain_width).round() as u32)
            .clamp(1, u16::MAX as u32);

        let file = File::create(path).map_err(|e| format!("Failed to create GIF file: {}", e))?;
        let mut encoder = gif::Encoder::new(BufWriter::new(file), width as u16, height as u16, &[])
            .map_err(|e| format!("Failed to start GIF: {}", e))?;
        encoder
            .set_repeat(gif::Repeat::Infinite)
            .map_err(|e| format!("Failed to start GIF: {}", e))?;

        info!(path = %path.display(), width, height, "started GIF recording");
        Ok(Self {
            encoder,
            path: path.to_path_buf(),
            width,
            frames: 0,
        })
    }

    /// Append the current state as one frame
    pub fn capture(
        &mut self,
        system: &ParticleSystem,
        color_mode: ColorMode,
        color_lut: &ColorLut,
    ) -> Result<(), String> {
        let img = render_frame(system, self.width, color_mode, color_lut);
        let (w, h) = img.dimensions();
        let mut pixels = img.into_raw();
        let mut frame = gif::Frame::from_rgba_speed(w as u16, h as u16, &mut pixels, GIF_QUANT_SPEED);
        frame.delay = GIF_FRAME_DELAY;
        self.encoder
            .write_frame(&frame)
            .map_err(|e| format!("Failed to write GIF frame: {}", e))?;
        self.frames += 1;
        Ok(())
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Write the trailer and close the file
    pub fn finish(self) -> Result<PathBuf, String> {
        self.encoder
            .into_inner()
            .map_err(|e| format!("Failed to finish GIF: {}", e))?;
        info!(path = %self.path.display(), frames = self.frames, "finished GIF recording");
        Ok(self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SimParams;
    use tempfile::tempdir;

    fn system() -> ParticleSystem {
        let mut sys = ParticleSystem::new(SimParams::default(), 99).unwrap();
        sys.initialize(10, 0.5).unwrap();
        sys
    }

    #[test]
    fn test_frame_follows_domain_aspect() {
        let img = render_frame(&system(), 300, ColorMode::Palette, &ColorLut::default());
        assert_eq!(img.dimensions(), (300, 500));
    }

    #[test]
    fn test_frame_draws_walls_and_fluid() {
        let img = render_frame(&system(), 300, ColorMode::Palette, &ColorLut::default());
        let walls = img.pixels().filter(|p| **p == WALL).count();
        let fluid = img
            .pixels()
            .filter(|p| **p != WALL && **p != BACKGROUND)
            .count();
        assert!(walls > 0);
        assert!(fluid > 0);

        // Fluid starts in the top quarter of the image
        let (_, h) = img.dimensions();
        let lowest = img
            .enumerate_pixels()
            .filter(|(_, _, p)| **p != WALL && **p != BACKGROUND)
            .map(|(_, y, _)| y)
            .max()
            .unwrap();
        assert!(lowest < h / 4);
    }

    #[test]
    fn test_save_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("snap.png");
        save_png(&system(), &path, 120, ColorMode::Speed, &ColorLut::default()).unwrap();

        let loaded = image::open(&path).unwrap();
        assert_eq!(loaded.width(), 120);
        assert_eq!(loaded.height(), 200);
    }

    #[test]
    fn test_save_png_bad_path() {
        let result = save_png(
            &system(),
            Path::new("/nonexistent/dir/snap.png"),
            120,
            ColorMode::Palette,
            &ColorLut::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_gif_recording() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.gif");
        let mut sys = system();
        let lut = ColorLut::default();

        let mut recorder = GifRecorder::create(&path, &sys, 60).unwrap();
        for _ in 0..3 {
            sys.step();
            recorder.capture(&sys, ColorMode::Density, &lut).unwrap();
        }
        assert_eq!(recorder.frames(), 3);
        let written = recorder.finish().unwrap();

        let bytes = std::fs::read(&written).unwrap();
        assert!(bytes.starts_with(b"GIF89a"));
        assert_eq!(bytes.last(), Some(&0x3B));
    }

    #[test]
    fn test_export_file_name() {
        let sys = system();
        assert_eq!(export_file_name(&sys, "png"), "sph-maze-99-000000.png");
    }
}
