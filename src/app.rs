use crate::color::{ColorLut, ColorMode};
use crate::config::{AppConfig, CONFIG_VERSION};
use crate::export::{self, GifRecorder};
use crate::system::{ParticleSystem, SimEvent};
use std::path::PathBuf;
use tracing::{error, info};

/// Width in pixels of PNG snapshots
pub const SNAPSHOT_WIDTH: u32 = 600;

/// Width in pixels of recorded GIF frames
pub const GIF_WIDTH: u32 = 240;

/// Ticks between recorded GIF frames
pub const GIF_TICK_INTERVAL: u64 = 3;

pub const MIN_SPEED: usize = 1;
pub const MAX_SPEED: usize = 50;

/// Main application state
pub struct App {
    pub system: ParticleSystem,
    pub paused: bool,
    pub color_mode: ColorMode,
    pub color_lut: ColorLut,
    pub fullscreen_mode: bool,
    pub steps_per_frame: usize,
    pub show_help: bool,
    pub help_scroll: u16,
    pub controls_scroll: u16,
    /// Last notification shown in the status box
    pub message: Option<String>,
    pub recorder: Option<GifRecorder>,
    /// Where snapshots, recordings and saved configs go
    pub output_dir: PathBuf,
    ticks: u64,
}

impl App {
    pub fn new(system: ParticleSystem, output_dir: PathBuf) -> Self {
        Self {
            system,
            paused: false,
            color_mode: ColorMode::default(),
            color_lut: ColorLut::default(),
            fullscreen_mode: false,
            steps_per_frame: 5,
            show_help: false,
            help_scroll: 0,
            controls_scroll: 0,
            message: None,
            recorder: None,
            output_dir,
            ticks: 0,
        }
    }

    /// Run simulation steps for current frame
    pub fn tick(&mut self) {
        if self.paused {
            return;
        }
        for _ in 0..self.steps_per_frame {
            self.system.step();
        }
        self.ticks += 1;
        self.handle_events();

        if self.ticks % GIF_TICK_INTERVAL == 0 {
            self.capture_gif_frame();
        }
    }

    fn handle_events(&mut self) {
        for event in self.system.drain_events() {
            self.message = Some(match event {
                SimEvent::MazeSolved { step } => format!("Maze solved at step {}", step),
                SimEvent::CapacityReached { count } => {
                    format!("Particle limit reached ({})", count)
                }
            });
        }
    }

    fn capture_gif_frame(&mut self) {
        let Some(recorder) = self.recorder.as_mut() else {
            return;
        };
        if let Err(e) = recorder.capture(&self.system, self.color_mode, &self.color_lut) {
            error!(error = %e, "GIF capture failed");
            self.message = Some(e);
            self.recorder = None;
        }
    }

    /// Toggle pause state
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Add a block of particles
    pub fn add_particles(&mut self) {
        let added = self.system.add_particles();
        if added > 0 {
            self.message = Some(format!("Added {} particles", added));
        }
        self.handle_events();
    }

    /// Re-seed the fluid in the current maze
    pub fn reset(&mut self) {
        self.system.reset();
        self.message = Some("Reset".to_string());
    }

    /// Build a new maze
    pub fn regenerate_maze(&mut self) {
        self.system.regenerate_maze();
        self.message = Some("New maze".to_string());
    }

    /// Remove the maze entirely
    pub fn clear_maze(&mut self) {
        self.system.clear_maze();
        self.message = Some("Maze cleared".to_string());
    }

    /// Cycle particle coloring
    pub fn cycle_color_mode(&mut self) {
        self.color_mode = self.color_mode.next();
    }

    /// Toggle fullscreen mode
    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen_mode = !self.fullscreen_mode;
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
        if self.show_help {
            self.help_scroll = 0; // Reset scroll when opening
        }
    }

    /// Scroll help content up
    pub fn scroll_help_up(&mut self) {
        self.help_scroll = self.help_scroll.saturating_sub(1);
    }

    /// Scroll help content down
    pub fn scroll_help_down(&mut self, max_scroll: u16) {
        self.help_scroll = (self.help_scroll + 1).min(max_scroll);
    }

    /// Scroll controls box up
    pub fn scroll_controls_up(&mut self) {
        self.controls_scroll = self.controls_scroll.saturating_sub(1);
    }

    /// Scroll controls box down
    pub fn scroll_controls_down(&mut self, max_scroll: u16) {
        self.controls_scroll = (self.controls_scroll + 1).min(max_scroll);
    }

    /// Increase simulation speed
    pub fn increase_speed(&mut self) {
        self.steps_per_frame = (self.steps_per_frame + 1).min(MAX_SPEED);
    }

    /// Decrease simulation speed
    pub fn decrease_speed(&mut self) {
        self.steps_per_frame = self.steps_per_frame.saturating_sub(1).max(MIN_SPEED);
    }

    /// Write a PNG of the current frame into the output directory
    pub fn export_snapshot(&mut self) {
        let path = self
            .output_dir
            .join(export::export_file_name(&self.system, "png"));
        self.message = Some(
            match export::save_png(
                &self.system,
                &path,
                SNAPSHOT_WIDTH,
                self.color_mode,
                &self.color_lut,
            ) {
                Ok(()) => format!("Saved {}", path.display()),
                Err(e) => {
                    error!(error = %e, "snapshot failed");
                    e
                }
            },
        );
    }

    /// Start or stop GIF recording
    pub fn toggle_recording(&mut self) {
        if let Some(recorder) = self.recorder.take() {
            self.message = Some(match recorder.finish() {
                Ok(path) => format!("Saved {}", path.display()),
                Err(e) => {
                    error!(error = %e, "finishing GIF failed");
                    e
                }
            });
            return;
        }

        let path = self
            .output_dir
            .join(export::export_file_name(&self.system, "gif"));
        match GifRecorder::create(&path, &self.system, GIF_WIDTH) {
            Ok(recorder) => {
                self.recorder = Some(recorder);
                self.message = Some("Recording...".to_string());
            }
            Err(e) => {
                error!(error = %e, "starting GIF failed");
                self.message = Some(e);
            }
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_some()
    }

    /// Snapshot of the current settings
    pub fn to_config(&self) -> AppConfig {
        AppConfig {
            version: CONFIG_VERSION,
            params: self.system.params().clone(),
            maze: self.system.maze_settings().unwrap_or_default(),
            // Every generated maze has entrance walls
            open_box: self.system.walls().is_empty(),
            seed: Some(self.system.seed()),
            steps_per_frame: self.steps_per_frame,
            color_mode: self.color_mode,
        }
    }

    /// Save the current settings as JSON into the output directory
    pub fn save_config(&mut self) {
        let path = self
            .output_dir
            .join(format!("sph-maze-{}.json", self.system.seed()));
        self.message = Some(match self.to_config().save_to_file(&path) {
            Ok(()) => {
                info!(path = %path.display(), "saved config");
                format!("Saved {}", path.display())
            }
            Err(e) => {
                error!(error = %e, "saving config failed");
                e
            }
        });
    }

    /// Finish any in-progress recording before exit
    pub fn shutdown(&mut self) {
        if let Some(recorder) = self.recorder.take() {
            if let Err(e) = recorder.finish() {
                error!(error = %e, "finishing GIF failed");
            }
        }
    }
}
