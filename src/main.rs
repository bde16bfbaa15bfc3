mod app;
mod braille;
mod color;
mod config;
mod error;
mod export;
mod integrate;
mod maze;
mod params;
mod particle;
mod presets;
mod solver;
mod spatial;
mod system;
mod ui;

use app::{App, MAX_SPEED, MIN_SPEED};
use clap::Parser;
use config::AppConfig;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use maze::MazeSettings;
use presets::{Preset, PresetManager};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::{self, File};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use system::ParticleSystem;
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(name = "sph-maze")]
#[command(about = "SPH fluid flowing through a random maze, in the terminal")]
struct Args {
    /// Maze cells per side (5-50)
    #[arg(short = 'm', long)]
    maze: Option<u32>,

    /// Wall threshold (0.3-0.7, higher means fewer walls)
    #[arg(short = 't', long)]
    threshold: Option<f32>,

    /// Rng seed for the maze and particle layout (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Simulation speed (steps per frame, 1-50)
    #[arg(long)]
    speed: Option<usize>,

    /// Named parameter preset (Water, Viscous, Splashy, Heavy, Grid-search or a user preset)
    #[arg(short = 'p', long)]
    preset: Option<String>,

    /// Load settings from a JSON config file (command-line flags override it)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Start with an empty box instead of a maze
    #[arg(long = "open-box")]
    open_box: bool,

    /// Save the effective parameters as a user preset with this name
    #[arg(long = "save-preset")]
    save_preset: Option<String>,

    /// Print the available presets and exit
    #[arg(long = "list-presets")]
    list_presets: bool,

    /// Directory for snapshots, recordings and saved configs
    #[arg(short = 'o', long = "output-dir", default_value = ".")]
    output_dir: PathBuf,

    /// Log file (defaults to sph-maze.log in the user cache directory)
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long = "log-level", default_value = "info")]
    log_level: Level,
}

/// Send tracing output to a file; the terminal belongs to the UI
fn init_logging(path: Option<PathBuf>, level: Level) -> Result<PathBuf, String> {
    let path = match path {
        Some(path) => path,
        None => dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("sph-maze")
            .join("sph-maze.log"),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| format!("Failed to create log directory: {}", e))?;
    }
    let file = File::create(&path).map_err(|e| format!("Failed to create log file: {}", e))?;

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(path)
}

/// Merge config file, preset and flags into one config; flags win
fn resolve_config(args: &Args, presets: &PresetManager) -> Result<AppConfig, String> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::default(),
    };

    if let Some(name) = &args.preset {
        let preset = presets.find(name).ok_or_else(|| {
            format!(
                "Unknown preset '{}' (available: {})",
                name,
                presets.preset_names().join(", ")
            )
        })?;
        config.params = preset.params.clone();
    }

    // Out-of-range maze values are refused rather than clamped
    let maze = MazeSettings {
        length: args.maze.unwrap_or(config.maze.length),
        threshold: args.threshold.unwrap_or(config.maze.threshold),
    };
    maze.validate().map_err(|e| e.to_string())?;
    config.maze = maze;

    if let Some(speed) = args.speed {
        config.steps_per_frame = speed;
    }
    config.steps_per_frame = config.steps_per_frame.clamp(MIN_SPEED, MAX_SPEED);
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.open_box |= args.open_box;

    config.params.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let mut presets = PresetManager::new();

    if args.list_presets {
        for preset in presets.all_presets() {
            println!("{:<14} {}", preset.name, preset.description);
        }
        return Ok(());
    }

    let log_path = init_logging(args.log_file.clone(), args.log_level)?;
    let config = resolve_config(&args, &presets)?;

    if let Some(name) = &args.save_preset {
        let path = presets.save_preset(Preset::new(name.as_str(), "User preset", config.params.clone()))?;
        println!("Saved preset '{}' to {}", name, path.display());
    }

    let seed = config.seed.unwrap_or_else(rand::random);
    info!(seed, log = %log_path.display(), "starting");

    let mut system = ParticleSystem::new(config.params.clone(), seed)?;
    if config.open_box {
        system.initialize_open(config.maze);
    } else {
        system.initialize(config.maze.length, config.maze.threshold)?;
    }

    fs::create_dir_all(&args.output_dir)?;
    let mut app = App::new(system, args.output_dir.clone());
    app.steps_per_frame = config.steps_per_frame;
    app.color_mode = config.color_mode;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);
    app.shutdown();

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }
    info!(steps = app.system.step_count(), "exiting");

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    // Target ~60fps for smooth animation
    const FRAME_DURATION: Duration = Duration::from_millis(16);

    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        if event::poll(FRAME_DURATION)? {
            if let Event::Key(key) = event::read()? {
                // Only process Press events
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                match key.code {
                    KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(()),
                    KeyCode::Char(' ') => app.toggle_pause(),
                    KeyCode::Char('a') | KeyCode::Char('A') => app.add_particles(),
                    KeyCode::Char('r') | KeyCode::Char('R') => app.reset(),
                    KeyCode::Char('m') | KeyCode::Char('M') => app.regenerate_maze(),
                    KeyCode::Char('p') | KeyCode::Char('P') => app.clear_maze(),
                    KeyCode::Char('c') | KeyCode::Char('C') => app.cycle_color_mode(),
                    KeyCode::Char('v') | KeyCode::Char('V') => app.toggle_fullscreen(),
                    KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('?') => app.toggle_help(),
                    KeyCode::Char('x') | KeyCode::Char('X') => app.export_snapshot(),
                    KeyCode::Char('g') | KeyCode::Char('G') => app.toggle_recording(),
                    KeyCode::Char('s') | KeyCode::Char('S') => app.save_config(),
                    KeyCode::Char('+') | KeyCode::Char('=') => app.increase_speed(),
                    KeyCode::Char('-') | KeyCode::Char('_') => app.decrease_speed(),
                    KeyCode::Up => {
                        if !app.show_help {
                            app.scroll_controls_up();
                        }
                    }
                    KeyCode::Down => {
                        if !app.show_help {
                            let term_size = terminal.size().unwrap_or_default();
                            let visible = ui::get_controls_visible_lines(term_size.height);
                            app.scroll_controls_down(ui::CONTROLS_CONTENT_LINES.saturating_sub(visible));
                        }
                    }
                    KeyCode::Esc => {
                        if app.show_help {
                            app.toggle_help();
                        }
                    }
                    KeyCode::Char('j') | KeyCode::Char('J') => {
                        if app.show_help {
                            app.scroll_help_down(ui::HELP_CONTENT_LINES);
                        }
                    }
                    KeyCode::Char('k') | KeyCode::Char('K') => {
                        if app.show_help {
                            app.scroll_help_up();
                        }
                    }
                    _ => {}
                }
            }
        }

        app.tick();
    }
}
