use crate::app::App;
use crate::braille;
use crate::system::MazeState;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const SIDEBAR_WIDTH: u16 = 24;

/// Heights of the fixed sidebar sections
const STATUS_HEIGHT: u16 = 7;
const PARAMS_HEIGHT: u16 = 10;

/// Max scroll for help content (generous to account for text wrapping on small screens)
pub const HELP_CONTENT_LINES: u16 = 40;

/// Number of lines in controls content
pub const CONTROLS_CONTENT_LINES: u16 = 14;

// UI color scheme
const BORDER_COLOR: Color = Color::Cyan;
const HIGHLIGHT_COLOR: Color = Color::Yellow;
const TEXT_COLOR: Color = Color::White;
const DIM_TEXT_COLOR: Color = Color::Gray;

/// Creates a standard styled block with rounded borders
fn styled_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_COLOR))
        .title(title)
}

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if app.fullscreen_mode {
        render_canvas(frame, area, app);
    } else {
        let layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
            .split(area);

        render_sidebar(frame, layout[0], app);
        render_canvas(frame, layout[1], app);
    }

    if app.show_help {
        render_help_overlay(frame, area, app);
    }
}

/// Visible lines in the controls box for a terminal of the given height
pub fn get_controls_visible_lines(terminal_height: u16) -> u16 {
    terminal_height
        .saturating_sub(STATUS_HEIGHT + PARAMS_HEIGHT)
        .saturating_sub(2)
}

fn render_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(STATUS_HEIGHT),
            Constraint::Length(PARAMS_HEIGHT),
            Constraint::Min(4), // Controls
        ])
        .split(area);

    render_status_box(frame, sections[0], app);
    render_params_box(frame, sections[1], app);
    render_controls_box(frame, sections[2], app);
}

fn render_status_box(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block(" SPH Maze ");
    let system = &app.system;

    let max = system.params().max_particles;
    let fill = system.particle_count() as f32 / max.max(1) as f32;
    let bar_width = (area.width.saturating_sub(4)) as usize;
    let filled = ((fill * bar_width as f32) as usize).min(bar_width);
    let empty = bar_width.saturating_sub(filled);

    let (state_text, state_color) = if app.paused {
        ("PAUSED", HIGHLIGHT_COLOR)
    } else if system.walls().is_empty() {
        ("OPEN BOX", BORDER_COLOR)
    } else if system.maze_state() == MazeState::Solved {
        ("SOLVED", Color::Green)
    } else {
        ("FLOWING", BORDER_COLOR)
    };

    let mut status_line = vec![Span::styled(state_text, Style::default().fg(state_color))];
    if app.is_recording() {
        status_line.push(Span::styled(" ● REC", Style::default().fg(Color::Red)));
    }

    let content = vec![
        Line::from(Span::styled(
            format!("{} / {}", system.particle_count(), max),
            Style::default().fg(TEXT_COLOR),
        )),
        Line::from(vec![
            Span::styled("█".repeat(filled), Style::default().fg(Color::Blue)),
            Span::styled("░".repeat(empty), Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(Span::styled(
            format!("Step {}", system.step_count()),
            Style::default().fg(DIM_TEXT_COLOR),
        )),
        Line::from(status_line),
        Line::from(Span::styled(
            app.message.clone().unwrap_or_default(),
            Style::default().fg(HIGHLIGHT_COLOR),
        )),
    ];

    let paragraph = Paragraph::new(content).block(block);
    frame.render_widget(paragraph, area);
}

fn render_params_box(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block(" Parameters ");
    let system = &app.system;
    let params = system.params();

    let make_line = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("  {}: ", label), Style::default().fg(DIM_TEXT_COLOR)),
            Span::styled(value, Style::default().fg(TEXT_COLOR)),
        ])
    };

    let maze = match system.maze_settings() {
        Some(m) if !system.walls().is_empty() => format!("{0}x{0} @ {1:.2}", m.length, m.threshold),
        _ => "none".to_string(),
    };

    let content = vec![
        make_line("Maze", maze),
        make_line("State", system.maze_state().name().to_string()),
        make_line("Seed", system.seed().to_string()),
        make_line("Speed", app.steps_per_frame.to_string()),
        make_line("Color", app.color_mode.name().to_string()),
        make_line("Search", params.force_search.name().to_string()),
        make_line("Visc", format!("{:.0}", params.viscosity)),
        make_line("Gas", format!("{:.0}", params.gas_constant)),
    ];

    let paragraph = Paragraph::new(content).block(block);
    frame.render_widget(paragraph, area);
}

fn render_controls_box(frame: &mut Frame, area: Rect, app: &App) {
    let key_style = Style::default().fg(HIGHLIGHT_COLOR);
    let desc_style = Style::default().fg(DIM_TEXT_COLOR);

    // Helper to create a control line
    let make_control = |key: &str, desc: &str| -> Line<'_> {
        Line::from(vec![
            Span::styled(format!("{:>5}", key), key_style),
            Span::styled(format!(" {}", desc), desc_style),
        ])
    };

    let content = vec![
        make_control("Space", "pause/resume"),
        make_control("A", "add particles"),
        make_control("R", "reset fluid"),
        make_control("M", "new maze"),
        make_control("P", "open box"),
        make_control("C", "color mode"),
        make_control("+/-", "speed"),
        make_control("V", "fullscreen"),
        make_control("X", "save PNG"),
        make_control("G", "record GIF"),
        make_control("S", "save config"),
        make_control("H", "help"),
        make_control("↑/↓", "scroll"),
        make_control("Q", "quit"),
    ];

    let content_height = content.len() as u16;
    let visible_height = area.height.saturating_sub(2); // minus borders
    let max_scroll = content_height.saturating_sub(visible_height);

    let title = if max_scroll > 0 {
        " Controls (↑↓) "
    } else {
        " Controls "
    };

    let paragraph = Paragraph::new(content)
        .block(styled_block(title))
        .scroll((app.controls_scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_canvas(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block("");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cells = braille::render_to_braille(
        &app.system,
        inner.width,
        inner.height,
        app.color_mode,
        &app.color_lut,
    );

    let buf = frame.buffer_mut();
    for cell in cells {
        let x = inner.x + cell.x;
        let y = inner.y + cell.y;

        if x < inner.x + inner.width && y < inner.y + inner.height {
            buf[(x, y)].set_char(cell.char).set_fg(cell.color);
        }
    }
}

fn render_help_overlay(frame: &mut Frame, area: Rect, app: &App) {
    // Calculate the canvas area (exclude sidebar unless fullscreen)
    let canvas_x = if app.fullscreen_mode { 0 } else { SIDEBAR_WIDTH };
    let canvas_width = if app.fullscreen_mode {
        area.width
    } else {
        area.width.saturating_sub(SIDEBAR_WIDTH)
    };

    // Center the help dialog within the canvas
    let help_width = 56.min(canvas_width.saturating_sub(4));
    let help_height = area.height.saturating_sub(4).min(32);
    let x = canvas_x + (canvas_width.saturating_sub(help_width)) / 2;
    let y = (area.height.saturating_sub(help_height)) / 2;

    let help_area = Rect {
        x: area.x + x,
        y: area.y + y,
        width: help_width,
        height: help_height,
    };

    frame.render_widget(Clear, help_area);

    let heading = |text: &'static str| Line::from(Span::styled(text, Style::default().fg(HIGHLIGHT_COLOR)));

    let content = vec![
        Line::from(""),
        Line::from(Span::styled("SMOOTHED PARTICLE HYDRODYNAMICS", Style::default().fg(BORDER_COLOR))),
        Line::from(""),
        Line::from("A block of fluid falls into a random maze. Each particle feels pressure, viscosity and gravity from its neighbors within the smoothing radius."),
        Line::from(""),
        heading("MAZE:"),
        Line::from("The maze is solved when the first particle reaches the floor. M builds a new maze, P removes it."),
        Line::from(""),
        heading("COLOR MODES (C):"),
        Line::from("Palette (per-particle tint), Density (relative to the densest particle), Speed (relative to the fastest)"),
        Line::from(""),
        heading("EXPORT:"),
        Line::from("X saves a PNG snapshot, G starts and stops GIF recording, S saves the current settings as JSON. Files go to the output directory."),
        Line::from(""),
        heading("BASIC CONTROLS:"),
        Line::from("Space=Pause, A=Add particles, R=Reset, +/-=Speed, V=Fullscreen, Q=Quit"),
        Line::from(""),
    ];

    let content_height = content.len() as u16;
    let visible_height = help_height.saturating_sub(2); // minus borders
    let max_scroll = content_height.saturating_sub(visible_height);

    // Update title to show scroll hint if scrollable
    let title = if max_scroll > 0 {
        " Help (J/K scroll, H to close) "
    } else {
        " Help (H to close) "
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(HIGHLIGHT_COLOR))
        .title(title);

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.help_scroll, 0));

    frame.render_widget(paragraph, help_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SimParams;
    use crate::system::ParticleSystem;
    use ratatui::{backend::TestBackend, Terminal};
    use tempfile::tempdir;

    fn app() -> App {
        let mut system = ParticleSystem::new(SimParams::default(), 3).unwrap();
        system.initialize(10, 0.5).unwrap();
        App::new(system, tempdir().unwrap().path().to_path_buf())
    }

    fn rendered_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_sidebar_shows_status() {
        let text = rendered_text(&app());
        assert!(text.contains("380 / 2500"));
        assert!(text.contains("FLOWING"));
        assert!(text.contains("10x10"));
    }

    #[test]
    fn test_canvas_has_braille() {
        let text = rendered_text(&app());
        assert!(text.chars().any(|c| ('\u{2801}'..='\u{28FF}').contains(&c)));
    }

    #[test]
    fn test_help_overlay() {
        let mut app = app();
        app.toggle_help();
        assert!(rendered_text(&app).contains("Help"));
    }

    #[test]
    fn test_controls_visible_lines() {
        assert_eq!(get_controls_visible_lines(40), 40 - STATUS_HEIGHT - PARAMS_HEIGHT - 2);
        assert_eq!(get_controls_visible_lines(5), 0);
    }
}
