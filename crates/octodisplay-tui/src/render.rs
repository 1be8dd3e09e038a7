//! Pure view/render functions.
//!
//! Functions here take `&DisplayState`, draw to a ratatui `Frame`, and never
//! mutate state.
//!
//! Layout (four equal stacked regions):
//!
//! ```text
//! ┌──────────────────────────────┐
//! │      Octoprint CPU: 3.2%     │  banner, top-aligned
//! │          part.gcode          │  job name + ETA, centered
//! │        0:10:00h left         │
//! │███████████ 42%               │  progress gauge, top-aligned
//! │ Extruder: 200°C / 210°C      │  temperatures, centered
//! │     Bed: 60°C / 60°C         │
//! └──────────────────────────────┘
//! ```

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Gauge, Paragraph};

use crate::state::DisplayState;

const BACKGROUND: Style = Style::new().bg(Color::Black);
const BANNER: Style = Style::new().fg(Color::White).bg(Color::Green);
const ACCENT: Style = Style::new()
    .fg(Color::Green)
    .bg(Color::Black)
    .add_modifier(Modifier::BOLD);
const GAUGE: Style = Style::new().fg(Color::Green).bg(Color::White);

/// Renders the whole display to the frame.
pub fn render(state: &DisplayState, frame: &mut Frame) {
    let area = frame.area();
    frame.render_widget(Block::default().style(BACKGROUND), area);

    let [banner, time, progress, temps] = Layout::vertical([Constraint::Ratio(1, 4); 4]).areas(area);

    frame.render_widget(
        Paragraph::new(state.banner_text())
            .alignment(Alignment::Center)
            .style(BANNER),
        top(banner, 1),
    );

    let time_text = state.time_text();
    let time_lines = line_count(&time_text);
    frame.render_widget(
        Paragraph::new(time_text)
            .alignment(Alignment::Center)
            .style(ACCENT),
        middle(time, time_lines),
    );

    frame.render_widget(
        Gauge::default()
            .gauge_style(GAUGE)
            .percent(u16::from(state.completion.min(100))),
        top(progress, 1),
    );

    let temp_text = state.temperature_text();
    let temp_lines = line_count(&temp_text);
    frame.render_widget(
        Paragraph::new(temp_text)
            .alignment(Alignment::Center)
            .style(ACCENT),
        middle(temps, temp_lines),
    );
}

fn line_count(text: &str) -> u16 {
    text.lines().count().max(1) as u16
}

/// First `height` rows of `area`.
fn top(area: Rect, height: u16) -> Rect {
    Rect {
        height: height.min(area.height),
        ..area
    }
}

/// `height` rows vertically centered in `area`.
fn middle(area: Rect, height: u16) -> Rect {
    let height = height.min(area.height);
    Rect {
        y: area.y + (area.height - height) / 2,
        height,
        ..area
    }
}
