//! UI module for TUI rendering.

pub mod chart;
pub mod header;
pub mod heatmap;
pub mod popup;
pub mod watchlist;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

use crate::app::{App, Focus, Mode};

/// Render the dashboard and whichever popup the current mode needs.
pub fn render(frame: &mut Frame, app: &App) {
    frame.render_widget(Block::default().style(app.palette.base()), frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Panels
            Constraint::Length(1), // Footer
        ])
        .split(frame.area());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(chunks[1]);

    let sidebar = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(body[1]);

    header::render(frame, app, chunks[0]);
    chart::render(frame, app, body[0]);
    watchlist::render(frame, app, sidebar[0]);
    heatmap::render(frame, app, sidebar[1]);
    render_footer(frame, app, chunks[2]);

    if app.search.open {
        popup::render_search_results(frame, app, chunks[0]);
    }
    match &app.mode {
        Mode::NewWatchlist(text) => popup::render_input(frame, app, " New watchlist ", text),
        Mode::Profiles { selected } => popup::render_profiles(frame, app, *selected),
        Mode::NewProfile(text) => popup::render_input(frame, app, " New profile ", text),
        Mode::ConfirmDelete { name, .. } => popup::render_confirm(frame, app, name),
        Mode::Notice(message) => popup::render_notice(frame, app, message),
        Mode::Normal | Mode::Search => {}
    }
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let hints = match (&app.mode, app.focus) {
        (Mode::Search, _) => "Type to search │ ↑↓ Select │ Enter Open │ Esc Close",
        (Mode::Normal, Focus::Chart) => {
            "←→ Timeframe │ a Add to watchlist │ d Level │ D Clear levels │ Tab Focus │ / Search │ p Profiles │ T Theme │ q Quit"
        }
        (Mode::Normal, Focus::Watchlist) => {
            "←→ Tabs │ ↑↓ Select │ Enter Chart │ x Remove │ n New watchlist │ Tab Focus │ / Search │ r Refresh │ q Quit"
        }
        (Mode::Normal, Focus::Heatmap) => {
            "←→↑↓ Select │ Enter Chart │ m Watchlist/Market │ Tab Focus │ / Search │ r Refresh │ q Quit"
        }
        _ => "Enter Confirm │ Esc Cancel",
    };
    let footer = Paragraph::new(Line::from(Span::styled(
        format!(" {}", hints),
        ratatui::style::Style::default().fg(app.palette.muted),
    )));
    frame.render_widget(footer, area);
}
