//! Header bar: title, search box, profile and data source.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, Mode};

/// Draw the title, search box, profile and data source.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let palette = &app.palette;
    let searching = app.mode == Mode::Search;

    let search = if searching {
        Span::styled(format!(" Search: {}▏", app.search.text), palette.highlight())
    } else if app.search.text.is_empty() {
        Span::styled(" / Search symbols ", Style::default().fg(palette.muted))
    } else {
        Span::raw(format!(" Search: {} ", app.search.text))
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " MOOSE MARKET ",
            Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
        ),
        Span::raw("│"),
        search,
        Span::raw("│ "),
        Span::styled(
            format!("Profile: {}", app.profile.name),
            Style::default().fg(palette.foreground),
        ),
        Span::raw(" │ "),
        Span::styled(app.source_name(), Style::default().fg(palette.muted)),
        Span::raw(" │ "),
        Span::styled(
            format!("Updated {}", app.last_refresh.format("%H:%M:%S")),
            Style::default().fg(palette.muted),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(palette.border(searching)),
    );

    frame.render_widget(header, area);
}
