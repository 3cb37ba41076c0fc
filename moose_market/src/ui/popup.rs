//! Popups drawn over the dashboard.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::App;

/// Search dropdown below the header's search box.
pub fn render_search_results(frame: &mut Frame, app: &App, header: Rect) {
    let palette = &app.palette;
    let results = app.search.visible();
    let frame_area = frame.area();
    let height = (results.len() as u16 + 2).min(frame_area.height.saturating_sub(header.bottom()));
    let area = Rect::new(
        header.x + 15,
        header.bottom(),
        50.min(frame_area.width.saturating_sub(header.x + 15)),
        height,
    )
    .intersection(frame_area);
    if area.is_empty() {
        return;
    }

    let items: Vec<ListItem> = results
        .iter()
        .map(|hit| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<8}", hit.symbol),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(hit.name.clone()),
                Span::styled(format!("  {}", hit.exchange), Style::default().fg(palette.muted)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(palette.border(true)),
        )
        .style(palette.base())
        .highlight_style(palette.highlight());
    let mut state = ListState::default().with_selected(app.search.selected);
    frame.render_widget(Clear, area);
    frame.render_stateful_widget(list, area, &mut state);
}

/// Profile manager list.
pub fn render_profiles(frame: &mut Frame, app: &App, selected: usize) {
    let palette = &app.palette;
    let area = centered_rect(50, 50, frame.area());

    let items: Vec<ListItem> = app
        .profiles
        .iter()
        .map(|p| {
            let marker = if p.id == app.profile.id { "● " } else { "  " };
            ListItem::new(Line::from(vec![
                Span::styled(marker, Style::default().fg(palette.accent)),
                Span::raw(p.name.clone()),
                Span::styled(
                    format!("  created {}", p.created_at.format("%Y-%m-%d")),
                    Style::default().fg(palette.muted),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(palette.border(true))
                .title(" Profiles ")
                .title_bottom(" Enter Activate │ n New │ x Delete │ Esc Close "),
        )
        .style(palette.base())
        .highlight_style(palette.highlight());
    let mut state = ListState::default().with_selected(Some(selected));
    frame.render_widget(Clear, area);
    frame.render_stateful_widget(list, area, &mut state);
}

/// One-line text prompt.
pub fn render_input(frame: &mut Frame, app: &App, title: &str, text: &str) {
    let palette = &app.palette;
    let area = fixed_height(centered_rect(40, 100, frame.area()), 3);
    let input = Paragraph::new(format!("{}▏", text))
        .style(palette.base())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(palette.border(true))
                .title(title.to_string())
                .title_bottom(" Enter Save │ Esc Cancel "),
        );
    frame.render_widget(Clear, area);
    frame.render_widget(input, area);
}

/// Profile deletion prompt.
pub fn render_confirm(frame: &mut Frame, app: &App, name: &str) {
    let palette = &app.palette;
    let area = fixed_height(centered_rect(40, 100, frame.area()), 4);
    let body = Paragraph::new(vec![
        Line::from(format!("Delete profile \"{}\"?", name)),
        Line::from(Span::styled("y Delete │ n Keep", Style::default().fg(palette.muted))),
    ])
    .alignment(Alignment::Center)
    .style(palette.base())
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.down))
            .title(" Confirm "),
    );
    frame.render_widget(Clear, area);
    frame.render_widget(body, area);
}

/// Error notice.
pub fn render_notice(frame: &mut Frame, app: &App, message: &str) {
    let palette = &app.palette;
    let area = fixed_height(centered_rect(50, 100, frame.area()), 5);
    let body = Paragraph::new(message.to_string())
        .wrap(Wrap { trim: true })
        .style(palette.base())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.down))
                .title(" Error ")
                .title_bottom(" any key to dismiss "),
        );
    frame.render_widget(Clear, area);
    frame.render_widget(body, area);
}

/// A rectangle `percent_x` by `percent_y` of `area`, centred in it.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// `height` rows from the vertical middle of `area`.
fn fixed_height(area: Rect, height: u16) -> Rect {
    let height = height.min(area.height);
    Rect::new(area.x, area.y + (area.height - height) / 2, area.width, height)
}
