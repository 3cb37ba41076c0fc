//! Watchlist panel rendering: one tab per watchlist over the quote rows.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, Focus};

/// Draw the watchlist tabs and the rows of the current tab.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let palette = &app.palette;
    let focused = app.focus == Focus::Watchlist;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border(focused))
        .title(" Watchlist ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    let titles: Vec<String> = app.profile.watchlists.iter().map(|w| w.name.clone()).collect();
    let tabs = Tabs::new(titles)
        .select(app.watchlist.tab)
        .style(Style::default().fg(palette.muted))
        .highlight_style(
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )
        .divider("│");
    frame.render_widget(tabs, rows[0]);

    if app.watchlist.items.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "No stocks in this watchlist",
                Style::default().fg(palette.muted),
            )),
            rows[1],
        );
        return;
    }

    let items: Vec<ListItem> = app
        .watchlist
        .items
        .iter()
        .map(|row| {
            let symbol = Span::styled(
                format!("{:<6}", row.symbol),
                Style::default().add_modifier(Modifier::BOLD),
            );
            let Some(stock) = row.quote.as_ref() else {
                return ListItem::new(Line::from(vec![
                    symbol,
                    Span::styled("   no quote", Style::default().fg(palette.muted)),
                ]));
            };
            ListItem::new(Line::from(vec![
                symbol,
                Span::raw(format!(" {:>10.2} ", stock.price)),
                Span::styled(
                    format!("{:>+7.2}%", stock.change_percent),
                    palette.change(stock.change),
                ),
            ]))
        })
        .collect();

    let list = List::new(items).highlight_style(if focused {
        palette.highlight()
    } else {
        Style::default().add_modifier(Modifier::REVERSED)
    });
    let mut state = ListState::default().with_selected(Some(app.watchlist.selected));
    frame.render_stateful_widget(list, rows[1], &mut state);
}
