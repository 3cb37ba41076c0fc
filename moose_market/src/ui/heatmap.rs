//! Heatmap rendering: a grid of coloured tiles, one per stock.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, Focus};
use crate::heatmap::tile_color;

const TILE_WIDTH: u16 = 11;
const TILE_HEIGHT: u16 = 3;

/// Draw one coloured tile per stock.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let palette = &app.palette;
    let focused = app.focus == Focus::Heatmap;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border(focused))
        .title(app.heatmap.title());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.heatmap.tiles.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled("No stocks to show", Style::default().fg(palette.muted))),
            inner,
        );
        return;
    }

    let columns = (inner.width / TILE_WIDTH).max(1);
    let tile_rows = (inner.height / TILE_HEIGHT).max(1);
    let capacity = usize::from(columns * tile_rows);

    for (i, stock) in app.heatmap.tiles.iter().take(capacity).enumerate() {
        let Ok(i) = u16::try_from(i) else { break };
        let x = inner.x + (i % columns) * TILE_WIDTH;
        let y = inner.y + (i / columns) * TILE_HEIGHT;
        let tile = Rect::new(
            x,
            y,
            TILE_WIDTH.min(inner.right().saturating_sub(x)),
            TILE_HEIGHT.min(inner.bottom().saturating_sub(y)),
        );

        let mut style = Style::default().fg(Color::White).bg(tile_color(stock.change_percent));
        if focused && usize::from(i) == app.heatmap.selected {
            style = style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
        }
        let text = vec![
            Line::from(Span::styled(
                stock.symbol.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(format!("{:+.2}%", stock.change_percent)),
        ];
        frame.render_widget(
            Paragraph::new(text).style(style).alignment(Alignment::Center),
            tile,
        );
    }
}
