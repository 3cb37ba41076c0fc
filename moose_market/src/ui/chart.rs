//! Chart panel rendering.
//!
//! Candles are drawn as text, one column per bar: `┃` for the body and `│`
//! for the wicks. The price axis sits on the left; horizontal levels are drawn
//! as `─` wherever no candle covers the row.

use moose_common::Timeframe;
use moose_common::model::{CandleStick, Stock};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, Focus};
use crate::chart::{candle_glyph, date_labels, format_price, visible_candles, PriceScale};
use crate::theme::Palette;

const AXIS_WIDTH: u16 = 11;
const LEVEL: char = '─';

/// Draw the info line, timeframe selector, candles and date labels.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let palette = &app.palette;
    let title = match &app.chart.symbol {
        Some(symbol) => format!(" {} · {} ", symbol, app.chart.timeframe),
        None => String::from(" Chart "),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border(app.focus == Focus::Chart))
        .title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Symbol info
            Constraint::Length(1), // Timeframe selector
            Constraint::Min(3),    // Plot
            Constraint::Length(1), // Dates
        ])
        .split(inner);

    frame.render_widget(info_line(app), rows[0]);
    frame.render_widget(timeframe_selector(palette, app.chart.timeframe), rows[1]);

    let Some(data) = app.chart.data.as_ref() else {
        let message = if app.chart.loading {
            Span::styled("Loading chart data…", Style::default().fg(palette.muted))
        } else if let Some(error) = &app.chart.error {
            Span::styled(error.clone(), Style::default().fg(palette.down))
        } else {
            Span::styled(
                "Search with / or press Enter on a watchlist symbol",
                Style::default().fg(palette.muted),
            )
        };
        frame.render_widget(Paragraph::new(Line::from(message)).alignment(Alignment::Center), rows[2]);
        return;
    };

    let Some(scale) = PriceScale::for_candles(&data.candles) else {
        frame.render_widget(
            Paragraph::new("No candles").alignment(Alignment::Center),
            rows[2],
        );
        return;
    };

    let plot = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(AXIS_WIDTH), Constraint::Min(1)])
        .split(rows[2]);

    let columns = usize::from(plot[1].width);
    let spaced = data.candles.candles.len() * 2 <= columns;
    let shown = visible_candles(&data.candles.candles, if spaced { columns / 2 } else { columns });

    frame.render_widget(price_axis(palette, &scale, plot[0].height), plot[0]);
    frame.render_widget(
        candle_rows(palette, shown, &scale, &app.chart.levels(), plot[1].height, spaced),
        plot[1],
    );

    if let Some((start, end)) = date_labels(shown, data.candles.timeframe) {
        let dates = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(AXIS_WIDTH), Constraint::Min(1)])
            .split(rows[3]);
        let muted = Style::default().fg(palette.muted);
        frame.render_widget(Paragraph::new(Span::styled(start, muted)), dates[1]);
        frame.render_widget(
            Paragraph::new(Span::styled(end, muted)).alignment(Alignment::Right),
            dates[1],
        );
    }
}

fn info_line(app: &App) -> Paragraph<'static> {
    let palette = &app.palette;
    let Some(data) = app.chart.data.as_ref() else {
        return Paragraph::new("");
    };
    let source = Span::styled(format!("  [{}]", data.source), Style::default().fg(palette.muted));
    let Some(quote) = data.quote.as_ref() else {
        return Paragraph::new(Line::from(vec![
            Span::styled(data.candles.symbol.clone(), Style::default().add_modifier(Modifier::BOLD)),
            source,
        ]));
    };
    Paragraph::new(Line::from(vec![
        Span::styled(
            format!("{} ", quote.name),
            Style::default().fg(palette.foreground).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("{} ", format_price(quote.price))),
        Span::styled(change_text(quote), palette.change(quote.change)),
        Span::styled(
            format!(
                "  O {:.2}  H {:.2}  L {:.2}  Vol {}",
                quote.open, quote.high, quote.low, quote.volume
            ),
            Style::default().fg(palette.muted),
        ),
        source,
    ]))
}

fn change_text(quote: &Stock) -> String {
    format!("{:+.2} ({:+.2}%)", quote.change, quote.change_percent)
}

fn timeframe_selector(palette: &Palette, current: Timeframe) -> Paragraph<'static> {
    let mut spans = Vec::with_capacity(Timeframe::ALL.len() * 2);
    for timeframe in Timeframe::ALL {
        let style = if timeframe == current {
            palette.highlight()
        } else {
            Style::default().fg(palette.muted)
        };
        spans.push(Span::styled(format!(" {} ", timeframe.label()), style));
        spans.push(Span::raw(" "));
    }
    Paragraph::new(Line::from(spans))
}

fn price_axis(palette: &Palette, scale: &PriceScale, height: u16) -> Paragraph<'static> {
    let mut lines = vec![String::new(); usize::from(height)];
    for price in scale.labels() {
        let row = usize::from(scale.row_for_price(price, height));
        if let Some(line) = lines.get_mut(row) {
            *line = format!("{:>10} ", format_price(price));
        }
    }
    Paragraph::new(lines.into_iter().map(Line::from).collect::<Vec<_>>())
        .style(Style::default().fg(palette.muted))
}

fn candle_rows(
    palette: &Palette,
    candles: &[CandleStick],
    scale: &PriceScale,
    levels: &[f64],
    height: u16,
    spaced: bool,
) -> Paragraph<'static> {
    let level_rows: Vec<u16> = levels.iter().map(|l| scale.row_for_price(*l, height)).collect();
    let level_style = Style::default().fg(palette.level);

    let lines = (0..height)
        .map(|row| {
            let on_level = level_rows.contains(&row);
            let gap = if on_level { LEVEL } else { ' ' };
            let mut spans = Vec::with_capacity(candles.len() * 2);
            for candle in candles {
                let glyph = candle_glyph(candle, row, scale, height);
                if glyph == ' ' {
                    spans.push(Span::styled(gap.to_string(), level_style));
                } else {
                    let color = if candle.is_bullish() { palette.up } else { palette.down };
                    spans.push(Span::styled(glyph.to_string(), Style::default().fg(color)));
                }
                if spaced {
                    spans.push(Span::styled(gap.to_string(), level_style));
                }
            }
            Line::from(spans)
        })
        .collect::<Vec<_>>();

    Paragraph::new(lines)
}
