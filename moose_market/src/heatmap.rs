//! Heatmap panel state.

use moose_common::model::Stock;
use ratatui::style::Color;

/// What the heatmap tiles show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeatmapScope {
    /// Stocks of the watchlist shown in the watchlist panel.
    #[default]
    Watchlist,
    /// The whole saved market snapshot.
    Market,
}

/// Heatmap panel state.
#[derive(Debug, Default)]
pub struct HeatmapPanel {
    /// Watchlist or whole market.
    pub scope: HeatmapScope,
    /// Watchlist the tiles follow.
    pub watchlist_id: String,
    /// One tile per stock.
    pub tiles: Vec<Stock>,
    /// Selected tile.
    pub selected: usize,
}

impl HeatmapPanel {
    /// Point the heatmap at another watchlist. The selection resets.
    pub fn set_watchlist(&mut self, watchlist_id: &str) {
        if self.watchlist_id != watchlist_id {
            self.watchlist_id = watchlist_id.to_string();
            self.selected = 0;
        }
    }

    /// Switch between watchlist and market scope.
    pub fn toggle_scope(&mut self) {
        self.scope = match self.scope {
            HeatmapScope::Watchlist => HeatmapScope::Market,
            HeatmapScope::Market => HeatmapScope::Watchlist,
        };
        self.selected = 0;
    }

    /// Replace the tiles, keeping the selection in range.
    pub fn set_tiles(&mut self, tiles: Vec<Stock>) {
        self.tiles = tiles;
        if self.selected >= self.tiles.len() {
            self.selected = self.tiles.len().saturating_sub(1);
        }
    }

    /// Select the next tile, wrapping around.
    pub fn select_next(&mut self) {
        if !self.tiles.is_empty() {
            self.selected = (self.selected + 1) % self.tiles.len();
        }
    }

    /// Select the previous tile, wrapping around.
    pub fn select_previous(&mut self) {
        if !self.tiles.is_empty() {
            self.selected = (self.selected + self.tiles.len() - 1) % self.tiles.len();
        }
    }

    /// Symbol of the selected tile.
    pub fn selected_symbol(&self) -> Option<&str> {
        self.tiles.get(self.selected).map(|s| s.symbol.as_str())
    }

    /// Block title for the current scope.
    pub fn title(&self) -> &'static str {
        match self.scope {
            HeatmapScope::Watchlist => " Heatmap ",
            HeatmapScope::Market => " Heatmap (market) ",
        }
    }
}

/// Tile colour for a percent change: pure green above zero, pure red
/// otherwise, brighter the larger the move.
pub fn tile_color(change_percent: f64) -> Color {
    let intensity = (100.0 + change_percent.abs() * 10.0).min(255.0) as u8;
    if change_percent > 0.0 {
        Color::Rgb(0, intensity, 0)
    } else {
        Color::Rgb(intensity, 0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stock(symbol: &str) -> Stock {
        Stock {
            symbol: symbol.to_string(),
            name: String::new(),
            price: 10.0,
            change: 0.0,
            change_percent: 0.0,
            open: 10.0,
            high: 10.0,
            low: 10.0,
            volume: 0,
            market_cap: 0.0,
            pe: 0.0,
            dividend: 0.0,
            exchange: String::new(),
            timestamp: 0,
        }
    }

    #[test]
    fn colour_intensity_scales_and_saturates() {
        assert_eq!(tile_color(2.5), Color::Rgb(0, 125, 0));
        assert_eq!(tile_color(-3.0), Color::Rgb(130, 0, 0));
        assert_eq!(tile_color(0.0), Color::Rgb(100, 0, 0));
        assert_eq!(tile_color(40.0), Color::Rgb(0, 255, 0));
        assert_eq!(tile_color(-99.0), Color::Rgb(255, 0, 0));
    }

    #[test]
    fn retargeting_resets_selection() {
        let mut panel = HeatmapPanel::default();
        panel.set_watchlist("a");
        panel.set_tiles(vec![stock("AAPL"), stock("MSFT")]);
        panel.select_next();
        assert_eq!(panel.selected_symbol(), Some("MSFT"));

        panel.set_watchlist("a");
        assert_eq!(panel.selected, 1);
        panel.set_watchlist("b");
        assert_eq!(panel.selected, 0);
    }

    #[test]
    fn selection_wraps_and_clamps() {
        let mut panel = HeatmapPanel::default();
        panel.set_tiles(vec![stock("AAPL"), stock("MSFT"), stock("RY")]);
        panel.select_previous();
        assert_eq!(panel.selected_symbol(), Some("RY"));
        panel.set_tiles(vec![stock("AAPL")]);
        assert_eq!(panel.selected_symbol(), Some("AAPL"));
        panel.set_tiles(Vec::new());
        assert_eq!(panel.selected_symbol(), None);
    }

    #[test]
    fn scope_toggles() {
        let mut panel = HeatmapPanel::default();
        panel.toggle_scope();
        assert_eq!(panel.scope, HeatmapScope::Market);
        panel.toggle_scope();
        assert_eq!(panel.scope, HeatmapScope::Watchlist);
    }
}
