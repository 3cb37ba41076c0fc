//! Watchlist panel state: the active tab and the selected row.
//!
//! Rows follow the watchlist's symbol list, so a symbol without a quote still
//! gets a row and can be removed.

use moose_common::model::{Profile, Stock, Watchlist};

/// One watchlist row.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchlistRow {
    /// Symbol as stored in the watchlist.
    pub symbol: String,
    /// Latest quote, `None` when no source could price the symbol.
    pub quote: Option<Stock>,
}

/// Tab and row selection of the watchlist panel.
#[derive(Debug, Default)]
pub struct WatchlistPanel {
    /// Index of the shown watchlist in the profile.
    pub tab: usize,
    /// Selected row.
    pub selected: usize,
    /// Rows of the shown watchlist, in symbol order.
    pub items: Vec<WatchlistRow>,
}

impl WatchlistPanel {
    /// Opens on the profile's default watchlist.
    pub fn for_profile(profile: &Profile) -> Self {
        let tab = profile
            .default_watchlist()
            .and_then(|w| profile.watchlists.iter().position(|x| x.id == w.id))
            .unwrap_or(0);
        WatchlistPanel {
            tab,
            ..Default::default()
        }
    }

    /// Watchlist shown in the current tab.
    pub fn current<'a>(&self, profile: &'a Profile) -> Option<&'a Watchlist> {
        profile.watchlists.get(self.tab)
    }

    /// Keep the tab index valid after the profile's watchlists changed.
    pub fn sync(&mut self, profile: &Profile) {
        if self.tab >= profile.watchlists.len() {
            self.tab = profile.watchlists.len().saturating_sub(1);
        }
    }

    /// Select the tab of watchlist `id`. Returns whether it exists.
    pub fn show(&mut self, profile: &Profile, id: &str) -> bool {
        match profile.watchlists.iter().position(|w| w.id == id) {
            Some(tab) => {
                if tab != self.tab {
                    self.tab = tab;
                    self.selected = 0;
                }
                true
            }
            None => false,
        }
    }

    /// Move to the next tab, wrapping around.
    pub fn next_tab(&mut self, profile: &Profile) {
        let n = profile.watchlists.len();
        if n > 0 {
            self.tab = (self.tab + 1) % n;
            self.selected = 0;
        }
    }

    /// Move to the previous tab, wrapping around.
    pub fn previous_tab(&mut self, profile: &Profile) {
        let n = profile.watchlists.len();
        if n > 0 {
            self.tab = (self.tab + n - 1) % n;
            self.selected = 0;
        }
    }

    /// Rebuild the rows from `symbols`, pairing each with its quote in `quotes`.
    pub fn set_items(&mut self, symbols: &[String], quotes: &[Stock]) {
        self.items = symbols
            .iter()
            .map(|symbol| WatchlistRow {
                symbol: symbol.clone(),
                quote: quotes.iter().find(|q| q.symbol == *symbol).cloned(),
            })
            .collect();
        if self.selected >= self.items.len() {
            self.selected = self.items.len().saturating_sub(1);
        }
    }

    /// Select the row below, stopping at the last one.
    pub fn select_next(&mut self) {
        if self.selected + 1 < self.items.len() {
            self.selected += 1;
        }
    }

    /// Select the row above, stopping at the first one.
    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Symbol of the selected row.
    pub fn selected_symbol(&self) -> Option<&str> {
        self.items.get(self.selected).map(|r| r.symbol.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn profile() -> Profile {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let mut profile = Profile::new("profile_1", "Test", now);
        let tech = profile.add_watchlist("Tech", now);
        profile.watchlist_mut(&tech).unwrap().add_symbol("AAPL");
        profile.add_watchlist("Banks", now);
        profile
    }

    #[test]
    fn opens_on_default_watchlist() {
        let mut profile = profile();
        profile.settings.default_watchlist_id = profile.watchlists[1].id.clone();
        let panel = WatchlistPanel::for_profile(&profile);
        assert_eq!(panel.tab, 1);
        assert_eq!(panel.current(&profile).unwrap().name, "Tech");
    }

    #[test]
    fn tabs_wrap() {
        let profile = profile();
        let mut panel = WatchlistPanel::for_profile(&profile);
        panel.previous_tab(&profile);
        assert_eq!(panel.current(&profile).unwrap().name, "Banks");
        panel.next_tab(&profile);
        assert_eq!(panel.current(&profile).unwrap().name, "Default");
    }

    #[test]
    fn show_and_sync_keep_tab_valid() {
        let mut profile = profile();
        let mut panel = WatchlistPanel::for_profile(&profile);
        let banks = profile.watchlists[2].id.clone();
        assert!(panel.show(&profile, &banks));
        assert!(!panel.show(&profile, "missing"));
        assert_eq!(panel.tab, 2);

        profile.watchlists.truncate(1);
        panel.sync(&profile);
        assert_eq!(panel.tab, 0);
    }

    #[test]
    fn unquoted_symbols_keep_their_row() {
        let mut panel = WatchlistPanel::default();
        let symbols = vec!["SHOP".to_string(), "AAPL".to_string()];
        let quote = moose_data::MockMarket::new().stock("AAPL").unwrap();
        panel.set_items(&symbols, &[quote.clone()]);

        assert_eq!(panel.items.len(), 2);
        assert_eq!(panel.items[0].quote, None);
        assert_eq!(panel.items[1].quote, Some(quote));
        assert_eq!(panel.selected_symbol(), Some("SHOP"));

        panel.select_next();
        panel.set_items(&symbols[..1], &[]);
        assert_eq!(panel.selected_symbol(), Some("SHOP"));
    }
}
