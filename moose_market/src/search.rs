//! Search box with a debounced dropdown.

use std::time::{Duration, Instant};

use moose_common::model::SymbolMatch;

/// Quiet period after the last keystroke before a search is sent.
pub const DEBOUNCE: Duration = Duration::from_millis(300);
/// Shorter queries close the dropdown instead of searching.
pub const MIN_QUERY_LEN: usize = 2;
/// Rows shown in the dropdown.
pub const MAX_VISIBLE: usize = 5;

/// Outcome of pressing Enter in the search box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submit {
    /// A dropdown row was highlighted; chart it.
    Select(String),
    /// Nothing highlighted; search the text right away.
    Search(String),
    /// Empty box.
    Nothing,
}

/// Search box text, dropdown results and debounce state.
#[derive(Debug, Default)]
pub struct SearchBox {
    /// Typed text.
    pub text: String,
    /// Results of the latest search.
    pub results: Vec<SymbolMatch>,
    /// Highlighted dropdown row.
    pub selected: Option<usize>,
    /// Dropdown shown.
    pub open: bool,
    pending_since: Option<Instant>,
    awaiting: Option<u64>,
}

impl SearchBox {
    /// Type `c` at `now`.
    pub fn push(&mut self, c: char, now: Instant) {
        self.text.push(c);
        self.edited(now);
    }

    /// Delete the last character at `now`.
    pub fn backspace(&mut self, now: Instant) {
        self.text.pop();
        self.edited(now);
    }

    fn edited(&mut self, now: Instant) {
        if self.text.trim().chars().count() < MIN_QUERY_LEN {
            self.pending_since = None;
            self.awaiting = None;
            self.close();
        } else {
            self.pending_since = Some(now);
        }
    }

    /// The query to send once the debounce period has passed since the last edit.
    pub fn due(&mut self, now: Instant) -> Option<String> {
        let since = self.pending_since?;
        if now.duration_since(since) < DEBOUNCE {
            return None;
        }
        self.pending_since = None;
        Some(self.text.trim().to_string())
    }

    /// Remember the sequence number of the search in flight.
    pub fn awaiting(&mut self, seq: u64) {
        self.awaiting = Some(seq);
    }

    /// Apply results if they answer the latest search. Returns whether they did.
    pub fn apply_results(&mut self, seq: u64, results: Vec<SymbolMatch>) -> bool {
        if self.awaiting != Some(seq) {
            return false;
        }
        self.awaiting = None;
        self.results = results;
        self.selected = None;
        self.open = !self.results.is_empty();
        true
    }

    /// Dropdown rows, at most [`MAX_VISIBLE`].
    pub fn visible(&self) -> &[SymbolMatch] {
        let n = self.results.len().min(MAX_VISIBLE);
        &self.results[..n]
    }

    /// Highlight the next row, wrapping around.
    pub fn select_next(&mut self) {
        let n = self.visible().len();
        if !self.open || n == 0 {
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) => (i + 1) % n,
            None => 0,
        });
    }

    /// Highlight the previous row, wrapping around.
    pub fn select_previous(&mut self) {
        let n = self.visible().len();
        if !self.open || n == 0 {
            return;
        }
        self.selected = Some(match self.selected {
            Some(0) | None => n - 1,
            Some(i) => i - 1,
        });
    }

    /// Enter: the highlighted symbol clears the box, otherwise the text is searched.
    pub fn submit(&mut self) -> Submit {
        if self.open {
            if let Some(hit) = self.selected.and_then(|i| self.visible().get(i)) {
                let symbol = hit.symbol.clone();
                self.clear();
                return Submit::Select(symbol);
            }
        }
        let query = self.text.trim();
        if query.is_empty() {
            return Submit::Nothing;
        }
        self.pending_since = None;
        Submit::Search(query.to_string())
    }

    /// Hide the dropdown and drop its results.
    pub fn close(&mut self) {
        self.open = false;
        self.selected = None;
        self.results.clear();
    }

    /// Empty the box and forget any pending search.
    pub fn clear(&mut self) {
        self.text.clear();
        self.pending_since = None;
        self.awaiting = None;
        self.close();
    }
}
