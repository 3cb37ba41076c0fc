//! Dashboard state and key handling.
//!
//! `App` owns the panels, the fetch worker and the refresh loop. Every profile
//! change goes through `Storage::update_active_profile`, and the returned copy
//! replaces `App::profile`, so the watchlist and heatmap always render what is
//! on disk.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{debug, error, info, warn};
use moose_common::model::{DrawingObject, Profile, Stock};
use moose_common::symbols::{SymbolParser, Symbols};
use moose_common::{MarketError, Result};
use moose_data::{FetchResponse, FetchWorker, MarketService, RefreshEvent, Refresher, Storage};

use crate::chart::ChartPanel;
use crate::config::Config;
use crate::heatmap::{HeatmapPanel, HeatmapScope};
use crate::search::{SearchBox, Submit};
use crate::theme::Palette;
use crate::watchlist::WatchlistPanel;

/// Name of the profile created when none exist.
pub const DEFAULT_PROFILE_NAME: &str = "Default Profile";

/// Panel receiving navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// Chart panel: Left/Right change the timeframe.
    Chart,
    /// Watchlist panel: tabs and rows.
    #[default]
    Watchlist,
    /// Heatmap panel: tile selection.
    Heatmap,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Chart => Focus::Watchlist,
            Focus::Watchlist => Focus::Heatmap,
            Focus::Heatmap => Focus::Chart,
        }
    }

    fn previous(self) -> Self {
        match self {
            Focus::Chart => Focus::Heatmap,
            Focus::Watchlist => Focus::Chart,
            Focus::Heatmap => Focus::Watchlist,
        }
    }
}

/// What the keyboard is currently driving.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    /// Panel navigation and shortcuts.
    #[default]
    Normal,
    /// Typing into the search box.
    Search,
    /// Naming a new watchlist.
    NewWatchlist(String),
    /// Profile manager with the highlighted row.
    Profiles {
        /// Highlighted profile.
        selected: usize,
    },
    /// Naming a new profile.
    NewProfile(String),
    /// Waiting for y/n before deleting a profile.
    ConfirmDelete {
        /// Profile id.
        id: String,
        /// Profile name, for the prompt.
        name: String,
    },
    /// Error message shown until any key.
    Notice(String),
}

enum Input {
    Editing,
    Submit,
    Cancel,
}

/// Dashboard state: panels, active profile and background threads.
pub struct App {
    service: Arc<MarketService>,
    storage: Arc<Storage>,
    worker: FetchWorker,
    refresher: Refresher,
    pinned_interval: bool,
    /// Active profile, as last saved.
    pub profile: Profile,
    /// Profiles listed by the profile manager.
    pub profiles: Vec<Profile>,
    /// Market snapshot for the heatmap's market scope.
    pub market: Vec<Stock>,
    /// Header search box.
    pub search: SearchBox,
    /// Chart panel.
    pub chart: ChartPanel,
    /// Watchlist panel.
    pub watchlist: WatchlistPanel,
    /// Heatmap panel.
    pub heatmap: HeatmapPanel,
    /// Panel receiving navigation keys.
    pub focus: Focus,
    /// Keyboard mode.
    pub mode: Mode,
    /// Colours of the active theme.
    pub palette: Palette,
    /// Time of the last refresh tick or manual refresh.
    pub last_refresh: DateTime<Utc>,
    /// Set by `q` or Ctrl+C.
    pub should_quit: bool,
}

impl App {
    /// Open storage, pick the profile, load the market snapshot and start the
    /// background threads.
    pub fn new(config: &Config, service: Arc<MarketService>) -> Result<Self> {
        let storage = Arc::clone(service.storage());
        storage.initialize()?;

        let mut profile = pick_profile(&storage, config.profile.as_deref())?;
        if profile.ensure_watchlist(Utc::now()) {
            warn!("Profile {} had no watchlists, created the default one", profile.id);
            storage.save_profile(&profile)?;
        }
        storage.set_active_profile(profile.clone())?;

        if let Some(path) = config.import.as_deref() {
            let (updated, added) = import_symbols(&storage, path, config.import_watchlist.as_deref())?;
            info!("Imported {} symbols from {}", added, path.display());
            profile = updated;
        }

        let market = service.load_or_refresh_market()?;
        let interval = config
            .refresh_override
            .unwrap_or_else(|| profile.settings.refresh_every());

        let mut app = App {
            worker: FetchWorker::start(Arc::clone(&service)),
            refresher: Refresher::start(interval),
            pinned_interval: config.refresh_override.is_some(),
            watchlist: WatchlistPanel::for_profile(&profile),
            palette: Palette::for_mode(profile.settings.dark_mode),
            heatmap: HeatmapPanel::default(),
            chart: ChartPanel::new(config.timeframe),
            search: SearchBox::default(),
            profiles: Vec::new(),
            focus: Focus::default(),
            mode: Mode::default(),
            last_refresh: Utc::now(),
            should_quit: false,
            service,
            storage,
            profile,
            market,
        };
        app.reload_views();
        Ok(app)
    }

    /// Name shown for the data source in the header.
    pub fn source_name(&self) -> &'static str {
        self.service.primary_name().unwrap_or("Mock data")
    }

    /// Drain worker responses and refresh ticks, then send a due search.
    pub fn poll_background(&mut self, now: Instant) {
        let responses: Vec<FetchResponse> = self.worker.responses().try_iter().collect();
        for response in responses {
            self.apply_response(response);
        }

        let ticks = self
            .refresher
            .events()
            .try_iter()
            .filter(|e| *e == RefreshEvent::Tick)
            .count();
        if ticks > 0 {
            self.on_tick();
        }

        if let Some(query) = self.search.due(now) {
            self.send_search(&query);
        }
    }

    fn apply_response(&mut self, response: FetchResponse) {
        match response {
            FetchResponse::Search { seq, results } => {
                if !self.search.apply_results(seq, results) {
                    debug!("Dropping stale search response #{}", seq);
                }
            }
            FetchResponse::Chart { seq, symbol, result } => {
                if let Err(e) = &result {
                    if self.chart.is_current(seq) {
                        error!("Chart load failed for {}: {}", symbol, e);
                    }
                }
                if !self.chart.apply(seq, result) {
                    debug!("Dropping stale chart response #{} for {}", seq, symbol);
                }
            }
        }
    }

    fn on_tick(&mut self) {
        debug!("Refresh tick");
        self.reload_views();
        self.last_refresh = Utc::now();
    }

    /// Re-read quotes for the watchlist tab and the heatmap.
    fn reload_views(&mut self) {
        self.watchlist.sync(&self.profile);
        let (id, symbols) = match self.watchlist.current(&self.profile) {
            Some(w) => (w.id.clone(), w.symbols.clone()),
            None => (String::new(), Vec::new()),
        };
        let stocks = self.service.stocks(&symbols);

        self.watchlist.set_items(&symbols, &stocks);
        self.heatmap.set_watchlist(&id);
        let tiles = match self.heatmap.scope {
            HeatmapScope::Watchlist => stocks,
            HeatmapScope::Market => self.market.clone(),
        };
        self.heatmap.set_tiles(tiles);
    }

    /// Apply one key press to the current mode. Ctrl+C always quits.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        let mode = std::mem::take(&mut self.mode);
        self.mode = match mode {
            Mode::Normal => self.on_normal_key(key),
            Mode::Search => self.on_search_key(key),
            Mode::NewWatchlist(text) => self.on_new_watchlist_key(key, text),
            Mode::Profiles { selected } => self.on_profiles_key(key, selected),
            Mode::NewProfile(text) => self.on_new_profile_key(key, text),
            Mode::ConfirmDelete { id, name } => self.on_confirm_delete_key(key, id, name),
            Mode::Notice(_) => Mode::Normal,
        };
    }

    fn on_normal_key(&mut self, key: KeyEvent) -> Mode {
        let outcome = match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                Ok(())
            }
            KeyCode::Char('/') => return Mode::Search,
            KeyCode::Char('p') => return self.open_profiles(),
            KeyCode::Char('n') => return Mode::NewWatchlist(String::new()),
            KeyCode::Tab => {
                self.focus = self.focus.next();
                Ok(())
            }
            KeyCode::BackTab => {
                self.focus = self.focus.previous();
                Ok(())
            }
            KeyCode::Char('T') => self.toggle_theme(),
            KeyCode::Char('r') => self.refresh_market(),
            KeyCode::Char('m') => {
                self.heatmap.toggle_scope();
                self.reload_views();
                Ok(())
            }
            KeyCode::Char('a') => self.add_chart_symbol(),
            KeyCode::Char('d') => self.add_level(),
            KeyCode::Char('D') => self.clear_levels(),
            _ => match self.focus {
                Focus::Chart => self.on_chart_key(key),
                Focus::Watchlist => self.on_watchlist_key(key),
                Focus::Heatmap => self.on_heatmap_key(key),
            },
        };
        self.settle(outcome, Mode::Normal)
    }

    fn on_chart_key(&mut self, key: KeyEvent) -> Result<()> {
        let timeframe = match key.code {
            KeyCode::Left => self.chart.timeframe.previous(),
            KeyCode::Right => self.chart.timeframe.next(),
            _ => return Ok(()),
        };
        self.chart.timeframe = timeframe;
        match self.chart.symbol.clone() {
            Some(symbol) => self.load_chart(&symbol),
            None => Ok(()),
        }
    }

    fn on_watchlist_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Left => {
                self.watchlist.previous_tab(&self.profile);
                self.reload_views();
            }
            KeyCode::Right => {
                self.watchlist.next_tab(&self.profile);
                self.reload_views();
            }
            KeyCode::Up => self.watchlist.select_previous(),
            KeyCode::Down => self.watchlist.select_next(),
            KeyCode::Enter => {
                if let Some(symbol) = self.watchlist.selected_symbol().map(str::to_string) {
                    self.load_chart(&symbol)?;
                }
            }
            KeyCode::Char('x') => self.remove_selected_symbol()?,
            _ => {}
        }
        Ok(())
    }

    fn on_heatmap_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Left | KeyCode::Up => self.heatmap.select_previous(),
            KeyCode::Right | KeyCode::Down => self.heatmap.select_next(),
            KeyCode::Enter => {
                if let Some(symbol) = self.heatmap.selected_symbol().map(str::to_string) {
                    self.load_chart(&symbol)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn on_search_key(&mut self, key: KeyEvent) -> Mode {
        let now = Instant::now();
        match key.code {
            KeyCode::Esc => {
                self.search.close();
                Mode::Normal
            }
            KeyCode::Up => {
                self.search.select_previous();
                Mode::Search
            }
            KeyCode::Down => {
                self.search.select_next();
                Mode::Search
            }
            KeyCode::Backspace => {
                self.search.backspace(now);
                Mode::Search
            }
            KeyCode::Char(c) => {
                self.search.push(c, now);
                Mode::Search
            }
            KeyCode::Enter => match self.search.submit() {
                Submit::Select(symbol) => {
                    let outcome = self.load_chart(&symbol);
                    self.settle(outcome, Mode::Normal)
                }
                Submit::Search(query) => {
                    self.send_search(&query);
                    Mode::Search
                }
                Submit::Nothing => Mode::Search,
            },
            _ => Mode::Search,
        }
    }

    fn on_new_watchlist_key(&mut self, key: KeyEvent, mut text: String) -> Mode {
        match edit_text(&mut text, key) {
            Input::Editing => Mode::NewWatchlist(text),
            Input::Cancel => Mode::Normal,
            Input::Submit => {
                let outcome = self.create_watchlist(&text);
                self.settle(outcome, Mode::Normal)
            }
        }
    }

    fn on_profiles_key(&mut self, key: KeyEvent, selected: usize) -> Mode {
        let count = self.profiles.len();
        match key.code {
            KeyCode::Esc | KeyCode::Char('p') | KeyCode::Char('q') => Mode::Normal,
            KeyCode::Up => Mode::Profiles {
                selected: selected.saturating_sub(1),
            },
            KeyCode::Down => Mode::Profiles {
                selected: (selected + 1).min(count.saturating_sub(1)),
            },
            KeyCode::Char('n') => Mode::NewProfile(String::new()),
            KeyCode::Char('x') => match self.profiles.get(selected) {
                Some(p) => Mode::ConfirmDelete {
                    id: p.id.clone(),
                    name: p.name.clone(),
                },
                None => Mode::Profiles { selected },
            },
            KeyCode::Enter => match self.profiles.get(selected).map(|p| p.id.clone()) {
                Some(id) => {
                    let outcome = self.switch_profile(&id);
                    self.settle(outcome, Mode::Normal)
                }
                None => Mode::Profiles { selected },
            },
            _ => Mode::Profiles { selected },
        }
    }

    fn on_new_profile_key(&mut self, key: KeyEvent, mut text: String) -> Mode {
        match edit_text(&mut text, key) {
            Input::Editing => Mode::NewProfile(text),
            Input::Cancel => self.open_profiles(),
            Input::Submit => match self.create_profile(&text) {
                Ok(mode) => mode,
                Err(e) => self.fail("Could not create profile", e),
            },
        }
    }

    fn on_confirm_delete_key(&mut self, key: KeyEvent, id: String, name: String) -> Mode {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                let outcome = self.delete_profile(&id);
                match outcome {
                    Ok(()) => self.open_profiles(),
                    Err(e) => self.fail("Could not delete profile", e),
                }
            }
            KeyCode::Char('n') | KeyCode::Esc => self.open_profiles(),
            _ => Mode::ConfirmDelete { id, name },
        }
    }

    /// Log a failure and show it in the notice popup.
    fn fail(&self, context: &str, e: MarketError) -> Mode {
        error!("{}: {}", context, e);
        Mode::Notice(format!("{}: {}", context, e))
    }

    fn settle(&self, outcome: Result<()>, next: Mode) -> Mode {
        match outcome {
            Ok(()) => next,
            Err(e) => self.fail("Action failed", e),
        }
    }

    fn send_search(&mut self, query: &str) {
        match self.worker.search(query) {
            Ok(seq) => self.search.awaiting(seq),
            Err(e) => error!("Search for {:?} not sent: {}", query, e),
        }
    }

    /// Ask the worker for `symbol` at the chart's timeframe and load its drawings.
    pub fn load_chart(&mut self, symbol: &str) -> Result<()> {
        let seq = self.worker.chart(symbol, self.chart.timeframe)?;
        self.chart.requested(symbol, seq);
        self.chart.drawings = self.storage.load_drawings(symbol)?;
        info!("Loading chart {} {}", symbol, self.chart.timeframe);
        Ok(())
    }

    fn current_watchlist_id(&self) -> Result<String> {
        self.watchlist
            .current(&self.profile)
            .map(|w| w.id.clone())
            .ok_or_else(|| MarketError::WatchlistNotFound(format!("tab {}", self.watchlist.tab)))
    }

    fn add_chart_symbol(&mut self) -> Result<()> {
        let Some(symbol) = self.chart.symbol.clone() else {
            return Ok(());
        };
        let id = self.current_watchlist_id()?;
        let (profile, added) = self
            .storage
            .update_active_profile(|p| p.watchlist_mut(&id).map(|w| w.add_symbol(&symbol)))?;
        self.profile = profile;
        match added {
            Some(true) => info!("Added {} to watchlist {}", symbol, id),
            Some(false) => debug!("{} already in watchlist {}", symbol, id),
            None => return Err(MarketError::WatchlistNotFound(id)),
        }
        self.reload_views();
        Ok(())
    }

    fn remove_selected_symbol(&mut self) -> Result<()> {
        let Some(symbol) = self.watchlist.selected_symbol().map(str::to_string) else {
            return Ok(());
        };
        let id = self.current_watchlist_id()?;
        let (profile, removed) = self
            .storage
            .update_active_profile(|p| p.watchlist_mut(&id).map(|w| w.remove_symbol(&symbol)))?;
        self.profile = profile;
        if removed.is_none() {
            return Err(MarketError::WatchlistNotFound(id));
        }
        info!("Removed {} from watchlist {}", symbol, id);
        self.reload_views();
        Ok(())
    }

    fn create_watchlist(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(());
        }
        let (profile, id) = self
            .storage
            .update_active_profile(|p| p.add_watchlist(name, Utc::now()))?;
        self.profile = profile;
        self.watchlist.show(&self.profile, &id);
        info!("Created watchlist {} ({})", name, id);
        self.reload_views();
        Ok(())
    }

    fn toggle_theme(&mut self) -> Result<()> {
        let (profile, dark) = self.storage.update_active_profile(|p| {
            p.settings.dark_mode = !p.settings.dark_mode;
            p.settings.dark_mode
        })?;
        self.profile = profile;
        self.palette = Palette::for_mode(dark);
        Ok(())
    }

    fn refresh_market(&mut self) -> Result<()> {
        self.market = self.service.refresh_market()?;
        self.reload_views();
        self.last_refresh = Utc::now();
        Ok(())
    }

    fn add_level(&mut self) -> Result<()> {
        let (Some(symbol), Some(close)) = (self.chart.symbol.clone(), self.chart.last_close()) else {
            return Ok(());
        };
        self.chart
            .drawings
            .push(DrawingObject::horizontal_line(&symbol, close, Utc::now()));
        self.storage.save_drawings(&symbol, &self.chart.drawings)
    }

    fn clear_levels(&mut self) -> Result<()> {
        let Some(symbol) = self.chart.symbol.clone() else {
            return Ok(());
        };
        self.chart.drawings.clear();
        self.storage.save_drawings(&symbol, &[])
    }

    fn open_profiles(&mut self) -> Mode {
        match self.storage.profiles() {
            Ok(profiles) => {
                let selected = profiles
                    .iter()
                    .position(|p| p.id == self.profile.id)
                    .unwrap_or(0);
                self.profiles = profiles;
                Mode::Profiles { selected }
            }
            Err(e) => self.fail("Could not list profiles", e),
        }
    }

    fn switch_profile(&mut self, id: &str) -> Result<()> {
        let profile = self.storage.profile(id)?;
        self.activate(profile)
    }

    fn activate(&mut self, mut profile: Profile) -> Result<()> {
        if profile.ensure_watchlist(Utc::now()) {
            self.storage.save_profile(&profile)?;
        }
        self.storage.set_active_profile(profile.clone())?;
        if !self.pinned_interval {
            self.refresher.set_interval(profile.settings.refresh_every())?;
        }
        self.watchlist = WatchlistPanel::for_profile(&profile);
        self.palette = Palette::for_mode(profile.settings.dark_mode);
        self.profile = profile;
        self.reload_views();
        Ok(())
    }

    fn create_profile(&mut self, name: &str) -> Result<Mode> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(self.open_profiles());
        }
        let created = self.storage.create_profile(name)?;
        self.profiles = self.storage.profiles()?;
        let selected = self
            .profiles
            .iter()
            .position(|p| p.id == created.id)
            .unwrap_or(0);
        Ok(Mode::Profiles { selected })
    }

    /// Delete a profile; removing the active one activates the first
    /// remaining profile, or a fresh default one.
    fn delete_profile(&mut self, id: &str) -> Result<()> {
        self.storage.delete_profile(id)?;
        if id != self.profile.id {
            return Ok(());
        }
        let next = match self.storage.profiles()?.into_iter().next() {
            Some(p) => p,
            None => self.storage.create_profile(DEFAULT_PROFILE_NAME)?,
        };
        self.activate(next)
    }
}

/// The profile matching `wanted` by id or name, else the oldest one, else a
/// newly created default profile.
fn pick_profile(storage: &Storage, wanted: Option<&str>) -> Result<Profile> {
    let profiles = storage.profiles()?;
    if let Some(wanted) = wanted {
        return profiles
            .into_iter()
            .find(|p| p.id == wanted || p.name.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| MarketError::ProfileNotFound(wanted.to_string()));
    }
    match profiles.into_iter().next() {
        Some(profile) => Ok(profile),
        None => storage.create_profile(DEFAULT_PROFILE_NAME),
    }
}

/// Append the symbols listed in `path` to the active profile's watchlist
/// named `watchlist` (created when missing), or to its default watchlist.
fn import_symbols(storage: &Storage, path: &Path, watchlist: Option<&str>) -> Result<(Profile, usize)> {
    let file = File::open(path)?;
    let symbols = Symbols::parse_from_file(BufReader::new(file))?;
    let now = Utc::now();

    let (profile, added) = storage.update_active_profile(|p| {
        let id = match watchlist {
            Some(name) => {
                let existing = p.watchlist_by_name(name).map(|w| w.id.clone());
                existing.unwrap_or_else(|| p.add_watchlist(name, now))
            }
            None => p.default_watchlist().map(|w| w.id.clone()).unwrap_or_default(),
        };
        p.watchlist_mut(&id).map(|w| {
            let mut added = 0;
            for symbol in &symbols {
                if w.add_symbol(symbol) {
                    added += 1;
                }
            }
            added
        })
    })?;

    let added = added.ok_or_else(|| MarketError::WatchlistNotFound(watchlist.unwrap_or("default").to_string()))?;
    Ok((profile, added))
}

fn edit_text(text: &mut String, key: KeyEvent) -> Input {
    match key.code {
        KeyCode::Enter => Input::Submit,
        KeyCode::Esc => Input::Cancel,
        KeyCode::Backspace => {
            text.pop();
            Input::Editing
        }
        KeyCode::Char(c) => {
            text.push(c);
            Input::Editing
        }
        _ => Input::Editing,
    }
}
