//! Moose Market: a terminal stock dashboard with a symbol search, a candlestick
//! chart, per-profile watchlists and a heatmap of daily moves.
//!
//! Quotes come from the built-in mock market. When `ALPHAVANTAGE_API_KEY` is set,
//! charts and wider searches go to Alpha Vantage first and fall back to stored or
//! mock data. Profiles, quotes, candles and drawings are kept as JSON files under
//! the data directory.
//!
//! Usage example (CLI):
//! ```bash
//! moose_market --data-dir ./moosemarket_data --refresh-secs 30
//! moose_market --import ./banks.txt --watchlist Banks
//! ```
//!
//! The import file should contain symbols separated by commas, spaces, or new lines.
//! Logs go to `<data-dir>/moosemarket.log` unless `--log-file` says otherwise; set
//! `RUST_LOG=debug` for per-request detail.
#![warn(missing_docs)]
mod app;
mod args;
mod chart;
mod config;
mod heatmap;
mod search;
mod theme;
mod ui;
mod watchlist;

use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{info, warn};
use moose_common::{MarketError, Result};
use moose_data::{AlphaVantageClient, MarketService, MockMarket, Storage};
use ratatui::prelude::*;

use crate::app::App;
use crate::args::Args;
use crate::config::Config;

/// How long to wait for a key before checking background work.
const POLL_TIMEOUT: Duration = Duration::from_millis(100);

fn main() -> Result<(), MarketError> {
    let args = Args::parse();
    let config = Config::from_args(args);
    init_logger(&config.log_file)?;
    info!("Moose Market starting, data directory {}", config.data_dir.display());

    let storage = Arc::new(Storage::new(&config.data_dir));
    let mut service = MarketService::new(Arc::new(MockMarket::new()), storage);
    match config.api_key.as_deref() {
        Some(key) => match AlphaVantageClient::new(key) {
            Ok(client) => service = service.with_primary(Box::new(client)),
            Err(e) => warn!("Alpha Vantage disabled: {}", e),
        },
        None => info!("No API key, running on mock data"),
    }

    let mut app = App::new(&config, Arc::new(service))?;

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("Moose Market stopped");
    result
}

/// Draw, read one key if any, then apply background results until quit.
fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        if event::poll(POLL_TIMEOUT)? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }
        app.poll_background(Instant::now());

        if app.should_quit {
            info!("Quit requested");
            return Ok(());
        }
    }
}

/// Log to `path`; the terminal belongs to the dashboard.
fn init_logger(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}
