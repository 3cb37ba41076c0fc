//! Command-line arguments for the dashboard.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use clap::Parser;
use moose_common::Timeframe;
use moose_data::storage::DEFAULT_DATA_DIR;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Directory holding profiles, quotes, candles and drawings.
    #[clap(long, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: String,

    /// Profile to open, by id or name. Defaults to the oldest profile.
    #[clap(long)]
    pub profile: Option<String>,

    /// Seconds between refreshes for this run, overriding the profile setting.
    #[clap(long)]
    pub refresh_secs: Option<u64>,

    /// Log file. Defaults to `moosemarket.log` inside the data directory.
    #[clap(long)]
    pub log_file: Option<String>,

    /// Text file with symbols to append to a watchlist before starting.
    /// Symbols may be separated by commas, spaces, or new lines.
    #[clap(long)]
    pub import: Option<String>,

    /// Watchlist receiving `--import`; created when missing.
    #[clap(long, requires = "import")]
    pub watchlist: Option<String>,

    /// Initial chart timeframe.
    #[clap(long, value_enum, default_value_t = Timeframe::Day1)]
    pub timeframe: Timeframe,

    /// Ignore ALPHAVANTAGE_API_KEY and use mock data only.
    #[clap(long)]
    pub offline: bool,
}
