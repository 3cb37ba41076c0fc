//! Runtime configuration resolved from CLI arguments and the environment.

use std::path::PathBuf;
use std::time::Duration;

use moose_common::Timeframe;
use moose_data::alphavantage::API_KEY_ENV;

use crate::args::Args;

const LOG_FILE_NAME: &str = "moosemarket.log";

/// Everything `main` needs to start the dashboard.
#[derive(Debug, Clone)]
pub struct Config {
    /// Storage root.
    pub data_dir: PathBuf,
    /// Profile id or name to open.
    pub profile: Option<String>,
    /// Refresh interval pinned for this run.
    pub refresh_override: Option<Duration>,
    /// Log destination.
    pub log_file: PathBuf,
    /// Symbol file to import at startup.
    pub import: Option<PathBuf>,
    /// Watchlist receiving the import.
    pub import_watchlist: Option<String>,
    /// Initial chart timeframe.
    pub timeframe: Timeframe,
    /// Alpha Vantage key, unless offline.
    pub api_key: Option<String>,
}

impl Config {
    /// Resolve arguments; the API key is read from the environment unless `--offline`.
    pub fn from_args(args: Args) -> Self {
        let api_key = if args.offline {
            None
        } else {
            std::env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty())
        };
        Self::resolve(args, api_key)
    }

    fn resolve(args: Args, api_key: Option<String>) -> Self {
        let data_dir = normalize_path(&args.data_dir);
        let log_file = args
            .log_file
            .as_deref()
            .map(normalize_path)
            .unwrap_or_else(|| data_dir.join(LOG_FILE_NAME));

        Config {
            profile: args.profile.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()),
            refresh_override: args.refresh_secs.map(|s| Duration::from_secs(s.max(1))),
            log_file,
            import: args.import.as_deref().map(normalize_path),
            import_watchlist: args.watchlist,
            timeframe: args.timeframe,
            api_key,
            data_dir,
        }
    }
}

/// Normalize a CLI-provided path string by trimming whitespace and matching quotes.
///
/// This allows passing Windows paths in quotes without breaking parsing.
fn normalize_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let no_quotes = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    PathBuf::from(no_quotes)
}
