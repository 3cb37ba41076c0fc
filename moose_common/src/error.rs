//! Error types shared between the data layer and the dashboard.
//!
//! The `MarketError` enum unifies common failure cases for file storage, JSON,
//! HTTP calls to the quote API, channel communication and lookups, allowing
//! crates to propagate a single error type.
use std::io;
use std::sync::PoisonError;

use thiserror::Error;

/// Unified error type shared by every crate in the workspace.
#[derive(Error, Debug)]
pub enum MarketError {
    /// I/O error originating from the standard library, files or the terminal.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic formatting/validation error with a human-readable message.
    #[error("Format error: {0}")]
    Format(String),

    /// Error while parsing a symbol list file.
    #[error("Parse symbols file error: {0}")]
    ParseSymbolsFile(String),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// Transport-level failure talking to the quote API.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The quote API answered, but with an error body or an unexpected shape.
    #[error("Quote API error: {0}")]
    Api(String),

    /// The quote API key environment variable is not set.
    #[error("API key not set, please set the {0} environment variable")]
    MissingApiKey(&'static str),

    /// Channel send failed (e.g., receiver dropped); contains a short context string.
    #[error("Channel send failed: {0}")]
    ChannelSend(String),

    /// Channel receive failed (e.g., sender closed); contains a short context string.
    #[error("Channel receive failed: {0}")]
    ChannelRecv(String),

    /// Error indicating a poisoned mutex/lock was encountered.
    #[error("Mutex Lock Poisoned: {0}")]
    MutexLock(String),

    /// The requested symbol is not known to the data source.
    #[error("Symbol {0} not found")]
    SymbolNotFound(String),

    /// No profile with this id exists on disk.
    #[error("Profile {0} not found")]
    ProfileNotFound(String),

    /// No watchlist with this id exists in the active profile.
    #[error("Watchlist {0} not found")]
    WatchlistNotFound(String),

    /// No stored candles exist for the symbol/timeframe pair.
    #[error("Candle data not found for {symbol} ({timeframe})")]
    CandlesNotFound {
        /// Requested symbol.
        symbol: String,
        /// Requested timeframe label.
        timeframe: String,
    },
}

impl<T> From<PoisonError<T>> for MarketError {
    fn from(err: PoisonError<T>) -> Self {
        MarketError::MutexLock(err.to_string())
    }
}
