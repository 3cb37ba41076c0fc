//! Market data layer for the Moose Market dashboard.
//!
//! The crate wires together the building blocks the dashboard draws from:
//!
//! - `mock`: `MockMarket`, a random-walk quote and candle generator for the
//!   built-in ticker catalog.
//! - `alphavantage`: a blocking HTTP client for the Alpha Vantage quote API,
//!   enabled by the `ALPHAVANTAGE_API_KEY` environment variable.
//! - `source`: the `MarketDataSource` trait both of the above implement, and
//!   `MarketService`, which prefers the API and falls back to stored or mock data.
//! - `storage`: JSON files under a data directory, guarded by one `RwLock`.
//! - `refresh`: the periodic refresh loop.
//! - `worker`: a fetch thread so chart and search requests never block the UI.
//!
//! Threads talk over `crossbeam_channel`. Errors are surfaced as `MarketError`.
#![warn(missing_docs)]
pub mod alphavantage;
pub mod mock;
pub mod refresh;
pub mod source;
pub mod storage;
pub mod worker;

pub use alphavantage::AlphaVantageClient;
pub use mock::MockMarket;
pub use refresh::{RefreshEvent, Refresher};
pub use source::{ChartData, ChartSource, MarketDataSource, MarketService};
pub use storage::Storage;
pub use worker::{FetchRequest, FetchResponse, FetchWorker};
