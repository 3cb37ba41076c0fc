//! Serializable data records.
//!
//! - `profile`: profiles with their accounts, watchlists and settings.
//! - `stock`: quote snapshots and OHLCV candle series.
//! - `drawing`: chart annotations stored per symbol.

pub mod drawing;
pub mod profile;
pub mod stock;

pub use drawing::{DrawingObject, Point};
pub use profile::{Account, Position, Profile, Settings, Transaction, Watchlist};
pub use stock::{CandleData, CandleStick, Stock, SymbolMatch};
