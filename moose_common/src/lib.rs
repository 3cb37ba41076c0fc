//!
//! Common types and utilities shared by the market data layer and the dashboard.
//!
//! This crate aggregates:
//! - `error`: unified error type `MarketError` used across the workspace.
//! - `result`: handy `Result<T, MarketError>` alias.
//! - `tickers`: the mock ticker catalog with company names and exchanges.
//! - `timeframe`: chart timeframes and their bar intervals.
//! - `symbols`: parsing of symbol lists from text files.
//! - `model`: serializable profile, stock, candle and drawing records.
#![warn(missing_docs)]
pub mod error;
pub mod model;
pub mod result;
pub mod symbols;
pub mod tickers;
pub mod timeframe;

pub use error::MarketError;
pub use result::Result;
pub use timeframe::Timeframe;
