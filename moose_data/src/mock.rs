//! Mock market data generator.
//!
//! `MockMarket` synthesizes quotes and candle series for the fixed `Ticker`
//! catalog. Every ticker keeps a trading session: the first quote seeds a
//! random price, later quotes move it with a small random walk, so repeated
//! refreshes look like a market drifting rather than a new random number each
//! time.
//!
//! Design notes:
//! - Sessions live in a `Mutex<HashMap<Ticker, Session>>` so the generator can be
//!   shared behind an `Arc` by the UI thread and the fetch worker.
//! - Unknown symbols are rejected with `MarketError::SymbolNotFound`.
//! - Generated values hold `low <= min(open, close|price)` and
//!   `high >= max(open, close|price)`.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{Duration as ChronoDuration, Timelike, Utc};
use log::debug;
use moose_common::model::{CandleData, CandleStick, Stock, SymbolMatch};
use moose_common::tickers::Ticker;
use moose_common::{MarketError, Result, Timeframe};
use rand::Rng;
use strum::IntoEnumIterator;

/// Calculate the next synthetic price using a small random walk around `current_price`.
///
/// The change is sampled uniformly from `[-1%, +1%]` and the result is clamped to a
/// minimum positive value to avoid non-sensical zero/negative prices.
pub fn next_price(current_price: f64) -> f64 {
    let mut rng = rand::rng();
    let change: f64 = rng.random_range(-0.01..0.01);
    let new_price = current_price * (1.0 + change);
    new_price.max(0.01)
}

/// Session state of one ticker.
struct Session {
    open: f64,
    high: f64,
    low: f64,
    price: f64,
    shares_outstanding: f64,
    pe: f64,
    dividend: f64,
}

impl Session {
    fn open<R: Rng>(rng: &mut R) -> Self {
        let price = 100.0 + rng.random::<f64>() * 400.0;
        let change = (rng.random::<f64>() - 0.5) * 10.0;
        let open = (price - change).max(0.01);
        let high = open.max(price) * (1.0 + rng.random::<f64>() * 0.02);
        let low = open.min(price) * (1.0 - rng.random::<f64>() * 0.02);
        let dividend = if rng.random::<f64>() > 0.3 {
            price * 0.01 * rng.random::<f64>() * 3.0
        } else {
            0.0
        };

        Session {
            open,
            high,
            low,
            price,
            shares_outstanding: rng.random::<f64>() * 10_000_000_000.0,
            pe: 15.0 + rng.random::<f64>() * 25.0,
            dividend,
        }
    }

    fn advance(&mut self) {
        self.price = next_price(self.price);
        self.high = self.high.max(self.price);
        self.low = self.low.min(self.price);
    }
}

/// Random-walk market over the built-in ticker catalog.
#[derive(Default)]
pub struct MockMarket {
    sessions: Mutex<HashMap<Ticker, Session>>,
}

impl MockMarket {
    /// Create a market with no open sessions.
    pub fn new() -> Self {
        Self::default()
    }

    /// All catalog symbols, US listings first.
    pub fn all_symbols() -> Vec<String> {
        Ticker::iter().map(|t| t.to_string()).collect()
    }

    /// Case-insensitive substring search over symbols and company names.
    pub fn search(&self, query: &str) -> Vec<SymbolMatch> {
        let query = query.trim().to_uppercase();
        Ticker::iter()
            .filter(|t| {
                t.to_string().contains(&query) || t.company_name().to_uppercase().contains(&query)
            })
            .map(|t| SymbolMatch {
                symbol: t.to_string(),
                name: t.company_name().to_string(),
                exchange: t.exchange().to_string(),
            })
            .collect()
    }

    /// Current quote for `symbol`, advancing its session by one tick.
    pub fn stock(&self, symbol: &str) -> Result<Stock> {
        let ticker = lookup(symbol)?;
        let mut rng = rand::rng();
        let mut sessions = self.sessions.lock()?;
        let session = sessions
            .entry(ticker)
            .and_modify(Session::advance)
            .or_insert_with(|| Session::open(&mut rng));

        let change = session.price - session.open;
        Ok(Stock {
            symbol: ticker.to_string(),
            name: ticker.company_name().to_string(),
            price: session.price,
            change,
            change_percent: change / session.open * 100.0,
            open: session.open,
            high: session.high,
            low: session.low,
            volume: (rng.random::<f64>() * 10_000_000.0) as i64,
            market_cap: session.shares_outstanding * session.price,
            pe: session.pe,
            dividend: session.dividend,
            exchange: ticker.exchange().to_string(),
            timestamp: Utc::now().timestamp(),
        })
    }

    /// Quotes for the whole catalog.
    pub fn market_data(&self) -> Result<Vec<Stock>> {
        Self::all_symbols().iter().map(|s| self.stock(s)).collect()
    }

    /// `count` bars of `timeframe` ending now, seeded around the current price.
    pub fn candles(&self, symbol: &str, timeframe: Timeframe, count: usize) -> Result<CandleData> {
        let base_price = self.stock(symbol)?.price;
        let ticker = lookup(symbol)?;
        let mut rng = rand::rng();

        let interval = ChronoDuration::from_std(timeframe.interval())
            .map_err(|e| MarketError::Format(e.to_string()))?;
        let volatility = timeframe.volatility();
        let start = Utc::now() - interval * count as i32;

        let mut prev_close = base_price * (0.9 + rng.random::<f64>() * 0.2);
        let mut candles = Vec::with_capacity(count);

        for i in 0..count {
            let time = start + interval * i as i32;
            let open = prev_close * (1.0 + (rng.random::<f64>() - 0.5) * 0.01);
            let change = rng.random::<f64>() * 2.0 - 1.0;
            let close = open * (1.0 + change * volatility);
            let high = open.max(close) * (1.0 + rng.random::<f64>() * volatility);
            let low = open.min(close) * (1.0 - rng.random::<f64>() * volatility);

            let volume = if (9..=16).contains(&time.hour()) {
                (500_000.0 + rng.random::<f64>() * 4_500_000.0) as i64
            } else {
                (50_000.0 + rng.random::<f64>() * 450_000.0) as i64
            };

            candles.push(CandleStick {
                time,
                open,
                high,
                low,
                close,
                volume,
            });
            prev_close = close;
        }

        debug!("Generated {} {} candles for {}", candles.len(), timeframe, ticker);
        Ok(CandleData {
            symbol: ticker.to_string(),
            timeframe,
            candles,
        })
    }
}

fn lookup(symbol: &str) -> Result<Ticker> {
    Ticker::from_symbol(symbol).ok_or_else(|| MarketError::SymbolNotFound(symbol.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_stay_within_session_range() {
        let market = MockMarket::new();
        for _ in 0..200 {
            let stock = market.stock("AAPL").unwrap();
            assert!(stock.high >= stock.open && stock.high >= stock.price);
            assert!(stock.low <= stock.open && stock.low <= stock.price);
            assert!(stock.low > 0.0);
            assert!((0..10_000_000).contains(&stock.volume));
            assert!((15.0..40.0).contains(&stock.pe));
            let expected = (stock.price - stock.open) / stock.open * 100.0;
            assert!((stock.change_percent - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn first_quote_is_seeded_in_range() {
        let market = MockMarket::new();
        let stock = market.stock("ry").unwrap();
        assert_eq!(stock.symbol, "RY");
        assert_eq!(stock.exchange, "TSX");
        assert_eq!(stock.name, "Royal Bank of Canada");
        assert!((100.0..500.0).contains(&stock.price));
    }

    #[test]
    fn random_walk_moves_at_most_one_percent() {
        let market = MockMarket::new();
        let mut last = market.stock("MSFT").unwrap().price;
        for _ in 0..50 {
            let price = market.stock("MSFT").unwrap().price;
            assert!((price / last - 1.0).abs() <= 0.01 + 1e-12);
            last = price;
        }
    }

    #[test]
    fn unknown_symbol_is_rejected() {
        let market = MockMarket::new();
        assert!(matches!(market.stock("ZZZZ"), Err(MarketError::SymbolNotFound(s)) if s == "ZZZZ"));
        assert!(market.candles("ZZZZ", Timeframe::Day1, 10).is_err());
    }

    #[test]
    fn candles_respect_ohlc_bounds() {
        let market = MockMarket::new();
        for timeframe in Timeframe::ALL {
            let data = market.candles("TSLA", timeframe, 100).unwrap();
            assert_eq!(data.candles.len(), 100);
            assert_eq!(data.timeframe, timeframe);
            for c in &data.candles {
                assert!(c.high >= c.open && c.high >= c.close && c.high >= c.low);
                assert!(c.low <= c.open && c.low <= c.close);
                assert!(c.low > 0.0);
                assert!(c.volume >= 50_000 && c.volume < 5_000_000);
            }
        }
    }

    #[test]
    fn candles_are_spaced_by_the_interval() {
        let market = MockMarket::new();
        let data = market.candles("AAPL", Timeframe::Min15, 20).unwrap();
        for pair in data.candles.windows(2) {
            assert_eq!((pair[1].time - pair[0].time).num_minutes(), 15);
        }
        let last = data.last().unwrap().time;
        assert!(last <= Utc::now());
        assert!(Utc::now() - last <= ChronoDuration::minutes(16));
    }

    #[test]
    fn search_matches_symbol_and_name() {
        let market = MockMarket::new();
        let banks: Vec<String> = market.search("bank").into_iter().map(|m| m.symbol).collect();
        assert_eq!(banks, vec!["RY", "TD", "BNS", "CM", "BMO"]);

        let apple = market.search("aap");
        assert_eq!(apple.len(), 1);
        assert_eq!(apple[0].name, "Apple Inc.");
        assert_eq!(apple[0].exchange, "NASDAQ");
    }

    #[test]
    fn market_data_covers_catalog() {
        let market = MockMarket::new();
        let stocks = market.market_data().unwrap();
        assert_eq!(stocks.len(), 20);
        assert_eq!(stocks[0].symbol, "AAPL");
        assert_eq!(stocks[10].symbol, "RY");
    }
}
