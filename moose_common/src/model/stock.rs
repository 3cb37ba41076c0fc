//! Quote snapshots and candle series.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timeframe::Timeframe;

/// A quote snapshot for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    /// Ticker symbol.
    pub symbol: String,
    /// Company name.
    pub name: String,
    /// Last price.
    pub price: f64,
    /// Absolute change since the open.
    pub change: f64,
    /// Change since the open, in percent.
    pub change_percent: f64,
    /// Session open.
    pub open: f64,
    /// Session high.
    pub high: f64,
    /// Session low.
    pub low: f64,
    /// Traded volume.
    pub volume: i64,
    /// Market capitalisation.
    pub market_cap: f64,
    /// Price/earnings ratio.
    pub pe: f64,
    /// Dividend per share.
    pub dividend: f64,
    /// Listing exchange or region.
    pub exchange: String,
    /// Unix seconds of the snapshot.
    pub timestamp: i64,
}

/// A symbol search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolMatch {
    /// Ticker symbol.
    pub symbol: String,
    /// Company name.
    pub name: String,
    /// Exchange or region.
    pub exchange: String,
}

/// OHLC series for charting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandleData {
    /// Ticker symbol.
    pub symbol: String,
    /// Bar size.
    pub timeframe: Timeframe,
    /// Bars, oldest first.
    pub candles: Vec<CandleStick>,
}

impl CandleData {
    /// Lowest low and highest high over all bars.
    pub fn price_range(&self) -> Option<(f64, f64)> {
        let first = self.candles.first()?;
        Some(self.candles.iter().fold((first.low, first.high), |(lo, hi), c| {
            (lo.min(c.low), hi.max(c.high))
        }))
    }

    /// Most recent bar.
    pub fn last(&self) -> Option<&CandleStick> {
        self.candles.last()
    }
}

/// A single OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandleStick {
    /// Bar start.
    pub time: DateTime<Utc>,
    /// Opening price.
    pub open: f64,
    /// Highest price.
    pub high: f64,
    /// Lowest price.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Traded volume.
    pub volume: i64,
}

impl CandleStick {
    /// Closed at or above the open.
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bar(low: f64, high: f64) -> CandleStick {
        CandleStick {
            time: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
            open: low,
            high,
            low,
            close: high,
            volume: 10,
        }
    }

    #[test]
    fn price_range_spans_all_bars() {
        let data = CandleData {
            symbol: "AAPL".into(),
            timeframe: Timeframe::Day1,
            candles: vec![bar(10.0, 12.0), bar(8.0, 11.0), bar(9.0, 15.0)],
        };
        assert_eq!(data.price_range(), Some((8.0, 15.0)));
        assert!(data.last().unwrap().is_bullish());
    }

    #[test]
    fn candle_json_shape() {
        let data = CandleData {
            symbol: "AAPL".into(),
            timeframe: Timeframe::Min5,
            candles: vec![bar(1.0, 2.0)],
        };
        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(value["timeframe"], "5min");
        assert_eq!(value["candles"][0]["time"], "2024-01-02T00:00:00Z");
        assert_eq!(value["candles"][0]["volume"], 10);
    }
}
