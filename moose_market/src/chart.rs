//! Chart panel state and price scaling.

use moose_common::model::{CandleData, CandleStick, DrawingObject};
use moose_common::{MarketError, Timeframe};
use moose_data::ChartData;

/// Extra room above the highest high and below the lowest low, as a share of the range.
pub const PRICE_BUFFER: f64 = 0.05;
/// Labels on the price axis, bottom and top included.
pub const PRICE_LABELS: usize = 6;

/// Glyph of a candle body.
pub const BODY: char = '┃';
/// Glyph of a candle wick.
pub const WICK: char = '│';

/// Chart panel state.
#[derive(Debug)]
pub struct ChartPanel {
    /// Charted symbol.
    pub symbol: Option<String>,
    /// Selected bar size.
    pub timeframe: Timeframe,
    /// Last applied chart data.
    pub data: Option<ChartData>,
    /// Drawings saved for `symbol`.
    pub drawings: Vec<DrawingObject>,
    /// A request is in flight.
    pub loading: bool,
    /// Message of the last failed load.
    pub error: Option<String>,
    awaiting: Option<u64>,
}

impl ChartPanel {
    /// Empty panel at `timeframe`.
    pub fn new(timeframe: Timeframe) -> Self {
        ChartPanel {
            symbol: None,
            timeframe,
            data: None,
            drawings: Vec::new(),
            loading: false,
            error: None,
            awaiting: None,
        }
    }

    /// Mark a chart request for `symbol` as in flight.
    pub fn requested(&mut self, symbol: &str, seq: u64) {
        if self.symbol.as_deref() != Some(symbol) {
            self.data = None;
            self.drawings.clear();
        }
        self.symbol = Some(symbol.to_string());
        self.loading = true;
        self.error = None;
        self.awaiting = Some(seq);
    }

    /// Whether `seq` answers the latest request.
    pub fn is_current(&self, seq: u64) -> bool {
        self.awaiting == Some(seq)
    }

    /// Apply a worker response. Stale responses are ignored and return `false`.
    pub fn apply(&mut self, seq: u64, result: Result<ChartData, MarketError>) -> bool {
        if !self.is_current(seq) {
            return false;
        }
        self.awaiting = None;
        self.loading = false;
        match result {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
            }
            Err(e) => {
                self.data = None;
                self.error = Some(format!("Failed to load chart data: {}", e));
            }
        }
        true
    }

    /// Close of the most recent bar.
    pub fn last_close(&self) -> Option<f64> {
        self.data.as_ref()?.candles.last().map(|c| c.close)
    }

    /// Horizontal levels drawn for the current symbol.
    pub fn levels(&self) -> Vec<f64> {
        self.drawings.iter().filter_map(DrawingObject::level).collect()
    }
}

/// Vertical price axis for a candle series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceScale {
    /// Price at the bottom row.
    pub min: f64,
    /// Price at the top row.
    pub max: f64,
}

impl PriceScale {
    /// Low/high range of `data` widened by [`PRICE_BUFFER`] on both sides.
    ///
    /// A flat series is widened by 1% of its price so rows stay distinct.
    pub fn for_candles(data: &CandleData) -> Option<Self> {
        let (low, high) = data.price_range()?;
        let range = high - low;
        if range <= f64::EPSILON {
            let pad = (high.abs() * 0.01).max(0.01);
            return Some(PriceScale {
                min: low - pad,
                max: high + pad,
            });
        }
        Some(PriceScale {
            min: low - range * PRICE_BUFFER,
            max: high + range * PRICE_BUFFER,
        })
    }

    /// Row of `price` in a plot `height` rows tall, row 0 at the top.
    pub fn row_for_price(&self, price: f64, height: u16) -> u16 {
        if height == 0 {
            return 0;
        }
        let bottom = f64::from(height - 1);
        let share = ((price - self.min) / (self.max - self.min)).clamp(0.0, 1.0);
        (bottom - share * bottom).round() as u16
    }

    /// [`PRICE_LABELS`] evenly spaced prices from the top of the axis down.
    pub fn labels(&self) -> Vec<f64> {
        let step = (self.max - self.min) / (PRICE_LABELS - 1) as f64;
        (0..PRICE_LABELS)
            .rev()
            .map(|i| self.min + step * i as f64)
            .collect()
    }
}

/// Character for `candle` at `row`: body between open and close, wick out to high and low.
pub fn candle_glyph(candle: &CandleStick, row: u16, scale: &PriceScale, height: u16) -> char {
    let high = scale.row_for_price(candle.high, height);
    let low = scale.row_for_price(candle.low, height);
    let body_top = scale.row_for_price(candle.open.max(candle.close), height);
    let body_bottom = scale.row_for_price(candle.open.min(candle.close), height);

    if (body_top..=body_bottom).contains(&row) {
        BODY
    } else if (high..=low).contains(&row) {
        WICK
    } else {
        ' '
    }
}

/// The most recent candles that fit in `columns`, oldest first.
pub fn visible_candles(candles: &[CandleStick], columns: usize) -> &[CandleStick] {
    let start = candles.len().saturating_sub(columns);
    &candles[start..]
}

/// `$123.45`.
pub fn format_price(price: f64) -> String {
    format!("${:.2}", price)
}

/// Labels for the first and last visible bars.
pub fn date_labels(candles: &[CandleStick], timeframe: Timeframe) -> Option<(String, String)> {
    let first = candles.first()?;
    let last = candles.last()?;
    let format = timeframe.date_format();
    Some((
        first.time.format(format).to_string(),
        last.time.format(format).to_string(),
    ))
}
