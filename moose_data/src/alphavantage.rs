//! Alpha Vantage quote API client.
//!
//! A thin blocking client over `reqwest`. Responses are first decoded to a
//! `serde_json::Value`, checked for API-level error bodies (`Error Message`,
//! `Note`, `Information`) and then mapped onto typed records. The parsing
//! helpers are free functions so they can be exercised without the network.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use log::{debug, info};
use moose_common::model::{CandleData, CandleStick, Stock, SymbolMatch};
use moose_common::tickers::Ticker;
use moose_common::{MarketError, Result, Timeframe};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::source::MarketDataSource;

/// Query endpoint.
pub const BASE_URL: &str = "https://www.alphavantage.co/query";
/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "ALPHAVANTAGE_API_KEY";
/// HTTP timeout for every request.
const TIMEOUT_SECS: u64 = 10;
/// Keys Alpha Vantage uses for error bodies instead of an HTTP status.
const ERROR_KEYS: [&str; 3] = ["Error Message", "Note", "Information"];

/// One `SYMBOL_SEARCH` match.
#[allow(missing_docs)]
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    #[serde(rename = "1. symbol")]
    pub symbol: String,
    #[serde(rename = "2. name")]
    pub name: String,
    #[serde(rename = "3. type", default)]
    pub kind: String,
    #[serde(rename = "4. region", default)]
    pub region: String,
    #[serde(rename = "5. marketOpen", default)]
    pub market_open: String,
    #[serde(rename = "6. marketClose", default)]
    pub market_close: String,
    #[serde(rename = "7. timezone", default)]
    pub timezone: String,
    #[serde(rename = "8. currency", default)]
    pub currency: String,
    #[serde(rename = "9. matchScore", default)]
    pub match_score: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(rename = "bestMatches", default)]
    best_matches: Vec<SearchResult>,
}

/// A `GLOBAL_QUOTE` record. Every field arrives as a string.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QuoteResult {
    #[serde(rename = "01. symbol")]
    pub symbol: String,
    #[serde(rename = "02. open")]
    pub open: String,
    #[serde(rename = "03. high")]
    pub high: String,
    #[serde(rename = "04. low")]
    pub low: String,
    #[serde(rename = "05. price")]
    pub price: String,
    #[serde(rename = "06. volume")]
    pub volume: String,
    #[serde(rename = "07. latest trading day")]
    pub latest_trading_day: String,
    #[serde(rename = "08. previous close")]
    pub previous_close: String,
    #[serde(rename = "09. change")]
    pub change: String,
    #[serde(rename = "10. change percent")]
    pub change_percent: String,
}

#[derive(Deserialize)]
struct QuoteResponse {
    #[serde(rename = "Global Quote", default)]
    global_quote: QuoteResult,
}

/// One bar of a time series. Every field arrives as a string.
#[allow(missing_docs)]
#[derive(Debug, Clone, Deserialize)]
pub struct TimeSeriesData {
    #[serde(rename = "1. open")]
    pub open: String,
    #[serde(rename = "2. high")]
    pub high: String,
    #[serde(rename = "3. low")]
    pub low: String,
    #[serde(rename = "4. close")]
    pub close: String,
    #[serde(rename = "5. volume")]
    pub volume: String,
}

/// Time series keyed by the date string Alpha Vantage returns.
pub type Series = BTreeMap<String, TimeSeriesData>;

impl QuoteResult {
    /// Converts the string record into a `Stock`.
    ///
    /// Company name and exchange are filled from the ticker catalog when the
    /// symbol is known, otherwise the symbol doubles as the name.
    pub fn to_stock(&self) -> Result<Stock> {
        if self.symbol.is_empty() {
            return Err(MarketError::Api(String::from("empty Global Quote")));
        }
        let ticker = Ticker::from_symbol(&self.symbol);
        let timestamp = NaiveDate::parse_from_str(&self.latest_trading_day, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or_else(|| Utc::now().timestamp());

        Ok(Stock {
            symbol: self.symbol.clone(),
            name: ticker
                .map(|t| t.company_name().to_string())
                .unwrap_or_else(|| self.symbol.clone()),
            price: parse_number(&self.price, "price")?,
            change: parse_number(&self.change, "change")?,
            change_percent: parse_number(self.change_percent.trim_end_matches('%'), "change percent")?,
            open: parse_number(&self.open, "open")?,
            high: parse_number(&self.high, "high")?,
            low: parse_number(&self.low, "low")?,
            volume: self.volume.trim().parse().unwrap_or(0),
            market_cap: 0.0,
            pe: 0.0,
            dividend: 0.0,
            exchange: ticker.map(|t| t.exchange().to_string()).unwrap_or_default(),
            timestamp,
        })
    }
}

/// Blocking Alpha Vantage client.
pub struct AlphaVantageClient {
    api_key: String,
    http: Client,
}

impl AlphaVantageClient {
    /// Build a client with an explicit key. An empty key is rejected.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(MarketError::MissingApiKey(API_KEY_ENV));
        }
        let http = Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()?;
        Ok(Self { api_key, http })
    }

    /// `SYMBOL_SEARCH` by keyword.
    pub fn search_symbols(&self, keywords: &str) -> Result<Vec<SearchResult>> {
        let body = self.get(&[("function", "SYMBOL_SEARCH"), ("keywords", keywords)])?;
        parse_search(body)
    }

    /// `GLOBAL_QUOTE` for one symbol.
    pub fn global_quote(&self, symbol: &str) -> Result<QuoteResult> {
        let body = self.get(&[("function", "GLOBAL_QUOTE"), ("symbol", symbol)])?;
        parse_quote(body)
    }

    /// `TIME_SERIES_DAILY`; `compact` limits the answer to the last 100 bars.
    pub fn daily_series(&self, symbol: &str, compact: bool) -> Result<Series> {
        let body = self.get(&[
            ("function", "TIME_SERIES_DAILY"),
            ("symbol", symbol),
            ("outputsize", output_size(compact)),
        ])?;
        parse_series(body, "Time Series (Daily)")
    }

    /// `TIME_SERIES_INTRADAY` for `interval` (`1min`, `5min`, `15min`, `30min`, `60min`).
    pub fn intraday_series(&self, symbol: &str, interval: &str, compact: bool) -> Result<Series> {
        let body = self.get(&[
            ("function", "TIME_SERIES_INTRADAY"),
            ("symbol", symbol),
            ("interval", interval),
            ("outputsize", output_size(compact)),
        ])?;
        parse_series(body, &format!("Time Series ({})", interval))
    }

    /// `TIME_SERIES_WEEKLY`.
    pub fn weekly_series(&self, symbol: &str) -> Result<Series> {
        let body = self.get(&[("function", "TIME_SERIES_WEEKLY"), ("symbol", symbol)])?;
        parse_series(body, "Weekly Time Series")
    }

    fn get(&self, params: &[(&str, &str)]) -> Result<Value> {
        debug!("Alpha Vantage request: {:?}", params);
        let body: Value = self
            .http
            .get(BASE_URL)
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()?
            .error_for_status()?
            .json()?;
        check_api_error(&body)?;
        Ok(body)
    }
}

impl MarketDataSource for AlphaVantageClient {
    fn name(&self) -> &'static str {
        "Alpha Vantage"
    }

    fn search(&self, query: &str) -> Result<Vec<SymbolMatch>> {
        let matches = self.search_symbols(query)?;
        info!("Alpha Vantage returned {} matches for {:?}", matches.len(), query);
        Ok(matches
            .into_iter()
            .map(|m| SymbolMatch {
                symbol: m.symbol,
                name: m.name,
                exchange: m.region,
            })
            .collect())
    }

    fn quote(&self, symbol: &str) -> Result<Stock> {
        self.global_quote(symbol)?.to_stock()
    }

    fn candles(&self, symbol: &str, timeframe: Timeframe, count: usize) -> Result<CandleData> {
        let series = match timeframe {
            Timeframe::Day1 => self.daily_series(symbol, true)?,
            Timeframe::Week1 => self.weekly_series(symbol)?,
            intraday => self.intraday_series(symbol, intraday.label(), true)?,
        };
        let mut data = series_to_candles(symbol, timeframe, &series);
        if data.candles.is_empty() {
            return Err(MarketError::Api(format!("no bars for {}", symbol)));
        }
        let excess = data.candles.len().saturating_sub(count);
        data.candles.drain(..excess);
        Ok(data)
    }
}

fn output_size(compact: bool) -> &'static str {
    if compact { "compact" } else { "full" }
}

fn parse_number(raw: &str, field: &str) -> Result<f64> {
    raw.trim()
        .parse()
        .map_err(|_| MarketError::Api(format!("invalid {}: {:?}", field, raw)))
}

/// Fails when the body is one of Alpha Vantage's error/rate-limit answers.
pub fn check_api_error(body: &Value) -> Result<()> {
    for key in ERROR_KEYS {
        if let Some(message) = body.get(key).and_then(Value::as_str) {
            return Err(MarketError::Api(message.to_string()));
        }
    }
    Ok(())
}

/// Decodes a `SYMBOL_SEARCH` body.
pub fn parse_search(body: Value) -> Result<Vec<SearchResult>> {
    check_api_error(&body)?;
    let response: SearchResponse = serde_json::from_value(body)?;
    Ok(response.best_matches)
}

/// Decodes a `GLOBAL_QUOTE` body. An empty record means the symbol is unknown.
pub fn parse_quote(body: Value) -> Result<QuoteResult> {
    check_api_error(&body)?;
    let response: QuoteResponse = serde_json::from_value(body)?;
    if response.global_quote.symbol.is_empty() {
        return Err(MarketError::Api(String::from("symbol not found")));
    }
    Ok(response.global_quote)
}

/// Extracts the series stored under `key`.
pub fn parse_series(mut body: Value, key: &str) -> Result<Series> {
    check_api_error(&body)?;
    let series = body
        .get_mut(key)
        .map(Value::take)
        .ok_or_else(|| MarketError::Api(format!("invalid response format, {:?} not found", key)))?;
    Ok(serde_json::from_value(series)?)
}

/// Converts a series into ascending candles, skipping dates or numbers that
/// do not parse.
pub fn series_to_candles(symbol: &str, timeframe: Timeframe, series: &Series) -> CandleData {
    let mut candles: Vec<CandleStick> = series
        .iter()
        .filter_map(|(date, bar)| {
            Some(CandleStick {
                time: parse_bar_time(date)?,
                open: bar.open.trim().parse().ok()?,
                high: bar.high.trim().parse().ok()?,
                low: bar.low.trim().parse().ok()?,
                close: bar.close.trim().parse().ok()?,
                volume: bar.volume.trim().parse().ok()?,
            })
        })
        .collect();
    candles.sort_by_key(|c| c.time);

    CandleData {
        symbol: symbol.to_string(),
        timeframe,
        candles,
    }
}

fn parse_bar_time(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rate_limit_note_is_an_api_error() {
        let body = json!({ "Note": "Thank you for using Alpha Vantage! Our standard API rate limit is 25 requests per day." });
        let err = parse_search(body).unwrap_err();
        assert!(matches!(err, MarketError::Api(msg) if msg.contains("rate limit")));
    }

    #[test]
    fn search_body_is_decoded() {
        let body = json!({
            "bestMatches": [{
                "1. symbol": "SHOP.TRT",
                "2. name": "Shopify Inc",
                "3. type": "Equity",
                "4. region": "Toronto",
                "5. marketOpen": "09:30",
                "6. marketClose": "16:00",
                "7. timezone": "UTC-05",
                "8. currency": "CAD",
                "9. matchScore": "0.8000"
            }]
        });
        let results = parse_search(body).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].symbol, "SHOP.TRT");
        assert_eq!(results[0].region, "Toronto");
        assert!(parse_search(json!({})).unwrap().is_empty());
    }

    #[test]
    fn quote_body_becomes_stock() {
        let body = json!({
            "Global Quote": {
                "01. symbol": "AAPL",
                "02. open": "170.00",
                "03. high": "173.50",
                "04. low": "169.20",
                "05. price": "172.10",
                "06. volume": "51234000",
                "07. latest trading day": "2024-03-01",
                "08. previous close": "170.50",
                "09. change": "1.60",
                "10. change percent": "0.9384%"
            }
        });
        let stock = parse_quote(body).unwrap().to_stock().unwrap();
        assert_eq!(stock.name, "Apple Inc.");
        assert_eq!(stock.exchange, "NASDAQ");
        assert_eq!(stock.volume, 51_234_000);
        assert!((stock.change_percent - 0.9384).abs() < 1e-9);
        assert_eq!(stock.timestamp, 1_709_251_200);
    }

    #[test]
    fn empty_quote_means_unknown_symbol() {
        assert!(parse_quote(json!({ "Global Quote": {} })).is_err());
    }

    #[test]
    fn series_is_sorted_and_bad_rows_skipped() {
        let body = json!({
            "Meta Data": { "1. Information": "Intraday (5min)" },
            "Time Series (5min)": {
                "2024-03-01 10:05:00": { "1. open": "2", "2. high": "3", "3. low": "1", "4. close": "2.5", "5. volume": "100" },
                "2024-03-01 10:00:00": { "1. open": "1", "2. high": "2", "3. low": "0.5", "4. close": "2", "5. volume": "200" },
                "not a date":          { "1. open": "1", "2. high": "2", "3. low": "0.5", "4. close": "2", "5. volume": "200" },
                "2024-03-01 10:10:00": { "1. open": "x", "2. high": "2", "3. low": "0.5", "4. close": "2", "5. volume": "200" }
            }
        });
        let series = parse_series(body, "Time Series (5min)").unwrap();
        let data = series_to_candles("IBM", Timeframe::Min5, &series);
        assert_eq!(data.candles.len(), 2);
        assert!(data.candles[0].time < data.candles[1].time);
        assert_eq!(data.candles[0].volume, 200);
    }

    #[test]
    fn missing_series_key_is_reported() {
        let err = parse_series(json!({ "Meta Data": {} }), "Time Series (Daily)").unwrap_err();
        assert!(matches!(err, MarketError::Api(_)));
    }

    #[test]
    fn empty_key_is_rejected() {
        assert!(matches!(
            AlphaVantageClient::new("  "),
            Err(MarketError::MissingApiKey(API_KEY_ENV))
        ));
    }
}
