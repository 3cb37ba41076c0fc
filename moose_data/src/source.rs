//! Market data sources and the fallback service.
//!
//! `MarketDataSource` is the seam between the dashboard and wherever quotes come
//! from. `MarketService` prefers an optional primary source (the quote API) and
//! falls back to stored candles, then to the mock market. Watchlist, heatmap and
//! snapshot quotes always come from the mock market, which answers instantly.

use std::sync::Arc;

use log::{debug, info, warn};
use moose_common::model::{CandleData, Stock, SymbolMatch};
use moose_common::{MarketError, Result, Timeframe};
use strum::Display;

use crate::mock::MockMarket;
use crate::storage::Storage;

/// Local search results below this count trigger a primary-source search.
pub const MIN_LOCAL_RESULTS: usize = 5;
/// Maximum number of primary-source search results kept.
pub const MAX_SEARCH_RESULTS: usize = 5;
/// Bars requested per chart.
pub const DEFAULT_CANDLE_COUNT: usize = 100;

/// A provider of symbol search, quotes and candles.
pub trait MarketDataSource: Send + Sync {
    /// Human-readable source name for logs and the header.
    fn name(&self) -> &'static str;

    /// Symbols matching `query`.
    fn search(&self, query: &str) -> Result<Vec<SymbolMatch>>;

    /// Latest quote for `symbol`.
    fn quote(&self, symbol: &str) -> Result<Stock>;

    /// Up to `count` most recent bars of `timeframe`, oldest first.
    fn candles(&self, symbol: &str, timeframe: Timeframe, count: usize) -> Result<CandleData>;
}

impl MarketDataSource for MockMarket {
    fn name(&self) -> &'static str {
        "Mock"
    }

    fn search(&self, query: &str) -> Result<Vec<SymbolMatch>> {
        Ok(MockMarket::search(self, query))
    }

    fn quote(&self, symbol: &str) -> Result<Stock> {
        self.stock(symbol)
    }

    fn candles(&self, symbol: &str, timeframe: Timeframe, count: usize) -> Result<CandleData> {
        MockMarket::candles(self, symbol, timeframe, count)
    }
}

/// Where a chart's candles came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ChartSource {
    /// The primary source answered.
    Api,
    /// Candles saved by an earlier session.
    Stored,
    /// Generated by the mock market.
    Mock,
}

/// Everything the chart panel needs for one symbol/timeframe.
#[derive(Debug, Clone)]
pub struct ChartData {
    /// Candle series.
    pub candles: CandleData,
    /// Quote summary for the info line, when one is available.
    pub quote: Option<Stock>,
    /// Origin of `candles`.
    pub source: ChartSource,
}

/// Primary source with mock and stored-data fallback.
pub struct MarketService {
    primary: Option<Box<dyn MarketDataSource>>,
    mock: Arc<MockMarket>,
    storage: Arc<Storage>,
}

impl MarketService {
    /// Service backed only by the mock market.
    pub fn new(mock: Arc<MockMarket>, storage: Arc<Storage>) -> Self {
        Self {
            primary: None,
            mock,
            storage,
        }
    }

    /// Use `source` before falling back.
    pub fn with_primary(mut self, source: Box<dyn MarketDataSource>) -> Self {
        info!("Primary market data source: {}", source.name());
        self.primary = Some(source);
        self
    }

    /// Name of the primary source, `None` when running on mock data only.
    pub fn primary_name(&self) -> Option<&'static str> {
        self.primary.as_ref().map(|p| p.name())
    }

    /// Storage the service caches into.
    pub fn storage(&self) -> &Arc<Storage> {
        &self.storage
    }

    /// Local catalog search, widened through the primary source when the
    /// catalog has fewer than [`MIN_LOCAL_RESULTS`] matches.
    pub fn search(&self, query: &str) -> Vec<SymbolMatch> {
        let local = self.mock.search(query);
        let Some(primary) = self.primary.as_ref() else {
            return local;
        };
        if local.len() >= MIN_LOCAL_RESULTS {
            return local;
        }

        match primary.search(query) {
            Ok(remote) if !remote.is_empty() => remote.into_iter().take(MAX_SEARCH_RESULTS).collect(),
            Ok(_) => local,
            Err(e) => {
                warn!("{} search failed for {:?}: {}", primary.name(), query, e);
                local
            }
        }
    }

    /// Candles and quote summary for the chart panel.
    ///
    /// Order: primary source, stored candles (only when a primary source is
    /// configured, or when the mock market does not know the symbol), mock.
    pub fn chart(&self, symbol: &str, timeframe: Timeframe) -> Result<ChartData> {
        if let Some(primary) = self.primary.as_ref() {
            match primary.candles(symbol, timeframe, DEFAULT_CANDLE_COUNT) {
                Ok(candles) => {
                    let quote = primary
                        .quote(symbol)
                        .inspect_err(|e| warn!("{} quote failed for {}: {}", primary.name(), symbol, e))
                        .ok();
                    self.cache(&candles);
                    return Ok(ChartData {
                        candles,
                        quote,
                        source: ChartSource::Api,
                    });
                }
                Err(e) => warn!("{} candles failed for {} {}: {}", primary.name(), symbol, timeframe, e),
            }

            if let Ok(candles) = self.storage.load_candles(symbol, timeframe) {
                info!("Serving stored candles for {} {}", symbol, timeframe);
                return Ok(ChartData {
                    candles,
                    quote: None,
                    source: ChartSource::Stored,
                });
            }
        }

        match self.mock.candles(symbol, timeframe, DEFAULT_CANDLE_COUNT) {
            Ok(candles) => {
                self.cache(&candles);
                Ok(ChartData {
                    candles,
                    quote: self.mock.stock(symbol).ok(),
                    source: ChartSource::Mock,
                })
            }
            Err(e @ MarketError::SymbolNotFound(_)) if self.primary.is_none() => {
                let candles = self.storage.load_candles(symbol, timeframe).map_err(|_| e)?;
                Ok(ChartData {
                    candles,
                    quote: None,
                    source: ChartSource::Stored,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Mock quote for one symbol.
    pub fn stock(&self, symbol: &str) -> Result<Stock> {
        self.mock.stock(symbol)
    }

    /// Mock quotes for `symbols`, skipping the ones the catalog does not know.
    pub fn stocks(&self, symbols: &[String]) -> Vec<Stock> {
        symbols
            .iter()
            .filter_map(|s| {
                self.mock
                    .stock(s)
                    .inspect_err(|e| debug!("No quote for {}: {}", s, e))
                    .ok()
            })
            .collect()
    }

    /// Fetch a fresh market snapshot and save it.
    pub fn refresh_market(&self) -> Result<Vec<Stock>> {
        let stocks = self.mock.market_data()?;
        self.storage.save_stocks(&stocks)?;
        info!("Market snapshot refreshed ({} stocks)", stocks.len());
        Ok(stocks)
    }

    /// Saved snapshot, or a fresh one when nothing was saved yet.
    pub fn load_or_refresh_market(&self) -> Result<Vec<Stock>> {
        let saved = self.storage.load_stocks()?;
        if saved.is_empty() {
            return self.refresh_market();
        }
        debug!("Loaded {} saved stocks", saved.len());
        Ok(saved)
    }

    fn cache(&self, candles: &CandleData) {
        if let Err(e) = self.storage.save_candles(candles) {
            warn!("Failed to store candles for {}: {}", candles.symbol, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Failing;

    impl MarketDataSource for Failing {
        fn name(&self) -> &'static str {
            "Failing"
        }
        fn search(&self, _: &str) -> Result<Vec<SymbolMatch>> {
            Err(MarketError::Api("down".into()))
        }
        fn quote(&self, _: &str) -> Result<Stock> {
            Err(MarketError::Api("down".into()))
        }
        fn candles(&self, _: &str, _: Timeframe, _: usize) -> Result<CandleData> {
            Err(MarketError::Api("down".into()))
        }
    }

    /// Answers with a fixed search hit and mock-generated bars under its own name.
    struct Remote(MockMarket);

    impl MarketDataSource for Remote {
        fn name(&self) -> &'static str {
            "Remote"
        }
        fn search(&self, query: &str) -> Result<Vec<SymbolMatch>> {
            Ok((0..8)
                .map(|i| SymbolMatch {
                    symbol: format!("{}{}", query.to_uppercase(), i),
                    name: "Remote Corp".into(),
                    exchange: "United States".into(),
                })
                .collect())
        }
        fn quote(&self, symbol: &str) -> Result<Stock> {
            self.0.stock(symbol)
        }
        fn candles(&self, symbol: &str, timeframe: Timeframe, count: usize) -> Result<CandleData> {
            self.0.candles(symbol, timeframe, count)
        }
    }

    fn service(dir: &TempDir) -> MarketService {
        let storage = Arc::new(Storage::new(dir.path()));
        storage.initialize().unwrap();
        MarketService::new(Arc::new(MockMarket::new()), storage)
    }

    #[test]
    fn mock_only_chart_is_cached() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);
        let chart = service.chart("AAPL", Timeframe::Day1).unwrap();
        assert_eq!(chart.source, ChartSource::Mock);
        assert_eq!(chart.candles.candles.len(), DEFAULT_CANDLE_COUNT);
        assert!(chart.quote.is_some());
        assert!(service.storage().load_candles("AAPL", Timeframe::Day1).is_ok());
    }

    #[test]
    fn failing_primary_falls_back_to_stored_then_mock() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir).with_primary(Box::new(Failing));

        let first = service.chart("MSFT", Timeframe::Min5).unwrap();
        assert_eq!(first.source, ChartSource::Mock);

        let second = service.chart("MSFT", Timeframe::Min5).unwrap();
        assert_eq!(second.source, ChartSource::Stored);
        assert_eq!(second.candles, first.candles);
    }

    #[test]
    fn primary_is_used_first() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir).with_primary(Box::new(Remote(MockMarket::new())));
        assert_eq!(service.primary_name(), Some("Remote"));
        let chart = service.chart("TSLA", Timeframe::Week1).unwrap();
        assert_eq!(chart.source, ChartSource::Api);
        assert!(chart.quote.is_some());
    }

    #[test]
    fn unknown_symbol_without_primary_uses_stored_candles() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);
        assert!(matches!(
            service.chart("SHOP", Timeframe::Day1),
            Err(MarketError::SymbolNotFound(_))
        ));

        let mut stored = MockMarket::new().candles("AAPL", Timeframe::Day1, 5).unwrap();
        stored.symbol = "SHOP".into();
        service.storage().save_candles(&stored).unwrap();
        let chart = service.chart("SHOP", Timeframe::Day1).unwrap();
        assert_eq!(chart.source, ChartSource::Stored);
    }

    #[test]
    fn search_widens_only_when_local_results_are_few() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir).with_primary(Box::new(Remote(MockMarket::new())));

        // five local bank matches: no remote call
        let banks = service.search("bank");
        assert_eq!(banks.len(), 5);
        assert_eq!(banks[0].symbol, "RY");

        let remote = service.search("sh");
        assert_eq!(remote.len(), MAX_SEARCH_RESULTS);
        assert_eq!(remote[0].name, "Remote Corp");
    }

    #[test]
    fn failing_search_keeps_local_results() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir).with_primary(Box::new(Failing));
        let results = service.search("apple");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].symbol, "AAPL");
    }

    #[test]
    fn watchlist_quotes_skip_unknown_symbols() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);
        let stocks = service.stocks(&["AAPL".into(), "NOPE".into(), "TD".into()]);
        let symbols: Vec<_> = stocks.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAPL", "TD"]);
    }

    #[test]
    fn market_snapshot_is_saved_once() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);
        let first = service.load_or_refresh_market().unwrap();
        assert_eq!(first.len(), 20);
        let second = service.load_or_refresh_market().unwrap();
        assert_eq!(first, second);
    }
}
