//! Fetch worker thread.
//!
//! Chart and search requests may go over the network, so the dashboard hands
//! them to one background thread and keeps drawing. Every request carries a
//! sequence number; the dashboard only applies the response matching its latest
//! request of that kind and drops the rest.

use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender, unbounded};
use log::{debug, error, info};
use moose_common::model::SymbolMatch;
use moose_common::{MarketError, Result, Timeframe};

use crate::source::{ChartData, MarketService};

/// Work items accepted by the worker.
#[derive(Debug, Clone)]
pub enum FetchRequest {
    /// Symbol search for the dropdown.
    Search {
        /// Request sequence number.
        seq: u64,
        /// Search text.
        query: String,
    },
    /// Candles and quote for the chart panel.
    Chart {
        /// Request sequence number.
        seq: u64,
        /// Symbol to chart.
        symbol: String,
        /// Bar size.
        timeframe: Timeframe,
    },
}

/// Results produced by the worker.
#[derive(Debug)]
pub enum FetchResponse {
    /// Search results.
    Search {
        /// Sequence number of the request.
        seq: u64,
        /// Matches, possibly empty.
        results: Vec<SymbolMatch>,
    },
    /// Chart data or the reason it could not be loaded.
    Chart {
        /// Sequence number of the request.
        seq: u64,
        /// Requested symbol.
        symbol: String,
        /// Outcome.
        result: Result<ChartData>,
    },
}

/// Handle to the fetch thread. Dropping it closes the request channel and
/// lets the thread finish.
pub struct FetchWorker {
    requests: Sender<FetchRequest>,
    responses: Receiver<FetchResponse>,
    next_seq: u64,
}

impl FetchWorker {
    /// Spawn the worker over `service`.
    pub fn start(service: Arc<MarketService>) -> Self {
        let (request_tx, request_rx) = unbounded::<FetchRequest>();
        let (response_tx, response_rx) = unbounded::<FetchResponse>();

        thread::spawn(move || {
            info!("Fetch worker started (Thread ID: {:?})", thread::current().id());
            for request in request_rx.iter() {
                let response = handle_request(&service, request);
                if response_tx.send(response).is_err() {
                    error!("Fetch worker: response receiver dropped");
                    break;
                }
            }
            info!("Fetch worker stopping...");
        });

        Self {
            requests: request_tx,
            responses: response_rx,
            next_seq: 0,
        }
    }

    /// Queue a search and return its sequence number.
    pub fn search(&mut self, query: &str) -> Result<u64> {
        let seq = self.bump();
        self.send(FetchRequest::Search {
            seq,
            query: query.to_string(),
        })?;
        Ok(seq)
    }

    /// Queue a chart load and return its sequence number.
    pub fn chart(&mut self, symbol: &str, timeframe: Timeframe) -> Result<u64> {
        let seq = self.bump();
        self.send(FetchRequest::Chart {
            seq,
            symbol: symbol.to_string(),
            timeframe,
        })?;
        Ok(seq)
    }

    /// Completed responses.
    pub fn responses(&self) -> &Receiver<FetchResponse> {
        &self.responses
    }

    fn bump(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn send(&self, request: FetchRequest) -> Result<()> {
        debug!("Queueing {:?}", request);
        self.requests
            .send(request)
            .map_err(|e| MarketError::ChannelSend(format!("fetch worker: {}", e)))
    }
}

fn handle_request(service: &MarketService, request: FetchRequest) -> FetchResponse {
    match request {
        FetchRequest::Search { seq, query } => FetchResponse::Search {
            seq,
            results: service.search(&query),
        },
        FetchRequest::Chart {
            seq,
            symbol,
            timeframe,
        } => {
            let result = service.chart(&symbol, timeframe);
            FetchResponse::Chart { seq, symbol, result }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockMarket;
    use crate::source::ChartSource;
    use crate::storage::Storage;
    use std::time::Duration;
    use tempfile::TempDir;

    fn worker(dir: &TempDir) -> FetchWorker {
        let storage = Arc::new(Storage::new(dir.path()));
        storage.initialize().unwrap();
        let service = MarketService::new(Arc::new(MockMarket::new()), storage);
        FetchWorker::start(Arc::new(service))
    }

    #[test]
    fn answers_in_request_order_with_sequence_numbers() {
        let dir = TempDir::new().unwrap();
        let mut worker = worker(&dir);
        let search_seq = worker.search("bank").unwrap();
        let chart_seq = worker.chart("AAPL", Timeframe::Min60).unwrap();
        assert!(chart_seq > search_seq);

        match worker.responses().recv_timeout(Duration::from_secs(5)).unwrap() {
            FetchResponse::Search { seq, results } => {
                assert_eq!(seq, search_seq);
                assert_eq!(results.len(), 5);
            }
            other => panic!("unexpected {:?}", other),
        }
        match worker.responses().recv_timeout(Duration::from_secs(5)).unwrap() {
            FetchResponse::Chart { seq, symbol, result } => {
                assert_eq!(seq, chart_seq);
                assert_eq!(symbol, "AAPL");
                let chart = result.unwrap();
                assert_eq!(chart.source, ChartSource::Mock);
                assert_eq!(chart.candles.timeframe, Timeframe::Min60);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn chart_errors_are_returned_not_dropped() {
        let dir = TempDir::new().unwrap();
        let mut worker = worker(&dir);
        worker.chart("NOPE", Timeframe::Day1).unwrap();
        match worker.responses().recv_timeout(Duration::from_secs(5)).unwrap() {
            FetchResponse::Chart { result, .. } => assert!(result.is_err()),
            other => panic!("unexpected {:?}", other),
        }
    }
}
