//! Periodic refresh loop.
//!
//! A background thread emits `RefreshEvent::Tick` every interval. Crossbeam
//! `select!` multiplexes the control channel with the interval timeout, so a new
//! interval or a stop request takes effect immediately instead of after the
//! current sleep.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, select, unbounded};
use log::{debug, info};
use moose_common::{MarketError, Result};

/// Message sent by the loop to the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshEvent {
    /// Time to re-load the live views.
    Tick,
}

enum Control {
    SetInterval(Duration),
    Stop,
}

/// Handle to the running refresh loop. Dropping it stops the loop.
pub struct Refresher {
    control: Sender<Control>,
    events: Receiver<RefreshEvent>,
    interval: Duration,
    handle: Option<JoinHandle<()>>,
}

impl Refresher {
    /// Start the loop thread with the given tick interval.
    pub fn start(interval: Duration) -> Self {
        let (control_tx, control_rx) = unbounded::<Control>();
        let (event_tx, event_rx) = unbounded::<RefreshEvent>();
        let handle = thread::spawn(move || run_loop(interval, control_rx, event_tx));
        Self {
            control: control_tx,
            events: event_rx,
            interval,
            handle: Some(handle),
        }
    }

    /// Ticks emitted by the loop.
    pub fn events(&self) -> &Receiver<RefreshEvent> {
        &self.events
    }

    /// Interval the loop was last asked to tick at.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Change the tick interval; the next tick is one full interval away.
    pub fn set_interval(&mut self, interval: Duration) -> Result<()> {
        self.control
            .send(Control::SetInterval(interval))
            .map_err(|e| MarketError::ChannelSend(format!("refresh interval: {}", e)))?;
        self.interval = interval;
        Ok(())
    }

    /// Stop the loop and wait for the thread to exit.
    pub fn stop(&mut self) {
        let _ = self.control.send(Control::Stop);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Refresher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_loop(mut interval: Duration, control_rx: Receiver<Control>, event_tx: Sender<RefreshEvent>) {
    info!("Refresh loop started, interval {:?}", interval);
    loop {
        select! {
            recv(control_rx) -> msg => match msg {
                Ok(Control::SetInterval(next)) => {
                    debug!("Refresh interval changed to {:?}", next);
                    interval = next;
                }
                Ok(Control::Stop) | Err(_) => break,
            },
            default(interval) => {
                if event_tx.send(RefreshEvent::Tick).is_err() {
                    break;
                }
            }
        }
    }
    info!("Refresh loop stopping...");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn ticks_on_interval() {
        let refresher = Refresher::start(Duration::from_millis(20));
        for _ in 0..3 {
            let event = refresher.events().recv_timeout(Duration::from_secs(2)).unwrap();
            assert_eq!(event, RefreshEvent::Tick);
        }
    }

    #[test]
    fn interval_change_takes_effect() {
        let mut refresher = Refresher::start(Duration::from_secs(3600));
        refresher.set_interval(Duration::from_millis(20)).unwrap();
        assert_eq!(refresher.interval(), Duration::from_millis(20));
        let started = Instant::now();
        refresher.events().recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn stop_joins_the_thread() {
        let mut refresher = Refresher::start(Duration::from_secs(3600));
        let started = Instant::now();
        refresher.stop();
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(refresher.set_interval(Duration::from_secs(1)).is_err());
        assert_eq!(refresher.interval(), Duration::from_secs(3600));
    }
}
