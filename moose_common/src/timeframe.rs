//! Chart timeframes.
//!
//! The labels double as the Alpha Vantage intraday interval names, so a
//! `Timeframe` can be passed straight through to the API. Short aliases such as
//! `5m` or `1h` are accepted when parsing.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::MarketError;

/// Bar size of a candle series.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, Hash, Eq, PartialEq)]
pub enum Timeframe {
    /// One-minute bars.
    #[serde(rename = "1min")]
    #[value(name = "1min", alias = "1m")]
    Min1,
    /// Five-minute bars.
    #[serde(rename = "5min")]
    #[value(name = "5min", alias = "5m")]
    Min5,
    /// Fifteen-minute bars.
    #[serde(rename = "15min")]
    #[value(name = "15min", alias = "15m")]
    Min15,
    /// Thirty-minute bars.
    #[serde(rename = "30min")]
    #[value(name = "30min", alias = "30m")]
    Min30,
    /// Hourly bars.
    #[serde(rename = "60min")]
    #[value(name = "60min", alias = "1h")]
    Min60,
    /// Daily bars.
    #[default]
    #[serde(rename = "1d")]
    #[value(name = "1d")]
    Day1,
    /// Weekly bars.
    #[serde(rename = "1w")]
    #[value(name = "1w")]
    Week1,
}

impl Timeframe {
    /// All timeframes in selector order.
    pub const ALL: [Timeframe; 7] = [
        Timeframe::Min1,
        Timeframe::Min5,
        Timeframe::Min15,
        Timeframe::Min30,
        Timeframe::Min60,
        Timeframe::Day1,
        Timeframe::Week1,
    ];

    /// Canonical label, e.g. `15min` or `1d`.
    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::Min1 => "1min",
            Timeframe::Min5 => "5min",
            Timeframe::Min15 => "15min",
            Timeframe::Min30 => "30min",
            Timeframe::Min60 => "60min",
            Timeframe::Day1 => "1d",
            Timeframe::Week1 => "1w",
        }
    }

    /// Distance between two consecutive bars.
    pub fn interval(&self) -> Duration {
        let minutes = match self {
            Timeframe::Min1 => 1,
            Timeframe::Min5 => 5,
            Timeframe::Min15 => 15,
            Timeframe::Min30 => 30,
            Timeframe::Min60 => 60,
            Timeframe::Day1 => 24 * 60,
            Timeframe::Week1 => 7 * 24 * 60,
        };
        Duration::from_secs(minutes * 60)
    }

    /// Relative price range used by the mock generator for one bar.
    pub fn volatility(&self) -> f64 {
        match self {
            Timeframe::Min1 | Timeframe::Min5 => 0.005,
            Timeframe::Min15 | Timeframe::Min30 | Timeframe::Min60 => 0.01,
            Timeframe::Day1 => 0.02,
            Timeframe::Week1 => 0.04,
        }
    }

    /// True for sub-daily bars.
    pub fn is_intraday(&self) -> bool {
        !matches!(self, Timeframe::Day1 | Timeframe::Week1)
    }

    /// `chrono` format string for axis labels.
    pub fn date_format(&self) -> &'static str {
        match self {
            Timeframe::Day1 => "%b %d",
            Timeframe::Week1 => "%b %d, %Y",
            _ => "%H:%M",
        }
    }

    /// Next timeframe in selector order, wrapping around.
    pub fn next(&self) -> Self {
        let idx = self.position();
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Previous timeframe in selector order, wrapping around.
    pub fn previous(&self) -> Self {
        let idx = self.position();
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    fn position(&self) -> usize {
        Self::ALL.iter().position(|t| t == self).unwrap_or(0)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Timeframe {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1min" | "1m" => Ok(Timeframe::Min1),
            "5min" | "5m" => Ok(Timeframe::Min5),
            "15min" | "15m" => Ok(Timeframe::Min15),
            "30min" | "30m" => Ok(Timeframe::Min30),
            "60min" | "1h" => Ok(Timeframe::Min60),
            "1d" => Ok(Timeframe::Day1),
            "1w" => Ok(Timeframe::Week1),
            other => Err(MarketError::Format(format!("unknown timeframe: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_labels_and_aliases() {
        assert_eq!("5m".parse::<Timeframe>().unwrap(), Timeframe::Min5);
        assert_eq!("1H".parse::<Timeframe>().unwrap(), Timeframe::Min60);
        assert_eq!("1w".parse::<Timeframe>().unwrap(), Timeframe::Week1);
        assert!("2d".parse::<Timeframe>().is_err());
        for tf in Timeframe::ALL {
            assert_eq!(tf.label().parse::<Timeframe>().unwrap(), tf);
        }
    }

    #[test]
    fn serializes_as_label() {
        assert_eq!(serde_json::to_string(&Timeframe::Min15).unwrap(), "\"15min\"");
        let tf: Timeframe = serde_json::from_str("\"1d\"").unwrap();
        assert_eq!(tf, Timeframe::Day1);
    }

    #[test]
    fn selector_wraps() {
        assert_eq!(Timeframe::Week1.next(), Timeframe::Min1);
        assert_eq!(Timeframe::Min1.previous(), Timeframe::Week1);
        assert_eq!(Timeframe::Day1.interval(), Duration::from_secs(86_400));
    }
}
