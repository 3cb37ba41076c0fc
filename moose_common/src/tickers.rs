//! The mock ticker catalog.
//!
//! Mock market data is only generated for these symbols: ten US listings and ten
//! TSX listings. Each ticker knows its company name and exchange.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Exchange a catalog ticker is listed on.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Display, Hash, Eq, PartialEq)]
pub enum Exchange {
    NASDAQ,
    NYSE,
    TSX,
}

/// Set of symbols known to the mock market, US listings first.
#[allow(missing_docs)]
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    Hash,
    Eq,
    PartialEq,
)]
#[strum(ascii_case_insensitive)]
pub enum Ticker {
    AAPL,
    GOOGL,
    MSFT,
    TSLA,
    AMZN,
    V,
    JNJ,
    WMT,
    PG,
    JPM,
    RY,
    TD,
    BNS,
    ENB,
    CNR,
    BCE,
    CM,
    BMO,
    SU,
    CP,
}

impl Ticker {
    /// Looks up a catalog ticker by symbol, ignoring ASCII case.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        symbol.trim().parse().ok()
    }

    /// Registered company name.
    pub fn company_name(&self) -> &'static str {
        match self {
            Ticker::AAPL => "Apple Inc.",
            Ticker::GOOGL => "Alphabet Inc.",
            Ticker::MSFT => "Microsoft Corporation",
            Ticker::TSLA => "Tesla, Inc.",
            Ticker::AMZN => "Amazon.com, Inc.",
            Ticker::V => "Visa Inc.",
            Ticker::JNJ => "Johnson & Johnson",
            Ticker::WMT => "Walmart Inc.",
            Ticker::PG => "Procter & Gamble Co.",
            Ticker::JPM => "JPMorgan Chase & Co.",
            Ticker::RY => "Royal Bank of Canada",
            Ticker::TD => "Toronto-Dominion Bank",
            Ticker::BNS => "Bank of Nova Scotia",
            Ticker::ENB => "Enbridge Inc.",
            Ticker::CNR => "Canadian National Railway",
            Ticker::BCE => "BCE Inc.",
            Ticker::CM => "Canadian Imperial Bank of Commerce",
            Ticker::BMO => "Bank of Montreal",
            Ticker::SU => "Suncor Energy Inc.",
            Ticker::CP => "Canadian Pacific Railway Limited",
        }
    }

    /// Exchange the ticker trades on.
    pub fn exchange(&self) -> Exchange {
        match self {
            Ticker::AAPL | Ticker::GOOGL | Ticker::MSFT | Ticker::TSLA | Ticker::AMZN => {
                Exchange::NASDAQ
            }
            Ticker::V | Ticker::JNJ | Ticker::WMT | Ticker::PG | Ticker::JPM => Exchange::NYSE,
            _ => Exchange::TSX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(Ticker::from_symbol("aapl"), Some(Ticker::AAPL));
        assert_eq!(Ticker::from_symbol(" Bmo "), Some(Ticker::BMO));
        assert_eq!(Ticker::from_symbol("NOPE"), None);
    }

    #[test]
    fn catalog_splits_between_us_and_tsx() {
        let tsx = Ticker::iter().filter(|t| t.exchange() == Exchange::TSX).count();
        assert_eq!(Ticker::iter().count(), 20);
        assert_eq!(tsx, 10);
        assert_eq!(Ticker::V.exchange(), Exchange::NYSE);
        assert_eq!(Ticker::CP.to_string(), "CP");
    }
}
