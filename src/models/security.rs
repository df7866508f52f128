use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::TradeError;
use crate::series::PriceSeries;

/// An uppercase exchange ticker symbol.
///
/// Construction normalizes case and rejects anything that could not be a
/// listed symbol, so the rest of the crate never sees a lowercase or
/// malformed ticker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticker(String);

fn ticker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // 1-6 letters, optionally a short class suffix (e.g. BRK.B).
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z]{1,6}([.-][A-Z]{1,2})?$").expect("valid regex"))
}

impl Ticker {
    pub fn parse(raw: &str) -> Result<Self, TradeError> {
        let normalized = raw.trim().to_uppercase();
        if ticker_pattern().is_match(&normalized) {
            Ok(Self(normalized))
        } else {
            Err(TradeError::InvalidTicker(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// One listed security as reported by a price series provider.
///
/// Immutable once fetched; a session caches these per ticker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Security {
    pub ticker: Ticker,
    /// Display name (e.g. "Apple Inc.").
    pub name: String,
    /// True only when the security trades on a recognized National Market
    /// System exchange.
    pub is_tradeable: bool,
    /// Full daily closing price history.
    pub series: PriceSeries,
}

impl Security {
    pub fn new(
        ticker: Ticker,
        name: impl Into<String>,
        is_tradeable: bool,
        series: PriceSeries,
    ) -> Self {
        Self {
            ticker,
            name: name.into(),
            is_tradeable,
            series,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_uppercases() {
        let ticker = Ticker::parse("amzn").unwrap();
        assert_eq!(ticker.as_str(), "AMZN");
    }

    #[test]
    fn parse_trims_whitespace() {
        let ticker = Ticker::parse(" msft ").unwrap();
        assert_eq!(ticker.as_str(), "MSFT");
    }

    #[test]
    fn parse_accepts_class_suffix() {
        assert!(Ticker::parse("brk.b").is_ok());
        assert!(Ticker::parse("BF-B").is_ok());
    }

    #[test]
    fn parse_rejects_malformed_symbols() {
        for raw in ["", "TOOLONGTICKER", "12AB", "A B", "AAPL!"] {
            assert!(
                matches!(Ticker::parse(raw), Err(TradeError::InvalidTicker(_))),
                "expected rejection for {raw:?}"
            );
        }
    }
}
