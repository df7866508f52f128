//! Normalization pipeline for incoming buy/sell requests.
//!
//! Stages run in a fixed order and short-circuit on the first failure:
//! ticker syntax, then date format, then quantity. Ticker validity
//! against the provider and the open-lot lookup need the session and
//! ledger, so they happen in `broker` after normalization.

use chrono::NaiveDate;

use crate::error::TradeError;
use crate::models::Ticker;
use crate::series::RequestedDate;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A raw request as it arrives from the shell.
#[derive(Debug, Clone)]
pub struct TradeRequest {
    pub ticker: String,
    pub quantity: i64,
    /// `"now"` or a `YYYY-MM-DD` calendar date.
    pub date: String,
}

impl TradeRequest {
    pub fn new(
        ticker: impl Into<String>,
        quantity: i64,
        date: impl Into<String>,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            quantity,
            date: date.into(),
        }
    }

    /// A request dated `"now"`, the most recent trading date.
    pub fn latest(ticker: impl Into<String>, quantity: i64) -> Self {
        Self::new(ticker, quantity, "now")
    }

    pub fn normalize(&self) -> Result<NormalizedRequest, TradeError> {
        let ticker = Ticker::parse(&self.ticker)?;
        let date = parse_requested_date(&self.date)?;
        let quantity = check_quantity(self.quantity)?;
        Ok(NormalizedRequest {
            ticker,
            quantity,
            date,
        })
    }
}

/// A request that passed normalization and is safe to hand to the
/// session layer.
#[derive(Debug, Clone)]
pub struct NormalizedRequest {
    pub ticker: Ticker,
    pub quantity: u32,
    pub date: RequestedDate,
}

/// Parse a request date: `"now"` stays unresolved as `Latest`; anything
/// else must be a strict `YYYY-MM-DD` date.
pub fn parse_requested_date(raw: &str) -> Result<RequestedDate, TradeError> {
    if raw == "now" {
        return Ok(RequestedDate::Latest);
    }
    // `parse_from_str` tolerates unpadded fields ("2014-5-2"); the
    // round-trip comparison pins the input to the padded form.
    let malformed = || TradeError::InvalidDateFormat(raw.to_string());
    let date = NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| malformed())?;
    if date.format(DATE_FORMAT).to_string() != raw {
        return Err(malformed());
    }
    Ok(RequestedDate::On(date))
}

fn check_quantity(quantity: i64) -> Result<u32, TradeError> {
    u32::try_from(quantity)
        .ok()
        .filter(|q| *q > 0)
        .ok_or(TradeError::InvalidQuantity(quantity))
}
