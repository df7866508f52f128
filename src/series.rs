//! Daily closing price series and trading-date resolution.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TradeError;
use crate::models::Ticker;

/// A security's closing price history: strictly increasing trading dates
/// mapped to closing prices. The calendar is sparse (weekends, holidays,
/// halts), so lookups distinguish exact dates from forward-filled ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceSeries {
    closes: BTreeMap<NaiveDate, Decimal>,
}

impl PriceSeries {
    /// Build a series from (date, close) points. Duplicate dates collapse
    /// to the last value seen.
    pub fn from_points(points: impl IntoIterator<Item = (NaiveDate, Decimal)>) -> Self {
        Self {
            closes: points.into_iter().collect(),
        }
    }

    /// Closing price exactly on `date`, if the market traded that day.
    pub fn price_at(&self, date: NaiveDate) -> Option<Decimal> {
        self.closes.get(&date).copied()
    }

    /// Last known closing price at or before `date` (forward fill).
    pub fn price_on_or_before(&self, date: NaiveDate) -> Option<Decimal> {
        self.closes.range(..=date).next_back().map(|(_, p)| *p)
    }

    /// Most recent (date, close) in the series.
    pub fn latest(&self) -> Option<(NaiveDate, Decimal)> {
        self.closes.iter().next_back().map(|(d, p)| (*d, *p))
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.closes.keys().next().copied()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.closes.contains_key(&date)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, Decimal)> + '_ {
        self.closes.iter().map(|(d, p)| (*d, *p))
    }

    /// Trading dates within `range`, ascending.
    pub fn dates_in(
        &self,
        range: impl std::ops::RangeBounds<NaiveDate>,
    ) -> impl Iterator<Item = NaiveDate> + '_ {
        self.closes.range(range).map(|(d, _)| *d)
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }
}

/// What a request asked for before it is pinned to a trading date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestedDate {
    /// The most recent trading date in the series.
    Latest,
    /// An explicit calendar date.
    On(NaiveDate),
}

impl fmt::Display for RequestedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestedDate::Latest => f.write_str("the latest trading date"),
            RequestedDate::On(date) => date.fmt(f),
        }
    }
}

/// Pin a requested date to a trading date in `series`.
///
/// Explicit dates must match a trading date exactly: a request on a
/// weekend, holiday, or outside the listed range is rejected rather than
/// shifted to the prior trading day.
pub fn resolve(
    series: &PriceSeries,
    requested: RequestedDate,
    ticker: &Ticker,
) -> Result<NaiveDate, TradeError> {
    let miss = || TradeError::DateNotFound {
        ticker: ticker.clone(),
        requested,
    };
    match requested {
        RequestedDate::Latest => series.latest().map(|(date, _)| date).ok_or_else(miss),
        RequestedDate::On(date) => {
            if series.contains(date) {
                Ok(date)
            } else {
                Err(miss())
            }
        }
    }
}
