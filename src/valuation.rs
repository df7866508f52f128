//! Cost, proceeds, and historical portfolio reconstruction.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TradeError;
use crate::models::{Lot, Ticker};
use crate::series::PriceSeries;

/// Round a currency amount to cents at the point of computation.
///
/// `round_dp` rounds midpoints to even, matching the reference account
/// arithmetic, and rounding here (never deferred) keeps sequences of
/// operations free of sub-cent drift.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp(2)
}

/// One date on the reconstructed portfolio timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub date: NaiveDate,
    /// Cumulative cost of all lots purchased on or before this date.
    pub invested: Decimal,
    /// Market value of those lots at this date's (forward-filled) closes.
    pub value: Decimal,
}

/// Marker an external renderer can pin at a lot's purchase date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotAnnotation {
    pub purchase_date: NaiveDate,
    pub ticker: Ticker,
    pub quantity: u32,
}

/// The two aligned series (capital invested vs. portfolio value) plus
/// per-lot annotations. The crate exposes this as data; rendering is an
/// external concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioCurve {
    pub points: Vec<CurvePoint>,
    pub annotations: Vec<LotAnnotation>,
}

impl PortfolioCurve {
    pub fn final_invested(&self) -> Option<Decimal> {
        self.points.last().map(|p| p.invested)
    }

    pub fn final_value(&self) -> Option<Decimal> {
        self.points.last().map(|p| p.value)
    }
}

/// Reconstruct the portfolio timeline from the open lots.
///
/// `lots` must be sorted by purchase date ascending. The date axis is the
/// union of each held security's trading dates between the earliest
/// purchase and `as_of`, plus every purchase date. Invested is a step
/// function jumping by each lot's cost on its purchase date; value sums
/// `quantity x close` per lot with the last known close carried across
/// calendar gaps. A lot contributes nothing before it exists.
pub fn portfolio_curve(
    lots: &[&Lot],
    series_by_ticker: &HashMap<Ticker, &PriceSeries>,
    as_of: NaiveDate,
) -> Result<PortfolioCurve, TradeError> {
    let lots: Vec<&Lot> = lots
        .iter()
        .copied()
        .filter(|lot| lot.purchase_date <= as_of)
        .collect();
    let earliest = lots
        .first()
        .map(|lot| lot.purchase_date)
        .ok_or(TradeError::EmptyPortfolio)?;

    let mut axis: BTreeSet<NaiveDate> = lots.iter().map(|lot| lot.purchase_date).collect();
    for lot in &lots {
        let series = series_for(series_by_ticker, &lot.ticker)?;
        axis.extend(series.dates_in(earliest..=as_of));
    }

    let mut points = Vec::with_capacity(axis.len());
    let mut invested = Decimal::ZERO;
    let mut owned = 0;
    for date in axis {
        while owned < lots.len() && lots[owned].purchase_date <= date {
            invested += lots[owned].cost();
            owned += 1;
        }
        let mut value = Decimal::ZERO;
        for lot in &lots[..owned] {
            let series = series_for(series_by_ticker, &lot.ticker)?;
            if let Some(price) = series.price_on_or_before(date) {
                value += price * Decimal::from(lot.quantity);
            }
        }
        points.push(CurvePoint {
            date,
            invested,
            value: round_money(value),
        });
    }

    let annotations = lots
        .iter()
        .map(|lot| LotAnnotation {
            purchase_date: lot.purchase_date,
            ticker: lot.ticker.clone(),
            quantity: lot.quantity,
        })
        .collect();

    Ok(PortfolioCurve {
        points,
        annotations,
    })
}

fn series_for<'a>(
    series_by_ticker: &HashMap<Ticker, &'a PriceSeries>,
    ticker: &Ticker,
) -> Result<&'a PriceSeries, TradeError> {
    series_by_ticker
        .get(ticker)
        .copied()
        .ok_or_else(|| TradeError::InvalidTicker(ticker.to_string()))
}
