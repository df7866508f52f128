#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use papertrade::market_data::PriceSeriesProvider;
use papertrade::models::{Security, Ticker};
use papertrade::series::PriceSeries;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

pub fn ticker(s: &str) -> Ticker {
    Ticker::parse(s).unwrap()
}

pub fn series(points: &[(&str, &str)]) -> PriceSeries {
    PriceSeries::from_points(points.iter().map(|(d, p)| {
        (
            NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap(),
            p.parse().unwrap(),
        )
    }))
}

pub fn security(symbol: &str, name: &str, points: &[(&str, &str)]) -> Security {
    Security::new(ticker(symbol), name, true, series(points))
}

pub fn delisted_security(symbol: &str, name: &str, points: &[(&str, &str)]) -> Security {
    Security::new(ticker(symbol), name, false, series(points))
}

/// Provider whose transport always fails, standing in for an
/// unreachable market data service.
pub struct UnreachableProvider;

#[async_trait]
impl PriceSeriesProvider for UnreachableProvider {
    async fn get_security(&self, _ticker: &Ticker) -> Result<Option<Security>> {
        Err(anyhow!("connection refused"))
    }

    fn name(&self) -> &str {
        "unreachable"
    }
}
