//! Yahoo Finance chart provider implementation.
//!
//! Fetches the full daily close history for a ticker in one request.
//! No API key required, but responses are large; the session caches
//! fetched securities so a ticker is only pulled once per session.

use anyhow::{anyhow, Context, Result};
use chrono::DateTime;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::models::{Security, Ticker};
use crate::series::PriceSeries;

use super::PriceSeriesProvider;

const YAHOO_CHART_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Exchange codes Yahoo reports for National Market System venues
/// (Nasdaq tiers and NYSE).
const NMS_EXCHANGES: &[&str] = &["NMS", "NYQ", "NGM", "NCM"];

/// Yahoo chart API response envelope.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    symbol: String,
    exchange_name: Option<String>,
    long_name: Option<String>,
    short_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Yahoo Finance price series provider.
///
/// Implements `PriceSeriesProvider` by pulling `range=max` daily bars
/// from the chart endpoint and keeping only the closes.
pub struct YahooChartSource {
    base_url: String,
    client: Client,
}

impl Default for YahooChartSource {
    fn default() -> Self {
        Self::new()
    }
}

impl YahooChartSource {
    pub fn new() -> Self {
        Self::with_base_url(YAHOO_CHART_BASE_URL)
    }

    /// Point the source at a different endpoint (used by tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: Client::new(),
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn chart_url(&self, ticker: &Ticker) -> String {
        format!(
            "{}/{}?range=max&interval=1d&includePrePost=false",
            self.base_url, ticker
        )
    }

    fn parse_security(ticker: &Ticker, result: ChartResult) -> Result<Security> {
        let closes = result
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|block| block.close)
            .unwrap_or_default();

        let mut points = Vec::with_capacity(result.timestamp.len());
        for (ts, close) in result.timestamp.iter().zip(closes) {
            // Untraded days come back as null closes; skip them.
            let Some(close) = close else { continue };
            let date = DateTime::from_timestamp(*ts, 0)
                .ok_or_else(|| anyhow!("timestamp {ts} out of range"))?
                .date_naive();
            let price = Decimal::try_from(close)
                .with_context(|| format!("unrepresentable close {close} on {date}"))?
                .round_dp(2);
            points.push((date, price));
        }

        let exchange = result.meta.exchange_name.unwrap_or_default();
        let is_tradeable = NMS_EXCHANGES.contains(&exchange.as_str());
        let name = result
            .meta
            .long_name
            .or(result.meta.short_name)
            .unwrap_or(result.meta.symbol);

        Ok(Security::new(
            ticker.clone(),
            name,
            is_tradeable,
            PriceSeries::from_points(points),
        ))
    }
}

#[async_trait::async_trait]
impl PriceSeriesProvider for YahooChartSource {
    async fn get_security(&self, ticker: &Ticker) -> Result<Option<Security>> {
        let url = self.chart_url(ticker);
        debug!(%ticker, "fetching chart history");

        let response = self
            .client
            .get(&url)
            .header("User-Agent", "papertrade/0.1")
            .send()
            .await
            .with_context(|| format!("chart request for {ticker} failed"))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response
            .error_for_status()
            .with_context(|| format!("chart request for {ticker} rejected"))?;

        let body: ChartResponse = response
            .json()
            .await
            .with_context(|| format!("invalid chart response for {ticker}"))?;

        if let Some(error) = body.chart.error {
            debug!(%ticker, code = %error.code, description = %error.description, "chart lookup miss");
            return Ok(None);
        }
        let result = body
            .chart
            .result
            .and_then(|mut results| (!results.is_empty()).then(|| results.remove(0)))
            .ok_or_else(|| anyhow!("chart response for {ticker} has no result"))?;

        Ok(Some(Self::parse_security(ticker, result)?))
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}
