use std::collections::HashMap;

use anyhow::Result;

use crate::models::{Security, Ticker};

/// Source of security metadata and full closing price history.
///
/// A lookup miss (`Ok(None)`) means the ticker is unknown; a transport
/// error means the provider could not be reached. The session layer
/// treats both as an invalid-ticker signal rather than a crash.
#[async_trait::async_trait]
pub trait PriceSeriesProvider: Send + Sync {
    async fn get_security(&self, ticker: &Ticker) -> Result<Option<Security>>;

    fn name(&self) -> &str;
}

/// Fixed in-memory provider for tests and offline demos.
#[derive(Debug, Default)]
pub struct StaticProvider {
    securities: HashMap<Ticker, Security>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_security(mut self, security: Security) -> Self {
        self.securities.insert(security.ticker.clone(), security);
        self
    }
}

#[async_trait::async_trait]
impl PriceSeriesProvider for StaticProvider {
    async fn get_security(&self, ticker: &Ticker) -> Result<Option<Security>> {
        Ok(self.securities.get(ticker).cloned())
    }

    fn name(&self) -> &str {
        "static"
    }
}
