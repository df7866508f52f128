//! Session orchestration: the validate-then-commit path for buys and
//! sells, plus portfolio reporting.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::TradeError;
use crate::market_data::PriceSeriesProvider;
use crate::models::{Account, AccountName, Security, SoldLot, Ticker, TradeConfirmation};
use crate::series::{self, PriceSeries, RequestedDate};
use crate::validate::TradeRequest;
use crate::valuation::{self, PortfolioCurve};

/// One open holding as it appears on a statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingLine {
    pub ticker: Ticker,
    pub security_name: String,
    pub quantity: u32,
    pub purchase_date: NaiveDate,
    pub purchase_price: Decimal,
    pub cost: Decimal,
    pub latest_price: Decimal,
    pub current_value: Decimal,
    /// Unrealized gain (negative for a loss).
    pub gain: Decimal,
}

/// Balance, open holdings, and closed positions for one account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountStatement {
    pub account: AccountName,
    pub balance: Decimal,
    pub holdings: Vec<HoldingLine>,
    pub closed: Vec<SoldLot>,
}

/// A trading session: one provider plus a per-ticker security cache.
///
/// Securities are fetched eagerly per distinct ticker and reused for the
/// session's lifetime, so repeated operations on the same ticker never
/// refetch. Operations take the account explicitly; nothing here reads
/// ambient time or global state.
pub struct Session {
    provider: Arc<dyn PriceSeriesProvider>,
    securities: HashMap<Ticker, Arc<Security>>,
}

impl Session {
    pub fn new(provider: Arc<dyn PriceSeriesProvider>) -> Self {
        Self {
            provider,
            securities: HashMap::new(),
        }
    }

    /// Look up a security, consulting the session cache first.
    ///
    /// Unknown tickers, non-NMS listings, and provider failures all
    /// surface as `InvalidTicker`: the caller cannot distinguish them
    /// and none of them should end the session.
    pub async fn security(&mut self, ticker: &Ticker) -> Result<Arc<Security>, TradeError> {
        if let Some(security) = self.securities.get(ticker) {
            return Ok(security.clone());
        }
        let invalid = || TradeError::InvalidTicker(ticker.to_string());
        let security = match self.provider.get_security(ticker).await {
            Ok(Some(security)) => security,
            Ok(None) => return Err(invalid()),
            Err(err) => {
                warn!(%ticker, provider = self.provider.name(), error = %err, "provider lookup failed");
                return Err(invalid());
            }
        };
        if !security.is_tradeable || security.series.is_empty() {
            return Err(invalid());
        }
        let security = Arc::new(security);
        self.securities.insert(ticker.clone(), security.clone());
        Ok(security)
    }

    /// Validate and commit a purchase.
    pub async fn buy(
        &mut self,
        account: &mut Account,
        request: &TradeRequest,
    ) -> Result<TradeConfirmation, TradeError> {
        let request = request.normalize()?;
        let security = self.security(&request.ticker).await?;
        let trade_date = series::resolve(&security.series, request.date, &request.ticker)?;
        account.buy_lot(&security, request.quantity, trade_date)
    }

    /// Validate and commit a sale.
    ///
    /// The request date identifies the purchase lot; the shares are sold
    /// at the close of the most recent trading date in the series.
    pub async fn sell(
        &mut self,
        account: &mut Account,
        request: &TradeRequest,
    ) -> Result<TradeConfirmation, TradeError> {
        let request = request.normalize()?;
        let security = self.security(&request.ticker).await?;
        let purchase_date = series::resolve(&security.series, request.date, &request.ticker)?;
        let sold_date = series::resolve(&security.series, RequestedDate::Latest, &request.ticker)?;
        account.sell_lot(&security, request.quantity, purchase_date, sold_date)
    }

    /// Reconstruct the invested/value timeline for the account's open
    /// lots, up to `as_of` (or the latest close when unset).
    pub async fn curve(
        &mut self,
        account: &Account,
        as_of: RequestedDate,
    ) -> Result<PortfolioCurve, TradeError> {
        let securities = self.held_securities(account).await?;
        let by_ticker: HashMap<Ticker, &PriceSeries> = securities
            .iter()
            .map(|security| (security.ticker.clone(), &security.series))
            .collect();

        let as_of = match as_of {
            RequestedDate::On(date) => date,
            RequestedDate::Latest => securities
                .iter()
                .filter_map(|security| security.series.latest())
                .map(|(date, _)| date)
                .max()
                .ok_or(TradeError::EmptyPortfolio)?,
        };

        let lots = account.ledger().lots_by_purchase_date();
        valuation::portfolio_curve(&lots, &by_ticker, as_of)
    }

    /// Balance plus per-lot cost, current value, and realized positions.
    pub async fn statement(&mut self, account: &Account) -> Result<AccountStatement, TradeError> {
        let mut holdings = Vec::new();
        for lot in account.ledger().lots_by_purchase_date() {
            let security = self.security(&lot.ticker).await?;
            let (_, latest_price) = security
                .series
                .latest()
                .ok_or_else(|| TradeError::InvalidTicker(lot.ticker.to_string()))?;
            let cost = lot.cost();
            let current_value = lot.value_at(latest_price);
            holdings.push(HoldingLine {
                ticker: lot.ticker.clone(),
                security_name: security.name.clone(),
                quantity: lot.quantity,
                purchase_date: lot.purchase_date,
                purchase_price: lot.purchase_price,
                cost,
                latest_price,
                current_value,
                gain: current_value - cost,
            });
        }
        Ok(AccountStatement {
            account: account.name().clone(),
            balance: account.balance(),
            holdings,
            closed: account.ledger().closed_lots().to_vec(),
        })
    }

    async fn held_securities(
        &mut self,
        account: &Account,
    ) -> Result<Vec<Arc<Security>>, TradeError> {
        if !account.ledger().has_open_lots() {
            return Err(TradeError::EmptyPortfolio);
        }
        let mut tickers: Vec<Ticker> = account
            .ledger()
            .lots_by_purchase_date()
            .iter()
            .map(|lot| lot.ticker.clone())
            .collect();
        tickers.sort();
        tickers.dedup();
        let mut securities = Vec::with_capacity(tickers.len());
        for ticker in &tickers {
            securities.push(self.security(ticker).await?);
        }
        Ok(securities)
    }
}
