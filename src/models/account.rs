use std::fmt;
use std::str::FromStr;

use anyhow::{ensure, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TradeError;
use crate::ledger::LotLedger;
use crate::series::RequestedDate;
use crate::valuation::round_money;

use super::{LotKey, Security, Ticker};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error(
    "invalid account name {value:?}: names must be a single path segment (no '/', '\\\\', NUL, '.' or '..')"
)]
pub struct AccountNameError {
    value: String,
}

/// Account identifier, also used as the on-disk file stem.
///
/// For file-backed storage, names must be safe path segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountName(String);

impl AccountName {
    pub fn new(value: impl Into<String>) -> Result<Self, AccountNameError> {
        let value = value.into();
        if Self::is_path_safe(&value) {
            Ok(Self(value))
        } else {
            Err(AccountNameError { value })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the string is safe to use as a single path segment.
    pub fn is_path_safe(value: &str) -> bool {
        if value.is_empty() || value == "." || value == ".." {
            return false;
        }
        !value.chars().any(|c| c == '/' || c == '\\' || c == '\0')
    }
}

impl fmt::Display for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for AccountName {
    type Err = AccountNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Whether a confirmation records a purchase or a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// The committed result of one buy or sell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeConfirmation {
    pub side: TradeSide,
    pub ticker: Ticker,
    pub security_name: String,
    pub quantity: u32,
    /// The resolved trading date the shares changed hands on.
    pub trade_date: NaiveDate,
    /// Per-share closing price at `trade_date`.
    pub price: Decimal,
    /// Cost for a buy, proceeds for a sell.
    pub total: Decimal,
    pub new_balance: Decimal,
}

/// One brokerage account: cash balance plus the lot ledger.
///
/// The balance stays at two decimal places and never goes negative: a
/// buy that cannot be funded is rejected before any ledger mutation, so
/// an operation either fully commits or leaves the account untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    name: AccountName,
    balance: Decimal,
    ledger: LotLedger,
}

impl Account {
    /// Open an account with a positive starting balance.
    pub fn open(name: AccountName, opening_balance: Decimal) -> Result<Self> {
        ensure!(
            opening_balance > Decimal::ZERO,
            "opening balance must be greater than 0, got {opening_balance}"
        );
        Ok(Self {
            name,
            balance: round_money(opening_balance),
            ledger: LotLedger::new(),
        })
    }

    pub fn name(&self) -> &AccountName {
        &self.name
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn ledger(&self) -> &LotLedger {
        &self.ledger
    }

    /// Buy `quantity` shares at the close on `trade_date`.
    ///
    /// The funds check happens before the ledger is touched, so a
    /// rejected purchase leaves no trace.
    pub fn buy_lot(
        &mut self,
        security: &Security,
        quantity: u32,
        trade_date: NaiveDate,
    ) -> Result<TradeConfirmation, TradeError> {
        let price = security
            .series
            .price_at(trade_date)
            .ok_or_else(|| TradeError::DateNotFound {
                ticker: security.ticker.clone(),
                requested: RequestedDate::On(trade_date),
            })?;
        let cost = round_money(price * Decimal::from(quantity));
        if self.balance < cost {
            return Err(TradeError::InsufficientFunds {
                needed: cost,
                available: self.balance,
            });
        }

        let (key, cost) =
            self.ledger
                .open_or_grow(security.ticker.clone(), quantity, trade_date, price);
        self.balance = round_money(self.balance - cost);
        tracing::debug!(
            ticker = %key.ticker,
            quantity,
            %cost,
            balance = %self.balance,
            "purchase committed"
        );
        Ok(TradeConfirmation {
            side: TradeSide::Buy,
            ticker: security.ticker.clone(),
            security_name: security.name.clone(),
            quantity,
            trade_date,
            price,
            total: cost,
            new_balance: self.balance,
        })
    }

    /// Sell `quantity` shares out of the lot purchased on
    /// `purchase_date`, at the close on `sold_date`.
    pub fn sell_lot(
        &mut self,
        security: &Security,
        quantity: u32,
        purchase_date: NaiveDate,
        sold_date: NaiveDate,
    ) -> Result<TradeConfirmation, TradeError> {
        let sold_price =
            security
                .series
                .price_at(sold_date)
                .ok_or_else(|| TradeError::DateNotFound {
                    ticker: security.ticker.clone(),
                    requested: RequestedDate::On(sold_date),
                })?;
        let key = LotKey {
            ticker: security.ticker.clone(),
            purchase_date,
        };
        let proceeds = self
            .ledger
            .shrink_or_close(&key, quantity, sold_date, sold_price)?;
        self.balance = round_money(self.balance + proceeds);
        tracing::debug!(
            ticker = %key.ticker,
            quantity,
            %proceeds,
            balance = %self.balance,
            "sale committed"
        );
        Ok(TradeConfirmation {
            side: TradeSide::Sell,
            ticker: security.ticker.clone(),
            security_name: security.name.clone(),
            quantity,
            trade_date: sold_date,
            price: sold_price,
            total: proceeds,
            new_balance: self.balance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::PriceSeries;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn acme() -> Security {
        Security::new(
            Ticker::parse("ACME").unwrap(),
            "Acme Corp.",
            true,
            PriceSeries::from_points([
                (date(2024, 1, 2), dec("10.00")),
                (date(2024, 1, 8), dec("12.00")),
            ]),
        )
    }

    fn account(balance: &str) -> Account {
        Account::open(AccountName::new("test").unwrap(), dec(balance)).unwrap()
    }

    #[test]
    fn open_rejects_non_positive_balance() {
        let name = AccountName::new("test").unwrap();
        assert!(Account::open(name.clone(), Decimal::ZERO).is_err());
        assert!(Account::open(name, dec("-5")).is_err());
    }

    #[test]
    fn buy_debits_rounded_cost() {
        let mut account = account("1000.00");
        let confirmation = account.buy_lot(&acme(), 3, date(2024, 1, 2)).unwrap();
        assert_eq!(confirmation.total, dec("30.00"));
        assert_eq!(account.balance(), dec("970.00"));
        assert_eq!(account.ledger().open_count(), 1);
    }

    #[test]
    fn underfunded_buy_leaves_account_untouched() {
        let mut account = account("25.00");
        let err = account.buy_lot(&acme(), 3, date(2024, 1, 2)).unwrap_err();
        assert_eq!(
            err,
            TradeError::InsufficientFunds {
                needed: dec("30.00"),
                available: dec("25.00"),
            }
        );
        assert_eq!(account.balance(), dec("25.00"));
        assert!(!account.ledger().has_open_lots());
    }

    #[test]
    fn buy_on_non_trading_day_mutates_nothing() {
        let mut account = account("1000.00");
        let err = account.buy_lot(&acme(), 3, date(2024, 1, 6)).unwrap_err();
        assert!(matches!(err, TradeError::DateNotFound { .. }));
        assert_eq!(account.balance(), dec("1000.00"));
        assert!(!account.ledger().has_open_lots());
    }

    #[test]
    fn sell_credits_proceeds_from_the_sold_date_close() {
        let mut account = account("1000.00");
        account.buy_lot(&acme(), 5, date(2024, 1, 2)).unwrap();
        let confirmation = account
            .sell_lot(&acme(), 2, date(2024, 1, 2), date(2024, 1, 8))
            .unwrap();
        assert_eq!(confirmation.total, dec("24.00"));
        assert_eq!(account.balance(), dec("974.00"));
    }

    #[test]
    fn oversell_leaves_balance_and_ledger_unchanged() {
        let mut account = account("1000.00");
        account.buy_lot(&acme(), 3, date(2024, 1, 2)).unwrap();
        let err = account
            .sell_lot(&acme(), 4, date(2024, 1, 2), date(2024, 1, 8))
            .unwrap_err();
        assert!(matches!(err, TradeError::InsufficientHolding { .. }));
        assert_eq!(account.balance(), dec("970.00"));
        assert_eq!(account.ledger().open_count(), 1);
        assert!(account.ledger().closed_lots().is_empty());
    }

    #[test]
    fn serde_round_trips_balance_and_ledger_exactly() {
        let mut account = account("1000.00");
        account.buy_lot(&acme(), 5, date(2024, 1, 2)).unwrap();
        account
            .sell_lot(&acme(), 2, date(2024, 1, 2), date(2024, 1, 8))
            .unwrap();

        let json = serde_json::to_string(&account).unwrap();
        let restored: Account = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.name(), account.name());
        assert_eq!(restored.balance(), dec("974.00"));
        assert_eq!(restored.ledger().open_count(), 1);
        assert_eq!(
            restored.ledger().closed_lots(),
            account.ledger().closed_lots()
        );
    }

    #[test]
    fn account_name_rejects_unsafe_values() {
        assert!(AccountName::new("../escape").is_err());
        assert!(AccountName::new("..").is_err());
        assert!(AccountName::new(".").is_err());
        assert!(AccountName::new("foo/bar").is_err());
        assert!(AccountName::new("foo\\bar").is_err());
        assert!(AccountName::new("bad\0name").is_err());
        assert!(AccountName::new("").is_err());
        assert!(AccountName::new("alice").is_ok());
    }
}
