use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::valuation::round_money;

use super::Ticker;

/// Identity of an open lot: all shares of one ticker purchased on one
/// trading date belong to the same lot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LotKey {
    pub ticker: Ticker,
    pub purchase_date: NaiveDate,
}

/// An open position: a quantity of one security bought at one closing
/// price. Only `quantity` changes after creation; the purchase date and
/// price are the lot's cost basis and stay fixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lot {
    pub ticker: Ticker,
    pub quantity: u32,
    pub purchase_date: NaiveDate,
    /// The security's closing price exactly on `purchase_date`.
    pub purchase_price: Decimal,
}

impl Lot {
    pub fn new(
        ticker: Ticker,
        quantity: u32,
        purchase_date: NaiveDate,
        purchase_price: Decimal,
    ) -> Self {
        Self {
            ticker,
            quantity,
            purchase_date,
            purchase_price,
        }
    }

    pub fn key(&self) -> LotKey {
        LotKey {
            ticker: self.ticker.clone(),
            purchase_date: self.purchase_date,
        }
    }

    /// What the lot cost at purchase.
    pub fn cost(&self) -> Decimal {
        round_money(self.purchase_price * Decimal::from(self.quantity))
    }

    /// What the lot is worth at the given per-share price.
    pub fn value_at(&self, price: Decimal) -> Decimal {
        round_money(price * Decimal::from(self.quantity))
    }
}

/// A closed position: the sold slice of a lot, frozen at sale time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoldLot {
    pub ticker: Ticker,
    pub quantity: u32,
    pub purchase_date: NaiveDate,
    pub purchase_price: Decimal,
    pub sold_date: NaiveDate,
    pub sold_price: Decimal,
}

impl SoldLot {
    /// Split `quantity` shares off an open lot at the given sale terms.
    pub fn split_from(lot: &Lot, quantity: u32, sold_date: NaiveDate, sold_price: Decimal) -> Self {
        Self {
            ticker: lot.ticker.clone(),
            quantity,
            purchase_date: lot.purchase_date,
            purchase_price: lot.purchase_price,
            sold_date,
            sold_price,
        }
    }

    pub fn proceeds(&self) -> Decimal {
        round_money(self.sold_price * Decimal::from(self.quantity))
    }

    pub fn cost(&self) -> Decimal {
        round_money(self.purchase_price * Decimal::from(self.quantity))
    }

    /// Realized gain (negative for a loss).
    pub fn gain(&self) -> Decimal {
        self.proceeds() - self.cost()
    }
}
