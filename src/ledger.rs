//! The lot ledger: every open purchase lot and every closed position for
//! one account.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TradeError;
use crate::models::{Lot, LotKey, SoldLot, Ticker};

/// Open lots keyed by `(ticker, purchase_date)` plus the sequence of
/// closed positions. At most one open lot exists per key; a repeat
/// purchase on the same resolved trading date grows the existing lot.
///
/// Serializes as plain lot vectors so the on-disk account file stays a
/// simple JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "LedgerRepr", into = "LedgerRepr")]
pub struct LotLedger {
    open: BTreeMap<LotKey, Lot>,
    closed: Vec<SoldLot>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerRepr {
    open: Vec<Lot>,
    closed: Vec<SoldLot>,
}

impl From<LotLedger> for LedgerRepr {
    fn from(ledger: LotLedger) -> Self {
        Self {
            open: ledger.open.into_values().collect(),
            closed: ledger.closed,
        }
    }
}

impl From<LedgerRepr> for LotLedger {
    fn from(repr: LedgerRepr) -> Self {
        let mut open = BTreeMap::new();
        for lot in repr.open {
            open.insert(lot.key(), lot);
        }
        Self {
            open,
            closed: repr.closed,
        }
    }
}

impl LotLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a purchase: grow the lot for `(ticker, purchase_date)` or
    /// open a new one. Returns the lot key and the incremental cost of
    /// this purchase. The cost basis of an existing lot is never
    /// rewritten by later purchases.
    pub fn open_or_grow(
        &mut self,
        ticker: Ticker,
        quantity: u32,
        purchase_date: NaiveDate,
        purchase_price: Decimal,
    ) -> (LotKey, Decimal) {
        let key = LotKey {
            ticker,
            purchase_date,
        };
        let lot = match self.open.entry(key.clone()) {
            Entry::Occupied(entry) => {
                let lot = entry.into_mut();
                lot.quantity += quantity;
                lot
            }
            Entry::Vacant(entry) => entry.insert(Lot::new(
                key.ticker.clone(),
                quantity,
                purchase_date,
                purchase_price,
            )),
        };
        let cost = crate::valuation::round_money(lot.purchase_price * Decimal::from(quantity));
        (key, cost)
    }

    /// Record a sale against the lot at `key`: shrink it, or remove it
    /// when the full quantity is sold. Either way exactly one `SoldLot`
    /// carrying the sold quantity is appended. Returns the proceeds.
    /// The ledger is untouched on failure.
    pub fn shrink_or_close(
        &mut self,
        key: &LotKey,
        quantity: u32,
        sold_date: NaiveDate,
        sold_price: Decimal,
    ) -> Result<Decimal, TradeError> {
        let lot = self.open.get(key).ok_or_else(|| TradeError::NoSuchHolding {
            ticker: key.ticker.clone(),
            purchase_date: key.purchase_date,
        })?;
        if quantity > lot.quantity {
            return Err(TradeError::InsufficientHolding {
                ticker: key.ticker.clone(),
                held: lot.quantity,
                requested: quantity,
            });
        }

        let sold = SoldLot::split_from(lot, quantity, sold_date, sold_price);
        if quantity == lot.quantity {
            self.open.remove(key);
        } else if let Some(lot) = self.open.get_mut(key) {
            lot.quantity -= quantity;
        }
        let proceeds = sold.proceeds();
        self.closed.push(sold);
        Ok(proceeds)
    }

    pub fn lot(&self, key: &LotKey) -> Option<&Lot> {
        self.open.get(key)
    }

    /// Open lots ordered by purchase date (ties broken by ticker), the
    /// order valuation reconstruction needs.
    pub fn lots_by_purchase_date(&self) -> Vec<&Lot> {
        let mut lots: Vec<&Lot> = self.open.values().collect();
        lots.sort_by(|a, b| {
            a.purchase_date
                .cmp(&b.purchase_date)
                .then_with(|| a.ticker.cmp(&b.ticker))
        });
        lots
    }

    pub fn closed_lots(&self) -> &[SoldLot] {
        &self.closed
    }

    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    pub fn has_open_lots(&self) -> bool {
        !self.open.is_empty()
    }
}
