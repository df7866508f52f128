mod account;
mod lot;
mod security;

pub use account::{Account, AccountName, AccountNameError, TradeConfirmation, TradeSide};
pub use lot::{Lot, LotKey, SoldLot};
pub use security::{Security, Ticker};
