use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::Ticker;
use crate::series::RequestedDate;

/// Everything that can go wrong with a single buy/sell/report request.
///
/// These are request-scoped rejections, not process failures: the shell
/// displays them and the session keeps running. None of them is raised
/// after a ledger or balance mutation has started.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TradeError {
    #[error("{0} is not a valid ticker on the National Market System")]
    InvalidTicker(String),

    #[error("invalid quantity {0}: quantity must be a whole number greater than 0")]
    InvalidQuantity(i64),

    #[error("date {0:?} does not match the format YYYY-MM-DD")]
    InvalidDateFormat(String),

    #[error("{ticker} has no closing price on {requested}")]
    DateNotFound {
        ticker: Ticker,
        requested: RequestedDate,
    },

    #[error("insufficient funds: the purchase costs ${needed} but only ${available} is available")]
    InsufficientFunds { needed: Decimal, available: Decimal },

    #[error("no open lot of {ticker} purchased on {purchase_date}")]
    NoSuchHolding {
        ticker: Ticker,
        purchase_date: NaiveDate,
    },

    #[error("only {held}x {ticker} held in that lot, cannot sell {requested}")]
    InsufficientHolding {
        ticker: Ticker,
        held: u32,
        requested: u32,
    },

    #[error("the portfolio has no open lots to report on")]
    EmptyPortfolio,
}
