pub mod broker;
pub mod clock;
pub mod config;
pub mod error;
pub mod format;
pub mod ledger;
pub mod market_data;
pub mod models;
pub mod series;
pub mod storage;
pub mod validate;
pub mod valuation;
