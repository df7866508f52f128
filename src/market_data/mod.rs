mod provider;
#[cfg(feature = "yahoo")]
mod yahoo;

pub use provider::{PriceSeriesProvider, StaticProvider};
#[cfg(feature = "yahoo")]
pub use yahoo::YahooChartSource;
