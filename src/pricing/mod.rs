use std::collections::BTreeMap;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::data::Symbol;
use crate::error::TrackerResult;

pub mod coingecko;
pub mod rate_provider;

pub use coingecko::CoinGeckoClient;
pub use rate_provider::RateProvider;

/// Remote source of USD prices for the tracked symbols
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_prices(&self) -> TrackerResult<BTreeMap<Symbol, Decimal>>;
}
