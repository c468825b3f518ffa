//! Track BTC and ETH holdings and value them with cached USD prices.
//!
//! `RateProvider` fetches prices from a `PriceSource` and keeps the last
//! good snapshot for a freshness window. `BalanceStore` persists
//! quantities in a `KeyValueStore` and prices them through the provider.

pub mod config;
pub mod data;
pub mod db;
pub mod error;
pub mod logging;
pub mod pricing;
pub mod store;

#[cfg(test)]
mod tests;

pub use config::AppConfig;
pub use data::{AssetValuation, Holdings, PortfolioValuation, RateSnapshot, Symbol};
pub use db::{KeyValueStore, SqliteStore};
pub use error::{ErrorHandler, TrackerError, TrackerResult};
pub use pricing::{CoinGeckoClient, PriceSource, RateProvider};
pub use store::BalanceStore;
