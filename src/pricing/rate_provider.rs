use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::data::{RateSnapshot, Symbol};
use crate::error::{TrackerError, TrackerResult};
use crate::pricing::PriceSource;

/// Caches the last good rate snapshot and degrades to it, or to zeros,
/// whenever the price source fails.
pub struct RateProvider {
    source: Arc<dyn PriceSource>,
    freshness: Duration,
    // held across check-then-fetch so one stale window triggers one request
    cache: Mutex<Option<RateSnapshot>>,
}

impl RateProvider {
    pub fn new(source: Arc<dyn PriceSource>, freshness: Duration) -> Self {
        Self {
            source,
            freshness,
            cache: Mutex::new(None),
        }
    }

    pub fn freshness(&self) -> Duration {
        self.freshness
    }

    /// Current USD rates. Never fails: on error the last cached snapshot
    /// is returned unchanged, or an all-zero snapshot if there is none.
    pub async fn get_rates(&self) -> RateSnapshot {
        let mut cache = self.cache.lock().await;

        if let Some(snapshot) = cache.as_ref() {
            if snapshot.is_fresh(Utc::now(), self.freshness) {
                debug!("Using cached rates");
                return snapshot.clone();
            }
        }

        info!("Fetching fresh rates from price API");
        match self.fetch_snapshot().await {
            Ok(snapshot) => {
                info!("Fresh rates loaded: {:?}", snapshot.rates);
                *cache = Some(snapshot.clone());
                snapshot
            }
            Err(e) => {
                error!("Failed to fetch rates from price API: {}", e);
                match cache.as_ref() {
                    Some(previous) => {
                        warn!("Using cached rates due to API error");
                        previous.clone()
                    }
                    None => {
                        warn!("No cached rates, returning zero rates");
                        RateSnapshot::zero()
                    }
                }
            }
        }
    }

    async fn fetch_snapshot(&self) -> TrackerResult<RateSnapshot> {
        let prices = self.source.fetch_prices().await?;

        for symbol in Symbol::ALL {
            match prices.get(&symbol) {
                Some(price) if *price >= Decimal::ZERO => {}
                Some(price) => {
                    return Err(TrackerError::InvalidPriceData(format!(
                        "negative price for {}: {}",
                        symbol, price
                    )))
                }
                None => {
                    return Err(TrackerError::InvalidPriceData(format!(
                        "no price for {}",
                        symbol
                    )))
                }
            }
        }

        Ok(RateSnapshot::new(prices, Utc::now()))
    }

    /// Cached snapshot, if any, without touching the network
    pub async fn cached(&self) -> Option<RateSnapshot> {
        self.cache.lock().await.clone()
    }

    pub async fn clear_cache(&self) {
        *self.cache.lock().await = None;
        info!("Rate cache cleared");
    }

    /// True when every tracked symbol currently has a positive price
    pub async fn is_available(&self) -> bool {
        self.get_rates().await.is_complete()
    }
}
