use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::data::{Holdings, PortfolioValuation, Symbol};
use crate::db::KeyValueStore;
use crate::error::{TrackerError, TrackerResult};
use crate::pricing::RateProvider;

/// Holdings per symbol, persisted as string-encoded decimals under the
/// bare symbol key.
pub struct BalanceStore {
    kv: Arc<dyn KeyValueStore>,
    rates: Arc<RateProvider>,
}

impl BalanceStore {
    pub fn new(kv: Arc<dyn KeyValueStore>, rates: Arc<RateProvider>) -> Self {
        Self { kv, rates }
    }

    /// Increase the stored quantity. Invalid arguments are logged and ignored;
    /// a sum past `Decimal::MAX` is an error and nothing is written.
    pub async fn add(&self, symbol: &str, amount: Decimal) -> TrackerResult<()> {
        let (symbol, amount) = match validate(symbol, amount) {
            Ok(valid) => valid,
            Err(e) => {
                warn!("Invalid parameters for add, skipping: {}", e);
                return Ok(());
            }
        };

        let current = self.amount_of(symbol).await?;
        let updated = current.checked_add(amount).ok_or_else(|| {
            TrackerError::InvalidQuantity(format!(
                "adding {} to {} {} overflows",
                amount, current, symbol
            ))
        })?;
        self.save(symbol, updated).await?;

        info!("Added {} {}. New total: {}", amount, symbol, updated);
        Ok(())
    }

    /// Decrease the stored quantity, never below zero. Invalid arguments are
    /// logged and ignored.
    pub async fn remove(&self, symbol: &str, amount: Decimal) -> TrackerResult<()> {
        let (symbol, amount) = match validate(symbol, amount) {
            Ok(valid) => valid,
            Err(e) => {
                warn!("Invalid parameters for remove, skipping: {}", e);
                return Ok(());
            }
        };

        let current = self.amount_of(symbol).await?;
        let updated = (current - amount).max(Decimal::ZERO);
        self.save(symbol, updated).await?;

        info!("Removed {} {}. New total: {}", amount, symbol, updated);
        Ok(())
    }

    /// Stored quantity, 0 for an unknown or empty symbol
    pub async fn get_amount(&self, symbol: &str) -> TrackerResult<Decimal> {
        match Symbol::from_str(symbol) {
            Ok(symbol) => self.amount_of(symbol).await,
            Err(_) => Ok(Decimal::ZERO),
        }
    }

    pub async fn amount_of(&self, symbol: Symbol) -> TrackerResult<Decimal> {
        let key = symbol.storage_key();
        match self.kv.get(key).await? {
            Some(raw) => decode_quantity(key, &raw),
            None => Ok(Decimal::ZERO),
        }
    }

    pub async fn get_all_holdings(&self) -> TrackerResult<Holdings> {
        let mut holdings = Holdings::default();
        for symbol in Symbol::ALL {
            holdings.amounts.insert(symbol, self.amount_of(symbol).await?);
        }
        Ok(holdings)
    }

    /// Portfolio value in `currency`; only USD is priced
    pub async fn total(&self, currency: &str) -> TrackerResult<Decimal> {
        if !currency.trim().eq_ignore_ascii_case("USD") {
            return Err(TrackerError::UnsupportedCurrency(currency.to_string()));
        }

        let valuation = self.valuation().await?;
        for asset in &valuation.assets {
            info!(
                "{}: {} x ${} = ${}",
                asset.symbol, asset.amount, asset.price_usd, asset.value_usd
            );
        }
        info!("Total: ${}", valuation.total_usd);

        Ok(valuation.total_usd)
    }

    /// Per-asset USD values and allocation shares
    pub async fn valuation(&self) -> TrackerResult<PortfolioValuation> {
        let rates = self.rates.get_rates().await;
        let holdings = self.get_all_holdings().await?;
        PortfolioValuation::from_parts(&holdings, &rates)
    }

    pub async fn clear_all(&self) -> TrackerResult<()> {
        for symbol in Symbol::ALL {
            self.kv.remove(symbol.storage_key()).await?;
        }
        info!("All holdings cleared");
        Ok(())
    }

    async fn save(&self, symbol: Symbol, amount: Decimal) -> TrackerResult<()> {
        self.kv
            .set(symbol.storage_key(), &encode_quantity(amount))
            .await
    }
}

fn validate(symbol: &str, amount: Decimal) -> TrackerResult<(Symbol, Decimal)> {
    let symbol = Symbol::from_str(symbol)?;
    if amount <= Decimal::ZERO {
        return Err(TrackerError::InvalidQuantity(format!(
            "amount must be positive, got {}",
            amount
        )));
    }
    Ok((symbol, amount))
}

pub fn encode_quantity(amount: Decimal) -> String {
    amount.normalize().to_string()
}

/// Parse a persisted quantity. Exponent notation is accepted for values
/// written as `1e-7`; anything unparseable or negative is corruption.
pub fn decode_quantity(key: &str, raw: &str) -> TrackerResult<Decimal> {
    let trimmed = raw.trim();
    let parsed = Decimal::from_str(trimmed).or_else(|_| Decimal::from_scientific(trimmed));

    match parsed {
        Ok(amount) if !amount.is_sign_negative() || amount.is_zero() => Ok(amount),
        _ => Err(TrackerError::CorruptedValue {
            key: key.to_string(),
            value: raw.to_string(),
        }),
    }
}
