use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{TrackerError, TrackerResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Symbol {
    BTC,
    ETH,
}

impl Symbol {
    pub const ALL: [Symbol; 2] = [Symbol::BTC, Symbol::ETH];

    /// Coin id used by the price API
    pub fn api_id(&self) -> &'static str {
        match self {
            Symbol::BTC => "bitcoin",
            Symbol::ETH => "ethereum",
        }
    }

    /// Key under which the quantity is persisted
    pub fn storage_key(&self) -> &'static str {
        match self {
            Symbol::BTC => "BTC",
            Symbol::ETH => "ETH",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.storage_key())
    }
}

impl FromStr for Symbol {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BTC" => Ok(Symbol::BTC),
            "ETH" => Ok(Symbol::ETH),
            _ => Err(TrackerError::InvalidSymbol(s.to_string())),
        }
    }
}

/// Quantity held per tracked symbol
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Holdings {
    pub amounts: BTreeMap<Symbol, Decimal>,
}

impl Holdings {
    pub fn get(&self, symbol: Symbol) -> Decimal {
        self.amounts.get(&symbol).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.values().all(|amount| amount.is_zero())
    }
}

/// USD prices plus the moment they were retrieved.
///
/// The zero fallback handed out when nothing could be fetched has no
/// `fetched_at`, so it never counts as fresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateSnapshot {
    pub rates: BTreeMap<Symbol, Decimal>,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl RateSnapshot {
    pub fn new(rates: BTreeMap<Symbol, Decimal>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            rates,
            fetched_at: Some(fetched_at),
        }
    }

    pub fn zero() -> Self {
        Self {
            rates: Symbol::ALL.iter().map(|s| (*s, Decimal::ZERO)).collect(),
            fetched_at: None,
        }
    }

    pub fn rate(&self, symbol: Symbol) -> Option<Decimal> {
        self.rates.get(&symbol).copied()
    }

    pub fn age(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.fetched_at.map(|at| now - at)
    }

    pub fn is_fresh(&self, now: DateTime<Utc>, window: Duration) -> bool {
        match self.age(now) {
            Some(age) => age < window,
            None => false,
        }
    }

    /// Every tracked symbol has a strictly positive price
    pub fn is_complete(&self) -> bool {
        self.require_complete().is_ok()
    }

    pub fn require_complete(&self) -> TrackerResult<()> {
        let missing: Vec<&str> = Symbol::ALL
            .iter()
            .filter(|s| !matches!(self.rate(**s), Some(r) if r > Decimal::ZERO))
            .map(|s| s.storage_key())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(TrackerError::MissingRates(format!(
                "no valid USD rate for {}",
                missing.join(", ")
            )))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetValuation {
    pub symbol: Symbol,
    pub amount: Decimal,
    pub price_usd: Decimal,
    pub value_usd: Decimal,
    /// Share of the portfolio's USD value, in percent with one decimal
    pub share_pct: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioValuation {
    pub assets: Vec<AssetValuation>,
    pub total_usd: Decimal,
}

impl PortfolioValuation {
    pub fn from_parts(holdings: &Holdings, rates: &RateSnapshot) -> TrackerResult<Self> {
        rates.require_complete()?;

        let mut assets = Vec::with_capacity(Symbol::ALL.len());
        let mut total_usd = Decimal::ZERO;

        for symbol in Symbol::ALL {
            let amount = holdings.get(symbol);
            let price_usd = rates.rate(symbol).unwrap_or(Decimal::ZERO);
            let value_usd = amount.checked_mul(price_usd).ok_or_else(|| {
                TrackerError::InvalidQuantity(format!(
                    "value of {} {} at ${} overflows",
                    amount, symbol, price_usd
                ))
            })?;
            total_usd = total_usd.checked_add(value_usd).ok_or_else(|| {
                TrackerError::InvalidQuantity("portfolio total overflows".to_string())
            })?;
            assets.push(AssetValuation {
                symbol,
                amount,
                price_usd,
                value_usd,
                share_pct: Decimal::ZERO,
            });
        }

        if !total_usd.is_zero() {
            let hundred = Decimal::from(100);
            for asset in assets.iter_mut() {
                asset.share_pct = (asset.value_usd / total_usd * hundred).round_dp(1);
            }
        }

        Ok(Self { assets, total_usd })
    }

    /// Rows worth drawing in an allocation chart
    pub fn nonzero_assets(&self) -> impl Iterator<Item = &AssetValuation> {
        self.assets.iter().filter(|a| a.value_usd > Decimal::ZERO)
    }
}
