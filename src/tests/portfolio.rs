use std::sync::Arc;

use chrono::Duration;
use rust_decimal::Decimal;

use crate::tests::support::{dec, prices, ScriptedSource};
use crate::{BalanceStore, RateProvider, SqliteStore, Symbol, TrackerError};

struct Portfolio {
    store: BalanceStore,
    rates: Arc<RateProvider>,
    source: Arc<ScriptedSource>,
}

async fn portfolio(freshness: Duration) -> Portfolio {
    let kv = Arc::new(SqliteStore::in_memory().await.unwrap());
    let source = Arc::new(ScriptedSource::new());
    let rates = Arc::new(RateProvider::new(source.clone(), freshness));
    Portfolio {
        store: BalanceStore::new(kv, rates.clone()),
        rates,
        source,
    }
}

#[tokio::test]
async fn test_add_remove_and_value() {
    let p = portfolio(Duration::minutes(5)).await;
    p.source.push_ok(prices("50000", "2500"));

    p.store.add("BTC", dec("1.5")).await.unwrap();
    p.store.add("BTC", dec("2")).await.unwrap();
    p.store.add("ETH", dec("3")).await.unwrap();
    p.store.remove("ETH", dec("10")).await.unwrap();

    assert_eq!(p.store.get_amount("BTC").await.unwrap(), dec("3.5"));
    assert_eq!(p.store.get_amount("ETH").await.unwrap(), Decimal::ZERO);
    assert_eq!(p.store.total("USD").await.unwrap(), dec("175000"));
}

#[tokio::test]
async fn test_holdings_valued_against_cached_rates_after_outage() {
    // zero window so every read goes to the source
    let p = portfolio(Duration::zero()).await;
    p.source.push_ok(prices("40000", "2000"));
    p.source.push_err(TrackerError::Network("timed out".into()));

    p.store.add("BTC", dec("1")).await.unwrap();
    p.store.add("ETH", dec("5")).await.unwrap();

    assert_eq!(p.store.total("USD").await.unwrap(), dec("50000"));
    // the outage serves the previous snapshot, so the total is unchanged
    assert_eq!(p.store.total("USD").await.unwrap(), dec("50000"));
    assert_eq!(p.source.calls(), 2);
}

#[tokio::test]
async fn test_valuation_breakdown() {
    let p = portfolio(Duration::minutes(5)).await;
    p.source.push_ok(prices("60000", "3000"));

    p.store.add("BTC", dec("0.25")).await.unwrap();
    p.store.add("ETH", dec("5")).await.unwrap();

    let valuation = p.store.valuation().await.unwrap();
    assert_eq!(valuation.total_usd, dec("30000"));

    let btc = &valuation.assets[0];
    assert_eq!(btc.symbol, Symbol::BTC);
    assert_eq!(btc.value_usd, dec("15000"));
    assert_eq!(btc.share_pct, dec("50.0"));

    let eth = &valuation.assets[1];
    assert_eq!(eth.symbol, Symbol::ETH);
    assert_eq!(eth.price_usd, dec("3000"));
    assert_eq!(eth.share_pct, dec("50.0"));

    // total() after valuation() reuses the fresh snapshot
    p.store.total("USD").await.unwrap();
    assert_eq!(p.source.calls(), 1);
}

#[tokio::test]
async fn test_total_recovers_once_prices_return() {
    let p = portfolio(Duration::minutes(5)).await;
    p.source.push_err(TrackerError::Http { status: 503, body: String::new() });
    p.source.push_ok(prices("30000", "1500"));

    p.store.add("ETH", dec("2")).await.unwrap();

    assert!(matches!(p.store.total("USD").await, Err(TrackerError::MissingRates(_))));
    // zero fallback is not cached, so the next call fetches again
    assert_eq!(p.rates.cached().await, None);
    assert_eq!(p.store.total("USD").await.unwrap(), dec("3000"));
    assert_eq!(p.source.calls(), 2);
}
