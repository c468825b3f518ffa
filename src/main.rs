use std::sync::Arc;

use anyhow::Context;
use coin_tracker::{
    logging, AppConfig, BalanceStore, CoinGeckoClient, ErrorHandler, RateProvider, SqliteStore,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = AppConfig::from_env().context("Failed to load configuration")?;
    logging::init(&config.logging);

    let source = Arc::new(CoinGeckoClient::new(&config.price_api)?);
    let rates = Arc::new(RateProvider::new(source, config.price_api.freshness_window()));
    let kv = Arc::new(
        SqliteStore::open(&config.storage.path)
            .await
            .context("Failed to open holdings database")?,
    );
    let store = BalanceStore::new(kv, rates.clone());

    info!(
        "Price cache window: {}s, storage: {}",
        rates.freshness().num_seconds(),
        config.storage.path
    );

    if !rates.is_available().await {
        warn!("Price service unavailable, values may be stale or zero");
    }

    let holdings = store.get_all_holdings().await?;
    if holdings.is_empty() {
        info!("No holdings recorded yet");
        return Ok(());
    }

    match store.valuation().await {
        Ok(valuation) => {
            for asset in valuation.nonzero_assets() {
                info!(
                    "{}: {} @ ${} = ${} ({}%)",
                    asset.symbol,
                    asset.amount,
                    asset.price_usd.round_dp(2),
                    asset.value_usd.round_dp(2),
                    asset.share_pct
                );
            }
            info!("Total value: ${}", valuation.total_usd.round_dp(2));
        }
        Err(e) if ErrorHandler::is_transient(&e) => {
            warn!("{}, try again later", ErrorHandler::user_message(&e));
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
