use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::{prelude::FromPrimitive, Decimal};
use serde_json::Value;
use tracing::debug;

use crate::config::PriceApiConfig;
use crate::data::Symbol;
use crate::error::{TrackerError, TrackerResult};
use crate::pricing::PriceSource;

pub struct CoinGeckoClient {
    pub client: Client,
    pub base_url: String,
}

impl CoinGeckoClient {
    pub fn new(config: &PriceApiConfig) -> TrackerResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self::with_client(client, &config.base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn price_url(&self) -> String {
        let ids: Vec<&str> = Symbol::ALL.iter().map(|s| s.api_id()).collect();
        format!(
            "{}/simple/price?ids={}&vs_currencies=usd",
            self.base_url,
            ids.join(",")
        )
    }
}

#[async_trait]
impl PriceSource for CoinGeckoClient {
    async fn fetch_prices(&self) -> TrackerResult<BTreeMap<Symbol, Decimal>> {
        let url = self.price_url();
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TrackerError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.json::<Value>().await?;
        parse_prices(&body)
    }
}

/// Extract `{ "<coin id>": { "usd": <number> } }` for every tracked symbol
pub fn parse_prices(body: &Value) -> TrackerResult<BTreeMap<Symbol, Decimal>> {
    let mut prices = BTreeMap::new();

    for symbol in Symbol::ALL {
        let raw = body
            .get(symbol.api_id())
            .and_then(|coin| coin.get("usd"))
            .ok_or_else(|| {
                TrackerError::InvalidPriceData(format!("missing {}.usd", symbol.api_id()))
            })?;

        // as_f64 is None for quoted prices
        let value = raw.as_f64().ok_or_else(|| {
            TrackerError::InvalidPriceData(format!("{}.usd is not a number: {}", symbol.api_id(), raw))
        })?;
        let price = Decimal::from_f64(value).ok_or_else(|| {
            TrackerError::InvalidPriceData(format!("{}.usd is out of range: {}", symbol.api_id(), raw))
        })?;

        if price.is_sign_negative() {
            return Err(TrackerError::InvalidPriceData(format!(
                "{}.usd is negative: {}",
                symbol.api_id(),
                price
            )));
        }

        prices.insert(symbol, price);
    }

    Ok(prices)
}
