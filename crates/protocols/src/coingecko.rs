//! CoinGecko USD prices.

use crate::cache::{Clock, TtlCache};
use crate::error::ProtocolError;
use crate::{PriceOracle, TokenRegistry};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_PRICE_API_URL: &str = "https://api.coingecko.com/api/v3";

type SimplePriceResponse = HashMap<String, HashMap<String, Decimal>>;

/// USD price of `id` in a `/simple/price` response.
pub fn usd_from_response(response: &SimplePriceResponse, id: &str) -> Option<Decimal> {
    response.get(id).and_then(|prices| prices.get("usd")).copied()
}

/// Resolves a mint to its CoinGecko id through the token registry and
/// caches the price for the TTL.
pub struct CoinGeckoOracle {
    http: reqwest::Client,
    base_url: String,
    registry: Arc<dyn TokenRegistry>,
    cache: TtlCache<String, Option<Decimal>>,
    clock: Arc<dyn Clock>,
}

impl CoinGeckoOracle {
    pub fn new(
        base_url: impl Into<String>,
        registry: Arc<dyn TokenRegistry>,
        ttl: chrono::Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            registry,
            cache: TtlCache::new(ttl),
            clock,
        }
    }

    async fn fetch(&self, id: &str) -> Result<Option<Decimal>, ProtocolError> {
        debug!(id, "Fetching USD price");
        let response: SimplePriceResponse = self
            .http
            .get(format!("{}/simple/price", self.base_url))
            .query(&[("ids", id), ("vs_currencies", "usd")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(usd_from_response(&response, id))
    }
}

#[async_trait]
impl PriceOracle for CoinGeckoOracle {
    async fn usd_price(&self, mint: &str) -> Result<Option<Decimal>, ProtocolError> {
        let key = mint.to_string();
        if let Some(price) = self.cache.get(&key, self.clock.as_ref()) {
            return Ok(price);
        }

        let id = self
            .registry
            .token(mint)
            .await?
            .and_then(|token| token.coingecko_id);
        let price = match id {
            Some(id) => self.fetch(&id).await?,
            None => None,
        };
        self.cache.insert(key, price, self.clock.as_ref());
        Ok(price)
    }
}
