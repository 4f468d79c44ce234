//! Jupiter swap aggregator and token list.

use crate::cache::{Clock, TtlCache};
use crate::error::ProtocolError;
use crate::transaction::PendingTransaction;
use crate::{SwapAggregator, SwapRoute, TokenRegistry};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use clmm_autopilot_domain::entities::Token;
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Jupiter v6 quote and swap API.
pub const DEFAULT_SWAP_API_URL: &str = "https://quote-api.jup.ag/v6";

/// Verified tokens on the Jupiter token API.
pub const DEFAULT_TOKEN_LIST_URL: &str = "https://tokens.jup.ag/tokens?tags=verified";

fn parse_amount(route: &Value, field: &str) -> Result<u64, ProtocolError> {
    route
        .get(field)
        .and_then(Value::as_str)
        .and_then(|amount| amount.parse().ok())
        .ok_or_else(|| ProtocolError::Decode {
            kind: "swap quote",
            address: field.to_string(),
            reason: format!("missing or invalid {field}"),
        })
}

/// Builds a [`SwapRoute`] from a v6 quote response.
pub fn route_from_quote(
    input_mint: &str,
    output_mint: &str,
    quote: Value,
) -> Result<SwapRoute, ProtocolError> {
    if quote.get("error").is_some() || quote.get("routePlan").is_none() {
        return Err(ProtocolError::NoRoute {
            input_mint: input_mint.to_string(),
            output_mint: output_mint.to_string(),
        });
    }
    Ok(SwapRoute {
        input_mint: input_mint.to_string(),
        output_mint: output_mint.to_string(),
        in_amount: parse_amount(&quote, "inAmount")?,
        out_amount: parse_amount(&quote, "outAmount")?,
        raw: quote,
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SwapResponse {
    swap_transaction: String,
}

/// Swap routing through Jupiter.
pub struct JupiterAggregator {
    http: reqwest::Client,
    base_url: String,
    slippage_bps: u32,
}

impl JupiterAggregator {
    pub fn new(base_url: impl Into<String>, slippage_bps: u32) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            slippage_bps,
        }
    }
}

#[async_trait]
impl SwapAggregator for JupiterAggregator {
    async fn quote(
        &self,
        input_mint: &str,
        output_mint: &str,
        amount: u64,
    ) -> Result<SwapRoute, ProtocolError> {
        debug!(input_mint, output_mint, amount, "Fetching swap route");
        let quote: Value = self
            .http
            .get(format!("{}/quote", self.base_url))
            .query(&[
                ("inputMint", input_mint.to_string()),
                ("outputMint", output_mint.to_string()),
                ("amount", amount.to_string()),
                ("slippageBps", self.slippage_bps.to_string()),
            ])
            .send()
            .await?
            .json()
            .await?;
        route_from_quote(input_mint, output_mint, quote)
    }

    async fn build_transactions(
        &self,
        route: &SwapRoute,
        wallet: &str,
    ) -> Result<Vec<PendingTransaction>, ProtocolError> {
        let response: SwapResponse = self
            .http
            .post(format!("{}/swap", self.base_url))
            .json(&json!({
                "quoteResponse": route.raw,
                "userPublicKey": wallet,
                "wrapAndUnwrapSol": true,
            }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let bytes = STANDARD
            .decode(response.swap_transaction.as_bytes())
            .map_err(|err| ProtocolError::Decode {
                kind: "swap transaction",
                address: route.input_mint.clone(),
                reason: err.to_string(),
            })?;
        Ok(vec![PendingTransaction::serialized(
            format!("swap {} to {}", route.input_mint, route.output_mint),
            bytes,
        )])
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenExtensions {
    coingecko_id: Option<String>,
}

/// Entry of the Jupiter token list.
#[derive(Debug, Clone, Deserialize)]
pub struct JupiterToken {
    address: String,
    symbol: String,
    name: String,
    decimals: u8,
    #[serde(default)]
    extensions: Option<TokenExtensions>,
}

impl From<JupiterToken> for Token {
    fn from(token: JupiterToken) -> Self {
        let coingecko_id = token.extensions.and_then(|ext| ext.coingecko_id);
        let base = Token::new(token.address, token.symbol, token.decimals, token.name);
        match coingecko_id {
            Some(id) => base.with_coingecko_id(id),
            None => base,
        }
    }
}

/// Indexes a token list response by mint.
pub fn index_tokens(tokens: Vec<JupiterToken>) -> HashMap<String, Token> {
    tokens
        .into_iter()
        .map(|token| (token.address.clone(), Token::from(token)))
        .collect()
}

/// Token metadata from the Jupiter token list, refreshed once per TTL.
pub struct JupiterTokenRegistry {
    http: reqwest::Client,
    url: String,
    cache: TtlCache<(), Arc<HashMap<String, Token>>>,
    clock: Arc<dyn Clock>,
}

impl JupiterTokenRegistry {
    pub fn new(url: impl Into<String>, ttl: chrono::Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
            cache: TtlCache::new(ttl),
            clock,
        }
    }

    async fn tokens(&self) -> Result<Arc<HashMap<String, Token>>, ProtocolError> {
        if let Some(tokens) = self.cache.get(&(), self.clock.as_ref()) {
            return Ok(tokens);
        }
        debug!(url = %self.url, "Fetching token list");
        let list: Vec<JupiterToken> = self
            .http
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let tokens = Arc::new(index_tokens(list));
        self.cache.insert((), tokens.clone(), self.clock.as_ref());
        Ok(tokens)
    }
}

#[async_trait]
impl TokenRegistry for JupiterTokenRegistry {
    async fn token(&self, mint: &str) -> Result<Option<Token>, ProtocolError> {
        Ok(self.tokens().await?.get(mint).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOL: &str = "So11111111111111111111111111111111111111112";
    const USDC: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

    #[test]
    fn test_route_from_quote() {
        let quote = json!({
            "inputMint": SOL,
            "outputMint": USDC,
            "inAmount": "1000000",
            "outAmount": "150000",
            "routePlan": [],
        });
        let route = route_from_quote(SOL, USDC, quote).unwrap();
        assert_eq!(route.in_amount, 1_000_000);
        assert_eq!(route.out_amount, 150_000);
        assert_eq!(route.raw["inAmount"], "1000000");
    }

    #[test]
    fn test_error_quote_is_no_route() {
        let quote = json!({ "error": "Could not find any route" });
        let err = route_from_quote(SOL, USDC, quote).unwrap_err();
        assert!(matches!(err, ProtocolError::NoRoute { .. }));
    }

    #[test]
    fn test_index_token_list() {
        let body = r#"[
            {"address": "So11111111111111111111111111111111111111112", "symbol": "SOL",
             "name": "Wrapped SOL", "decimals": 9, "extensions": {"coingeckoId": "wrapped-solana"}},
            {"address": "orcaEKTdK7LKz57vaAYr9QeNsVEPfiu6QeMU1kektZE", "symbol": "ORCA",
             "name": "Orca", "decimals": 6}
        ]"#;
        let list: Vec<JupiterToken> = serde_json::from_str(body).unwrap();
        let tokens = index_tokens(list);

        let sol = &tokens[SOL];
        assert_eq!(sol.symbol, "SOL");
        assert_eq!(sol.decimals, 9);
        assert_eq!(sol.coingecko_id.as_deref(), Some("wrapped-solana"));
        assert_eq!(tokens["orcaEKTdK7LKz57vaAYr9QeNsVEPfiu6QeMU1kektZE"].coingecko_id, None);
    }
}
