//! Automator configuration.
//!
//! Loaded from a TOML file, then overridden from the environment:
//!
//! ```toml
//! interval_secs = 600
//!
//! [[portfolios]]
//! protocol = "whirlpool"
//!
//! [[portfolios.positions]]
//! pool = "HJPjoWUrhoZzkNfRpHuieeFk9WcZWjwy6PBjZ81ngndJ"
//! strategy = "auto-side"
//! distribution = 1
//! ```

use crate::error::ExecutionError;
use clmm_autopilot_data::PositionKey;
use clmm_autopilot_domain::enums::Protocol;
use clmm_autopilot_domain::value_objects::Percentage;
use clmm_autopilot_strategy::{LowerBiased, StrategyKind, StrategyParams, UpperBiased};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

pub const RPC_URL_ENV: &str = "RPC_URL";
pub const WALLET_PATH_ENV: &str = "WALLET_PATH";
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

fn default_interval_secs() -> u64 {
    600
}

fn default_reopen_after_close() -> bool {
    true
}

fn default_slippage_bps() -> u32 {
    10
}

fn default_swap_slippage_bps() -> u32 {
    50
}

fn default_dust_threshold() -> u64 {
    100
}

fn default_token_cache_ttl_secs() -> u64 {
    3600
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AutomatorConfig {
    /// Seconds between the end of one cycle and the start of the next.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Re-runs AddLiquidity after ClosePosition within the same cycle.
    #[serde(default = "default_reopen_after_close")]
    pub reopen_after_close: bool,
    /// Slippage applied to increase-liquidity quotes.
    #[serde(default = "default_slippage_bps")]
    pub slippage_bps: u32,
    #[serde(default = "default_swap_slippage_bps")]
    pub swap_slippage_bps: u32,
    /// Reward balances at or below this many base units are not swapped.
    #[serde(default = "default_dust_threshold")]
    pub dust_threshold: u64,
    /// Lifetime of cached token metadata and prices.
    #[serde(default = "default_token_cache_ttl_secs")]
    pub token_cache_ttl_secs: u64,
    #[serde(default)]
    pub rpc_url: Option<String>,
    #[serde(default)]
    pub wallet_path: Option<String>,
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default)]
    pub token_list_url: Option<String>,
    #[serde(default)]
    pub price_api_url: Option<String>,
    #[serde(default)]
    pub swap_api_url: Option<String>,
    #[serde(default)]
    pub portfolios: Vec<PortfolioConfig>,
}

/// Positions automated on one protocol.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PortfolioConfig {
    pub protocol: Protocol,
    #[serde(default)]
    pub positions: Vec<PositionConfig>,
}

/// One automated pool.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PositionConfig {
    /// Pool address.
    pub pool: String,
    /// Strategy used when the record does not name one.
    pub strategy: StrategyKind,
    /// Target allocation. Zero stops adding liquidity and closes the
    /// position on the next cycle.
    pub distribution: Decimal,
    /// Width of upper-biased ranges in tick spacings.
    #[serde(default)]
    pub ticks: Option<u32>,
    /// Width of lower-biased ranges in tick spacings.
    #[serde(default)]
    pub lower_ticks: Option<u32>,
}

impl PositionConfig {
    pub fn strategy_params(&self) -> StrategyParams {
        StrategyParams {
            upper_spacings: self.ticks.unwrap_or(UpperBiased::DEFAULT_SPACINGS),
            lower_spacings: self.lower_ticks.unwrap_or(LowerBiased::DEFAULT_SPACINGS),
        }
    }

    pub fn has_allocation(&self) -> bool {
        self.distribution > Decimal::ZERO
    }
}

/// Settings the tasks read at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionSettings {
    pub slippage: Percentage,
    /// Slippage accepted on the final withdrawal of a close.
    pub close_tolerance: Percentage,
    pub dust_threshold: u64,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            slippage: Percentage::from_bps(default_slippage_bps()),
            close_tolerance: Percentage::from_fraction(1, 1000),
            dust_threshold: default_dust_threshold(),
        }
    }
}

impl AutomatorConfig {
    /// Reads, overrides from the process environment and validates.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ExecutionError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| {
            ExecutionError::configuration(format!("cannot read {}: {err}", path.display()))
        })?;
        let mut config = Self::parse(&raw)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parses TOML without validating.
    pub fn parse(raw: &str) -> Result<Self, ExecutionError> {
        toml::from_str(raw).map_err(|err| ExecutionError::configuration(err.to_string()))
    }

    /// Environment values win over the file.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(RPC_URL_ENV) {
            self.rpc_url = Some(url);
        }
        if let Some(path) = lookup(WALLET_PATH_ENV) {
            self.wallet_path = Some(path);
        }
        if let Some(url) = lookup(DATABASE_URL_ENV) {
            self.database_url = Some(url);
        }
    }

    pub fn validate(&self) -> Result<(), ExecutionError> {
        if self.interval_secs == 0 {
            return Err(ExecutionError::configuration("interval_secs must be positive"));
        }

        let mut keys = HashSet::new();
        for (protocol, position) in self.positions() {
            if position.distribution < Decimal::ZERO {
                return Err(ExecutionError::configuration(format!(
                    "negative distribution {} for pool {}",
                    position.distribution, position.pool
                )));
            }
            if !keys.insert(PositionKey::new(protocol, position.pool.clone())) {
                return Err(ExecutionError::configuration(format!(
                    "pool {} is configured twice for {protocol}",
                    position.pool
                )));
            }
        }
        Ok(())
    }

    /// Every configured position with its protocol, in file order.
    pub fn positions(&self) -> impl Iterator<Item = (Protocol, &PositionConfig)> {
        self.portfolios.iter().flat_map(|portfolio| {
            portfolio
                .positions
                .iter()
                .map(move |position| (portfolio.protocol, position))
        })
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn token_cache_ttl(&self) -> chrono::Duration {
        i64::try_from(self.token_cache_ttl_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
    }

    pub fn settings(&self) -> ExecutionSettings {
        ExecutionSettings {
            slippage: Percentage::from_bps(self.slippage_bps),
            dust_threshold: self.dust_threshold,
            ..ExecutionSettings::default()
        }
    }

    pub fn require_rpc_url(&self) -> Result<&str, ExecutionError> {
        Self::required(self.rpc_url.as_deref(), RPC_URL_ENV)
    }

    pub fn require_wallet_path(&self) -> Result<&str, ExecutionError> {
        Self::required(self.wallet_path.as_deref(), WALLET_PATH_ENV)
    }

    pub fn require_database_url(&self) -> Result<&str, ExecutionError> {
        Self::required(self.database_url.as_deref(), DATABASE_URL_ENV)
    }

    fn required<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, ExecutionError> {
        value
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| ExecutionError::configuration(format!("{name} is not set")))
    }
}
