//! Per-pool session over the persisted record, the pool and the strategy.

use crate::config::{ExecutionSettings, PositionConfig};
use crate::context::AutomatorContext;
use crate::error::ExecutionError;
use crate::state::{PositionState, TokenShare};
use chrono::{DateTime, Utc};
use clmm_autopilot_data::{PositionKey, PositionRecord};
use clmm_autopilot_domain::entities::{
    NUM_REWARDS, PairBalances, PoolSnapshot, PositionSnapshot, TokenBalance,
};
use clmm_autopilot_domain::enums::Protocol;
use clmm_autopilot_domain::math::tick_math::{
    sqrt_price_x64_to_price, tick_to_price, tick_to_sqrt_price_x64,
};
use clmm_autopilot_domain::metrics::{
    AprInputs, Distribution, EstimatedApr, RewardEmission, distribution, estimate_apr, leverage,
};
use clmm_autopilot_domain::value_objects::TickRange;
use clmm_autopilot_strategy::{AutoSide, Strategy, StrategyKind};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Short form of a mint used when the token registry does not know it.
pub fn abbreviate_mint(mint: &str) -> String {
    if mint.len() <= 8 {
        return mint.to_string();
    }
    match (mint.get(..4), mint.get(mint.len() - 4..)) {
        (Some(head), Some(tail)) => format!("{head}..{tail}"),
        _ => mint.to_string(),
    }
}

/// Resolves and caches what the lifecycle tasks need for one configured
/// pool.
///
/// The record, pool and strategy are held in explicit cache cells: the
/// record and strategy are only refreshed on request, the pool whenever a
/// caller passes `reload`. One manager lives for one pipeline run.
pub struct PositionManager {
    ctx: Arc<AutomatorContext>,
    protocol: Protocol,
    config: PositionConfig,
    record: Option<PositionRecord>,
    pool: Option<PoolSnapshot>,
    strategy: Option<Strategy>,
}

impl PositionManager {
    pub fn new(ctx: Arc<AutomatorContext>, protocol: Protocol, config: PositionConfig) -> Self {
        Self {
            ctx,
            protocol,
            config,
            record: None,
            pool: None,
            strategy: None,
        }
    }

    pub fn config(&self) -> &PositionConfig {
        &self.config
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn context(&self) -> &AutomatorContext {
        &self.ctx
    }

    pub fn settings(&self) -> ExecutionSettings {
        self.ctx.settings
    }

    pub fn key(&self) -> PositionKey {
        PositionKey::new(self.protocol, self.config.pool.clone())
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.ctx.clock.now()
    }

    /// Persisted record, created on first access and cached afterwards.
    pub async fn record(&mut self) -> Result<&PositionRecord, ExecutionError> {
        let record = match self.record.take() {
            Some(record) => record,
            None => self.ctx.store.find_or_create(&self.key()).await?,
        };
        Ok(self.record.insert(record))
    }

    /// Drops the cached record and reads it again.
    pub async fn reload_record(&mut self) -> Result<&PositionRecord, ExecutionError> {
        self.record = None;
        self.record().await
    }

    /// Applies `update` to the record and persists it. The cache only
    /// changes once the store accepted the write.
    pub async fn update_record<F>(&mut self, update: F) -> Result<(), ExecutionError>
    where
        F: FnOnce(&mut PositionRecord, DateTime<Utc>) + Send,
    {
        let mut record = self.record().await?.clone();
        let now = self.now();
        update(&mut record, now);
        record.updated_at = now;
        self.ctx.store.save(&record).await?;
        self.record = Some(record);
        Ok(())
    }

    pub async fn pool(&mut self, reload: bool) -> Result<PoolSnapshot, ExecutionError> {
        if !reload && let Some(pool) = &self.pool {
            return Ok(pool.clone());
        }
        let pool = self.ctx.pools.get_pool(&self.config.pool).await?;
        self.pool = Some(pool.clone());
        Ok(pool)
    }

    /// Strategy named by the record, or the configured one.
    ///
    /// The balance-driven selector is resolved to a concrete strategy here,
    /// so passing `reload` re-evaluates it against current balances.
    pub async fn strategy(&mut self, reload: bool) -> Result<Strategy, ExecutionError> {
        if !reload && let Some(strategy) = self.strategy {
            return Ok(strategy);
        }

        let recorded = self.record().await?.strategy.clone();
        let kind = match recorded {
            Some(name) => name.parse::<StrategyKind>()?,
            None => self.config.strategy,
        };
        let params = self.config.strategy_params();
        let strategy = match kind.instantiate(&params) {
            Some(strategy) => strategy,
            None => {
                let pool = self.pool(false).await?;
                let balances = self.token_balances().await?;
                let price_a = self.usd_price(&pool.token_mint_a).await;
                let price_b = self.usd_price(&pool.token_mint_b).await;
                AutoSide::new(params).resolve(&balances, price_a, price_b)
            }
        };
        self.strategy = Some(strategy);
        Ok(strategy)
    }

    /// Live on-chain position of the record.
    ///
    /// A record pointing at a position that no longer exists is cleared and
    /// persisted before returning `None`.
    pub async fn position(&mut self) -> Result<Option<PositionSnapshot>, ExecutionError> {
        let Some(address) = self.record().await?.address.clone() else {
            return Ok(None);
        };
        match self.ctx.pools.get_position(&address).await {
            Ok(position) => Ok(Some(position)),
            Err(err) if err.is_not_found() => {
                self.update_record(|record, _| record.clear_position())
                    .await?;
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Wallet token account for `mint`.
    pub async fn token_account(&self, mint: &str, create: bool) -> Result<String, ExecutionError> {
        Ok(self.ctx.token_accounts.resolve_or_create(mint, create).await?)
    }

    pub async fn token_balance(&self, mint: &str) -> Result<TokenBalance, ExecutionError> {
        let account = self.token_account(mint, true).await?;
        Ok(self.ctx.token_accounts.balance_of(&account).await?)
    }

    /// Wallet balances of the pool's two tokens.
    pub async fn token_balances(&mut self) -> Result<PairBalances, ExecutionError> {
        let pool = self.pool(false).await?;
        let a = self.token_balance(&pool.token_mint_a).await?;
        let b = self.token_balance(&pool.token_mint_b).await?;
        Ok(PairBalances::new(a, b))
    }

    pub async fn token_symbol(&self, mint: &str) -> String {
        match self.ctx.tokens.token(mint).await {
            Ok(Some(token)) => token.symbol,
            _ => abbreviate_mint(mint),
        }
    }

    pub async fn token_symbols(&mut self) -> Result<(String, String), ExecutionError> {
        let pool = self.pool(false).await?;
        let a = self.token_symbol(&pool.token_mint_a).await;
        let b = self.token_symbol(&pool.token_mint_b).await;
        Ok((a, b))
    }

    /// Pair label such as `SOL/USDC`.
    pub async fn pair_label(&mut self) -> Result<String, ExecutionError> {
        let (a, b) = self.token_symbols().await?;
        Ok(format!("{a}/{b}"))
    }

    /// USD price, `None` when unknown or when the oracle is unreachable.
    pub async fn usd_price(&self, mint: &str) -> Option<Decimal> {
        self.ctx.prices.usd_price(mint).await.ok().flatten()
    }

    async fn decimals(&self, mint: &str) -> Result<u8, ExecutionError> {
        Ok(self.ctx.token_accounts.mint_decimals(mint).await?)
    }

    /// Snapshot of the live position, `None` when there is none.
    pub async fn state(&mut self) -> Result<Option<PositionState>, ExecutionError> {
        let Some(position) = self.position().await? else {
            return Ok(None);
        };
        let pool = self.pool(true).await?;
        let record = self.record().await?;
        let recorded = record.strategy.clone();
        let last_collected_at = record.last_collected_at;
        let strategy = recorded.unwrap_or_else(|| self.config.strategy.to_string());

        let decimals_a = self.decimals(&pool.token_mint_a).await?;
        let decimals_b = self.decimals(&pool.token_mint_b).await?;
        let tokens = self.pair_label().await?;

        let range = TickRange::new(position.tick_lower_index, position.tick_upper_index);
        let price_lower = tick_to_price(range.lower, decimals_a, decimals_b)?;
        let price_upper = tick_to_price(range.upper, decimals_a, decimals_b)?;
        let price_current = sqrt_price_x64_to_price(pool.sqrt_price, decimals_a, decimals_b)?;
        let split = distribution(
            pool.sqrt_price,
            tick_to_sqrt_price_x64(range.lower)?,
            tick_to_sqrt_price_x64(range.upper)?,
            position.liquidity,
            decimals_a,
            decimals_b,
        )?;

        let price_a = self.usd_price(&pool.token_mint_a).await;
        let price_b = self.usd_price(&pool.token_mint_b).await;
        let usd_value = match (price_a, price_b) {
            (Some(a), Some(b)) => Some(split.amount_a * a + split.amount_b * b),
            _ => None,
        };
        let apr = self
            .apr(
                &pool,
                &position,
                &split,
                (decimals_a, decimals_b),
                (price_a, price_b),
                last_collected_at,
            )
            .await?;

        Ok(Some(PositionState {
            tokens,
            protocol: self.protocol,
            strategy,
            pool: pool.address.clone(),
            position: position.address.clone(),
            token_mint_a: pool.token_mint_a.clone(),
            token_mint_b: pool.token_mint_b.clone(),
            tick_spacing: pool.tick_spacing,
            tick_current: pool.tick_current_index,
            tick_range: range,
            price_lower,
            price_current,
            price_upper,
            in_range: range.contains(pool.tick_current_index),
            leverage: leverage(price_lower, price_upper)?,
            token_a: TokenShare {
                amount: split.amount_a,
                distribution: split.frac_a,
            },
            token_b: TokenShare {
                amount: split.amount_b,
                distribution: split.frac_b,
            },
            usd_value,
            apr,
        }))
    }

    /// Fee yield from fees owed since the last harvest, reward yield from
    /// the pool's emission rates.
    async fn apr(
        &self,
        pool: &PoolSnapshot,
        position: &PositionSnapshot,
        split: &Distribution,
        (decimals_a, decimals_b): (u8, u8),
        (price_a, price_b): (Option<Decimal>, Option<Decimal>),
        last_collected_at: Option<DateTime<Utc>>,
    ) -> Result<EstimatedApr, ExecutionError> {
        let fees_collected_usd = match (price_a, price_b) {
            (Some(a), Some(b)) => {
                TokenBalance::new(position.fee_owed_a, decimals_a).ui_amount() * a
                    + TokenBalance::new(position.fee_owed_b, decimals_b).ui_amount() * b
            }
            _ => Decimal::ZERO,
        };
        let elapsed_secs = last_collected_at
            .map(|at| (self.now() - at).num_seconds())
            .and_then(|secs| u64::try_from(secs).ok())
            .unwrap_or(0);

        let mut rewards = [RewardEmission::default(); NUM_REWARDS];
        for (index, reward) in pool.initialized_rewards() {
            let decimals = self.decimals(&reward.mint).await?;
            let price = self.usd_price(&reward.mint).await;
            rewards[index] =
                RewardEmission::from_x64(reward.emissions_per_second_x64, decimals, price)?;
        }

        Ok(estimate_apr(&AprInputs {
            rewards: &rewards,
            fees_collected_usd,
            elapsed_secs,
            amount_a: split.amount_a,
            amount_b: split.amount_b,
            price_a,
            price_b,
            range: TickRange::new(position.tick_lower_index, position.tick_upper_index),
        }))
    }
}
