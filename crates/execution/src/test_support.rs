//! In-process collaborators for execution tests.

use crate::config::{ExecutionSettings, PositionConfig};
use crate::context::AutomatorContext;
use crate::manager::PositionManager;
use async_trait::async_trait;
use chrono::Utc;
use clmm_autopilot_data::{InMemoryPositionStore, PositionKey, PositionRecord};
use clmm_autopilot_domain::entities::{
    PoolSnapshot, PositionSnapshot, RewardInfo, Token, TokenBalance,
};
use clmm_autopilot_domain::enums::Protocol;
use clmm_autopilot_domain::math::concentrated_liquidity::IncreaseLiquidityQuote;
use clmm_autopilot_domain::math::tick_math::tick_to_sqrt_price_x64;
use clmm_autopilot_domain::value_objects::{Percentage, TickRange};
use clmm_autopilot_protocols::cache::{Clock, ManualClock};
use clmm_autopilot_protocols::{
    OpenedPosition, PendingTransaction, PoolClient, PriceOracle, ProtocolError, SwapAggregator,
    SwapRoute, TokenAccountProvider, TokenRegistry, TransactionReceipt, TransactionSubmitter,
};
use clmm_autopilot_strategy::StrategyKind;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub(crate) const POOL: &str = "pool-1";
pub(crate) const MINT_A: &str = "mint-a";
pub(crate) const MINT_B: &str = "mint-b";
pub(crate) const REWARD_MINT: &str = "reward-mint";

/// Pool with spacing 64, token A with 9 decimals and token B with 6.
pub(crate) fn pool_at(tick: i32) -> PoolSnapshot {
    PoolSnapshot {
        address: POOL.to_string(),
        token_mint_a: MINT_A.to_string(),
        token_mint_b: MINT_B.to_string(),
        token_vault_a: "vault-a".to_string(),
        token_vault_b: "vault-b".to_string(),
        sqrt_price: tick_to_sqrt_price_x64(tick).unwrap(),
        tick_current_index: tick,
        tick_spacing: 64,
        fee_rate: 3000,
        liquidity: 0,
        reward_infos: std::array::from_fn(|_| RewardInfo::empty()),
    }
}

pub(crate) fn position_at(address: &str, lower: i32, upper: i32, liquidity: u128) -> PositionSnapshot {
    PositionSnapshot {
        address: address.to_string(),
        whirlpool: POOL.to_string(),
        position_mint: format!("{address}-mint"),
        liquidity,
        tick_lower_index: lower,
        tick_upper_index: upper,
        fee_owed_a: 0,
        fee_owed_b: 0,
        reward_owed: [0; 3],
    }
}

fn transaction(label: String) -> PendingTransaction {
    PendingTransaction::new(label, Vec::new())
}

#[derive(Default)]
pub(crate) struct FakePools {
    pools: Mutex<HashMap<String, PoolSnapshot>>,
    positions: Mutex<HashMap<String, PositionSnapshot>>,
    calls: Mutex<Vec<String>>,
    decreases: Mutex<Vec<(u128, u64, u64)>>,
    fail_reads: Mutex<bool>,
}

impl FakePools {
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn last_decrease(&self) -> Option<(u128, u64, u64)> {
        self.decreases.lock().unwrap().last().copied()
    }

    /// Position reads fail with an RPC error instead of `NotFound`.
    pub(crate) fn fail_position_reads(&self) {
        *self.fail_reads.lock().unwrap() = true;
    }

    fn call(&self, label: String) -> PendingTransaction {
        self.calls.lock().unwrap().push(label.clone());
        transaction(label)
    }
}

#[async_trait]
impl PoolClient for FakePools {
    async fn get_pool(&self, address: &str) -> Result<PoolSnapshot, ProtocolError> {
        self.pools
            .lock()
            .unwrap()
            .get(address)
            .cloned()
            .ok_or_else(|| ProtocolError::NotFound(address.to_string()))
    }

    async fn get_position(&self, address: &str) -> Result<PositionSnapshot, ProtocolError> {
        if *self.fail_reads.lock().unwrap() {
            return Err(ProtocolError::Rpc("connection reset".to_string()));
        }
        self.positions
            .lock()
            .unwrap()
            .get(address)
            .cloned()
            .ok_or_else(|| ProtocolError::NotFound(address.to_string()))
    }

    async fn open_position(
        &self,
        pool: &PoolSnapshot,
        range: TickRange,
        quote: &IncreaseLiquidityQuote,
    ) -> Result<OpenedPosition, ProtocolError> {
        let mut positions = self.positions.lock().unwrap();
        let address = format!("position-{}", positions.len() + 1);
        let mut position = position_at(&address, range.lower, range.upper, quote.liquidity_amount);
        position.whirlpool = pool.address.clone();
        positions.insert(address.clone(), position);
        Ok(OpenedPosition {
            position_mint: format!("{address}-mint"),
            position_address: address,
            transaction: self.call(format!("open position {range}")),
        })
    }

    async fn increase_liquidity(
        &self,
        _pool: &PoolSnapshot,
        position: &PositionSnapshot,
        _quote: &IncreaseLiquidityQuote,
    ) -> Result<PendingTransaction, ProtocolError> {
        Ok(self.call(format!("increase liquidity {}", position.address)))
    }

    async fn decrease_liquidity(
        &self,
        _pool: &PoolSnapshot,
        position: &PositionSnapshot,
        liquidity: u128,
        token_min_a: u64,
        token_min_b: u64,
    ) -> Result<PendingTransaction, ProtocolError> {
        self.decreases
            .lock()
            .unwrap()
            .push((liquidity, token_min_a, token_min_b));
        Ok(self.call(format!("decrease liquidity {}", position.address)))
    }

    async fn close_position(
        &self,
        _pool: &PoolSnapshot,
        position: &PositionSnapshot,
        _tolerance: Percentage,
    ) -> Result<PendingTransaction, ProtocolError> {
        Ok(self.call(format!("close position {}", position.address)))
    }

    async fn update_fees_and_rewards(
        &self,
        _pool: &PoolSnapshot,
        position: &PositionSnapshot,
    ) -> Result<PendingTransaction, ProtocolError> {
        Ok(self.call(format!("update fees and rewards {}", position.address)))
    }

    async fn collect_fees(
        &self,
        _pool: &PoolSnapshot,
        position: &PositionSnapshot,
    ) -> Result<PendingTransaction, ProtocolError> {
        Ok(self.call(format!("collect fees {}", position.address)))
    }

    async fn collect_reward(
        &self,
        _pool: &PoolSnapshot,
        position: &PositionSnapshot,
        reward_index: usize,
    ) -> Result<PendingTransaction, ProtocolError> {
        Ok(self.call(format!("collect reward {reward_index} {}", position.address)))
    }
}

/// Confirms everything except labels containing a registered pattern.
#[derive(Default)]
pub(crate) struct FakeSubmitter {
    failing: Mutex<Vec<String>>,
    submitted: Mutex<Vec<String>>,
}

impl FakeSubmitter {
    pub(crate) fn fail_on(&self, pattern: &str) {
        self.failing.lock().unwrap().push(pattern.to_string());
    }

    /// Labels of confirmed transactions.
    pub(crate) fn submitted(&self) -> Vec<String> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransactionSubmitter for FakeSubmitter {
    fn wallet(&self) -> String {
        "wallet".to_string()
    }

    async fn submit(
        &self,
        transaction: &PendingTransaction,
    ) -> Result<TransactionReceipt, ProtocolError> {
        let fails = self
            .failing
            .lock()
            .unwrap()
            .iter()
            .any(|pattern| transaction.label.contains(pattern.as_str()));
        if fails {
            return Err(ProtocolError::Transaction(format!(
                "simulation failed for {}",
                transaction.label
            )));
        }
        let mut submitted = self.submitted.lock().unwrap();
        submitted.push(transaction.label.clone());
        Ok(TransactionReceipt {
            signature: format!("sig-{}", submitted.len()),
            label: transaction.label.clone(),
        })
    }
}

/// Token accounts named `ata-<mint>`.
#[derive(Default)]
pub(crate) struct FakeTokenAccounts {
    balances: Mutex<HashMap<String, u64>>,
    created: Mutex<Vec<String>>,
}

impl FakeTokenAccounts {
    fn decimals(mint: &str) -> u8 {
        if mint == MINT_A { 9 } else { 6 }
    }

    /// Mints whose account was resolved with `create` set.
    pub(crate) fn created(&self) -> Vec<String> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenAccountProvider for FakeTokenAccounts {
    async fn resolve_or_create(&self, mint: &str, create: bool) -> Result<String, ProtocolError> {
        if create {
            let mut created = self.created.lock().unwrap();
            if !created.iter().any(|known| known == mint) {
                created.push(mint.to_string());
            }
        }
        Ok(format!("ata-{mint}"))
    }

    async fn balance_of(&self, account: &str) -> Result<TokenBalance, ProtocolError> {
        let mint = account.trim_start_matches("ata-");
        let amount = self.balances.lock().unwrap().get(mint).copied().unwrap_or(0);
        Ok(TokenBalance::new(amount, Self::decimals(mint)))
    }

    async fn mint_decimals(&self, mint: &str) -> Result<u8, ProtocolError> {
        Ok(Self::decimals(mint))
    }
}

#[derive(Default)]
pub(crate) struct FakePrices(Mutex<HashMap<String, Decimal>>);

#[async_trait]
impl PriceOracle for FakePrices {
    async fn usd_price(&self, mint: &str) -> Result<Option<Decimal>, ProtocolError> {
        Ok(self.0.lock().unwrap().get(mint).copied())
    }
}

#[derive(Default)]
pub(crate) struct FakeTokens(Mutex<HashMap<String, Token>>);

#[async_trait]
impl TokenRegistry for FakeTokens {
    async fn token(&self, mint: &str) -> Result<Option<Token>, ProtocolError> {
        Ok(self.0.lock().unwrap().get(mint).cloned())
    }
}

/// Routes every swap through two serialized transactions.
#[derive(Default)]
pub(crate) struct FakeSwaps {
    failing: Mutex<Vec<String>>,
    quoted: Mutex<Vec<(String, String, u64)>>,
}

impl FakeSwaps {
    pub(crate) fn fail_for(&self, input_mint: &str) {
        self.failing.lock().unwrap().push(input_mint.to_string());
    }

    pub(crate) fn quoted(&self) -> Vec<(String, String, u64)> {
        self.quoted.lock().unwrap().clone()
    }
}

#[async_trait]
impl SwapAggregator for FakeSwaps {
    async fn quote(
        &self,
        input_mint: &str,
        output_mint: &str,
        amount: u64,
    ) -> Result<SwapRoute, ProtocolError> {
        if self.failing.lock().unwrap().iter().any(|mint| mint == input_mint) {
            return Err(ProtocolError::NoRoute {
                input_mint: input_mint.to_string(),
                output_mint: output_mint.to_string(),
            });
        }
        self.quoted.lock().unwrap().push((
            input_mint.to_string(),
            output_mint.to_string(),
            amount,
        ));
        Ok(SwapRoute {
            input_mint: input_mint.to_string(),
            output_mint: output_mint.to_string(),
            in_amount: amount,
            out_amount: amount / 2,
            raw: serde_json::Value::Null,
        })
    }

    async fn build_transactions(
        &self,
        route: &SwapRoute,
        _wallet: &str,
    ) -> Result<Vec<PendingTransaction>, ProtocolError> {
        Ok((1..=2)
            .map(|step| {
                PendingTransaction::serialized(
                    format!("swap {} step {step}", route.input_mint),
                    vec![step],
                )
            })
            .collect())
    }
}

/// Fakes wired into an [`AutomatorContext`] around a single pool.
pub(crate) struct Harness {
    pub(crate) pools: Arc<FakePools>,
    pub(crate) submitter: Arc<FakeSubmitter>,
    pub(crate) accounts: Arc<FakeTokenAccounts>,
    pub(crate) prices: Arc<FakePrices>,
    pub(crate) tokens: Arc<FakeTokens>,
    pub(crate) swaps: Arc<FakeSwaps>,
    pub(crate) store: Arc<InMemoryPositionStore>,
    pub(crate) clock: Arc<ManualClock>,
}

impl Harness {
    pub(crate) fn new(pool: PoolSnapshot) -> Self {
        let pools = FakePools::default();
        pools
            .pools
            .lock()
            .unwrap()
            .insert(pool.address.clone(), pool);
        Self {
            pools: Arc::new(pools),
            submitter: Arc::new(FakeSubmitter::default()),
            accounts: Arc::new(FakeTokenAccounts::default()),
            prices: Arc::new(FakePrices::default()),
            tokens: Arc::new(FakeTokens::default()),
            swaps: Arc::new(FakeSwaps::default()),
            store: Arc::new(InMemoryPositionStore::new()),
            clock: Arc::new(ManualClock::new(Utc::now())),
        }
    }

    pub(crate) fn context(&self) -> Arc<AutomatorContext> {
        Arc::new(AutomatorContext {
            pools: self.pools.clone(),
            submitter: self.submitter.clone(),
            token_accounts: self.accounts.clone(),
            prices: self.prices.clone(),
            tokens: self.tokens.clone(),
            swaps: self.swaps.clone(),
            store: self.store.clone(),
            clock: self.clock.clone(),
            settings: ExecutionSettings::default(),
        })
    }

    pub(crate) fn position_config(strategy: StrategyKind, distribution: Decimal) -> PositionConfig {
        PositionConfig {
            pool: POOL.to_string(),
            strategy,
            distribution,
            ticks: None,
            lower_ticks: None,
        }
    }

    pub(crate) fn manager(&self, strategy: StrategyKind, distribution: Decimal) -> PositionManager {
        PositionManager::new(
            self.context(),
            Protocol::Whirlpool,
            Self::position_config(strategy, distribution),
        )
    }

    pub(crate) fn set_balance(&self, mint: &str, amount: u64) {
        self.accounts
            .balances
            .lock()
            .unwrap()
            .insert(mint.to_string(), amount);
    }

    pub(crate) fn set_price(&self, mint: &str, price: Decimal) {
        self.prices.0.lock().unwrap().insert(mint.to_string(), price);
    }

    pub(crate) fn register_token(&self, mint: &str, symbol: &str, decimals: u8) {
        self.tokens
            .0
            .lock()
            .unwrap()
            .insert(mint.to_string(), Token::new(mint, symbol, decimals, symbol));
    }

    pub(crate) fn add_position(&self, position: PositionSnapshot) {
        self.pools
            .positions
            .lock()
            .unwrap()
            .insert(position.address.clone(), position);
    }

    fn key() -> PositionKey {
        PositionKey::new(Protocol::Whirlpool, POOL)
    }

    /// Persists a record pointing at `address`.
    pub(crate) async fn attach_record(&self, address: &str, strategy: &str) {
        let now = self.clock.now();
        let mut record = PositionRecord::new(&Self::key(), now);
        record.attach(address, strategy, now);
        self.store.insert(record).await;
    }

    pub(crate) async fn stored_record(&self) -> PositionRecord {
        self.store.get(&Self::key()).await.unwrap()
    }
}
