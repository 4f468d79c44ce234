//! Collaborators of the automator and their on-chain and HTTP adapters.
//!
//! The traits in this module are what the execution layer depends on. The
//! submodules hold the concrete adapters: Solana RPC, Orca Whirlpools,
//! Jupiter and CoinGecko.

/// Expiring cache and clocks.
pub mod cache;
/// CoinGecko price oracle.
pub mod coingecko;
/// Protocol errors.
pub mod error;
/// Jupiter swap aggregator and token list.
pub mod jupiter;
/// Orca Whirlpools.
pub mod orca;
/// Solana RPC provider, wallet submitter and token accounts.
pub mod rpc;
/// Pending transactions and receipts.
pub mod transaction;

pub use error::ProtocolError;
pub use transaction::{PendingTransaction, TransactionPayload, TransactionReceipt};

use async_trait::async_trait;
use clmm_autopilot_domain::entities::{PoolSnapshot, PositionSnapshot, Token, TokenBalance};
use clmm_autopilot_domain::math::concentrated_liquidity::IncreaseLiquidityQuote;
use clmm_autopilot_domain::value_objects::{Percentage, TickRange};
use rust_decimal::Decimal;

/// Result of building an open-position request.
#[derive(Debug, Clone)]
pub struct OpenedPosition {
    pub position_mint: String,
    pub position_address: String,
    pub transaction: PendingTransaction,
}

/// Reads pool and position accounts and builds liquidity requests.
#[async_trait]
pub trait PoolClient: Send + Sync {
    async fn get_pool(&self, address: &str) -> Result<PoolSnapshot, ProtocolError>;

    /// Fails with [`ProtocolError::NotFound`] when the account is gone.
    async fn get_position(&self, address: &str) -> Result<PositionSnapshot, ProtocolError>;

    async fn open_position(
        &self,
        pool: &PoolSnapshot,
        range: TickRange,
        quote: &IncreaseLiquidityQuote,
    ) -> Result<OpenedPosition, ProtocolError>;

    async fn increase_liquidity(
        &self,
        pool: &PoolSnapshot,
        position: &PositionSnapshot,
        quote: &IncreaseLiquidityQuote,
    ) -> Result<PendingTransaction, ProtocolError>;

    async fn decrease_liquidity(
        &self,
        pool: &PoolSnapshot,
        position: &PositionSnapshot,
        liquidity: u128,
        token_min_a: u64,
        token_min_b: u64,
    ) -> Result<PendingTransaction, ProtocolError>;

    /// Withdraws what is left, harvests and burns the position.
    async fn close_position(
        &self,
        pool: &PoolSnapshot,
        position: &PositionSnapshot,
        tolerance: Percentage,
    ) -> Result<PendingTransaction, ProtocolError>;

    async fn update_fees_and_rewards(
        &self,
        pool: &PoolSnapshot,
        position: &PositionSnapshot,
    ) -> Result<PendingTransaction, ProtocolError>;

    async fn collect_fees(
        &self,
        pool: &PoolSnapshot,
        position: &PositionSnapshot,
    ) -> Result<PendingTransaction, ProtocolError>;

    async fn collect_reward(
        &self,
        pool: &PoolSnapshot,
        position: &PositionSnapshot,
        reward_index: usize,
    ) -> Result<PendingTransaction, ProtocolError>;
}

/// Signs, sends and confirms transactions for the wallet.
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    /// Wallet public key.
    fn wallet(&self) -> String;

    async fn submit(
        &self,
        transaction: &PendingTransaction,
    ) -> Result<TransactionReceipt, ProtocolError>;
}

/// Wallet token accounts.
#[async_trait]
pub trait TokenAccountProvider: Send + Sync {
    /// Associated account of the wallet for `mint`, created when missing and
    /// `create` is set.
    async fn resolve_or_create(&self, mint: &str, create: bool) -> Result<String, ProtocolError>;

    async fn balance_of(&self, account: &str) -> Result<TokenBalance, ProtocolError>;

    async fn mint_decimals(&self, mint: &str) -> Result<u8, ProtocolError>;
}

/// USD prices by mint.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// `None` when the token has no known price.
    async fn usd_price(&self, mint: &str) -> Result<Option<Decimal>, ProtocolError>;
}

/// Token metadata by mint.
#[async_trait]
pub trait TokenRegistry: Send + Sync {
    async fn token(&self, mint: &str) -> Result<Option<Token>, ProtocolError>;
}

/// Quote from a swap aggregator.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapRoute {
    pub input_mint: String,
    pub output_mint: String,
    pub in_amount: u64,
    pub out_amount: u64,
    /// Aggregator-specific payload passed back when building transactions.
    pub raw: serde_json::Value,
}

#[async_trait]
pub trait SwapAggregator: Send + Sync {
    async fn quote(
        &self,
        input_mint: &str,
        output_mint: &str,
        amount: u64,
    ) -> Result<SwapRoute, ProtocolError>;

    /// Transactions to submit in order.
    async fn build_transactions(
        &self,
        route: &SwapRoute,
        wallet: &str,
    ) -> Result<Vec<PendingTransaction>, ProtocolError>;
}

/// Commonly used items.
pub mod prelude {
    pub use crate::cache::{Clock, ManualClock, SystemClock, TtlCache};
    pub use crate::error::ProtocolError;
    pub use crate::transaction::{PendingTransaction, TransactionPayload, TransactionReceipt};
    pub use crate::{
        OpenedPosition, PoolClient, PriceOracle, SwapAggregator, SwapRoute, TokenAccountProvider,
        TokenRegistry, TransactionSubmitter,
    };
}
