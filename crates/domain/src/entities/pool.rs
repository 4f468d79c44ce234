use crate::enums::TokenSide;
use serde::{Deserialize, Serialize};

/// Number of reward slots carried by every pool.
pub const NUM_REWARDS: usize = 3;

/// Base58 form of the all-zero address, used by uninitialized reward slots.
pub const DEFAULT_ADDRESS: &str = "11111111111111111111111111111111";

/// Reward emission slot of a pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardInfo {
    pub mint: String,
    pub vault: String,
    /// Tokens emitted per second as Q64.64.
    pub emissions_per_second_x64: u128,
}

impl RewardInfo {
    /// An uninitialized slot.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            mint: DEFAULT_ADDRESS.to_string(),
            vault: DEFAULT_ADDRESS.to_string(),
            emissions_per_second_x64: 0,
        }
    }

    /// Whether the slot carries a real reward mint.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.mint != DEFAULT_ADDRESS
    }
}

/// Pool state fetched once per cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub address: String,
    pub token_mint_a: String,
    pub token_mint_b: String,
    pub token_vault_a: String,
    pub token_vault_b: String,
    /// Current sqrt price as Q64.64.
    pub sqrt_price: u128,
    pub tick_current_index: i32,
    pub tick_spacing: i32,
    /// Fee rate in hundredths of a basis point.
    pub fee_rate: u16,
    pub liquidity: u128,
    pub reward_infos: [RewardInfo; NUM_REWARDS],
}

impl PoolSnapshot {
    /// Mint of the given side of the pair.
    #[must_use]
    pub fn mint(&self, side: TokenSide) -> &str {
        match side {
            TokenSide::A => &self.token_mint_a,
            TokenSide::B => &self.token_mint_b,
        }
    }

    /// Reward slots that carry a real mint.
    pub fn initialized_rewards(&self) -> impl Iterator<Item = (usize, &RewardInfo)> {
        self.reward_infos
            .iter()
            .enumerate()
            .filter(|(_, reward)| reward.is_initialized())
    }
}
