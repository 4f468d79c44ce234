use crate::entities::pool::NUM_REWARDS;
use serde::{Deserialize, Serialize};

/// On-chain position state.
///
/// `tick_lower_index < tick_upper_index` and both are multiples of the
/// owning pool's tick spacing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    pub address: String,
    pub whirlpool: String,
    pub position_mint: String,
    pub liquidity: u128,
    pub tick_lower_index: i32,
    pub tick_upper_index: i32,
    pub fee_owed_a: u64,
    pub fee_owed_b: u64,
    /// Amount owed per reward slot, aligned with the pool's reward infos.
    pub reward_owed: [u64; NUM_REWARDS],
}

impl PositionSnapshot {
    /// Whether the position's range contains the given tick (inclusive).
    #[must_use]
    pub fn contains_tick(&self, tick: i32) -> bool {
        tick >= self.tick_lower_index && tick <= self.tick_upper_index
    }
}
