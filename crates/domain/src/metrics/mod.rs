use crate::entities::NUM_REWARDS;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub mod apr;
pub mod position;

pub use apr::{AprInputs, RewardEmission, SECONDS_PER_YEAR, estimate_apr};
pub use position::{
    MAX_LEVERAGE, distribution, has_collectible_fees, has_collectible_rewards, leverage,
};

/// Split of a position's value between its two tokens at the current price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Distribution {
    /// Token A held, in token units.
    pub amount_a: Decimal,
    /// Share of value held as token A.
    pub frac_a: Decimal,
    /// Token B held, in token units.
    pub amount_b: Decimal,
    /// Share of value held as token B.
    pub frac_b: Decimal,
    /// Whole position valued in token A.
    pub total_in_a: Decimal,
    /// Whole position valued in token B.
    pub total_in_b: Decimal,
}

/// Annualised yield estimate as fractions (0.25 = 25%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EstimatedApr {
    pub fee: Decimal,
    pub rewards: [Decimal; NUM_REWARDS],
}

impl EstimatedApr {
    /// Neutral estimate returned for degenerate inputs.
    pub const ZERO: Self = Self {
        fee: Decimal::ZERO,
        rewards: [Decimal::ZERO; NUM_REWARDS],
    };

    pub fn total(&self) -> Decimal {
        self.rewards.iter().fold(self.fee, |acc, reward| acc + *reward)
    }
}
