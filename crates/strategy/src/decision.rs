use clmm_autopilot_domain::enums::TokenSide;
use clmm_autopilot_domain::value_objects::TickRange;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Token and amount a strategy deposits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSizing {
    pub side: TokenSide,
    pub mint: String,
    /// Raw base units.
    pub amount: u64,
}

/// Range and input chosen for opening or topping up a position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyDecision {
    pub range: TickRange,
    pub input: InputSizing,
}

impl StrategyDecision {
    pub fn tick_lower(&self) -> i32 {
        self.range.lower
    }

    pub fn tick_upper(&self) -> i32 {
        self.range.upper
    }
}

/// Outcome of a close evaluation, in the order the checks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloseDecision {
    /// Fees or rewards are still owed; never close over uncollected value.
    HoldCollectibles,
    /// Position holds no liquidity.
    NoLiquidity,
    /// Current tick dropped below the buffered lower bound.
    BelowRange {
        tick_current: i32,
        threshold: i32,
    },
    /// Current tick rose above the buffered upper bound.
    AboveRange {
        tick_current: i32,
        threshold: i32,
    },
    /// Current tick is within the range or its one-spacing buffer.
    WithinBuffer,
}

impl CloseDecision {
    pub fn should_close(&self) -> bool {
        matches!(
            self,
            CloseDecision::NoLiquidity
                | CloseDecision::BelowRange { .. }
                | CloseDecision::AboveRange { .. }
        )
    }
}

impl fmt::Display for CloseDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseDecision::HoldCollectibles => f.write_str("position has collectible fees/rewards"),
            CloseDecision::NoLiquidity => f.write_str("position has no liquidity"),
            CloseDecision::BelowRange {
                tick_current,
                threshold,
            } => write!(
                f,
                "current tick {tick_current} is below previous lower tick {threshold}"
            ),
            CloseDecision::AboveRange {
                tick_current,
                threshold,
            } => write!(
                f,
                "current tick {tick_current} is above next upper tick {threshold}"
            ),
            CloseDecision::WithinBuffer => f.write_str("current tick is within range buffer"),
        }
    }
}
