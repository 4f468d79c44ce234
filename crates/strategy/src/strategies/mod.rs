//! Strategy trait and the closed set of strategies.

mod auto_side;
mod lower_biased;
mod upper_biased;

pub use auto_side::AutoSide;
pub use lower_biased::LowerBiased;
pub use upper_biased::UpperBiased;

use crate::decision::{CloseDecision, InputSizing, StrategyDecision};
use crate::error::StrategyError;
use clmm_autopilot_domain::entities::{PairBalances, PoolSnapshot, PositionSnapshot};
use clmm_autopilot_domain::enums::TokenSide;
use clmm_autopilot_domain::math::tick_math::{
    SnapDirection, max_initializable_tick, min_initializable_tick, snap_to_initializable,
};
use clmm_autopilot_domain::metrics::{has_collectible_fees, has_collectible_rewards};
use clmm_autopilot_domain::value_objects::TickRange;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Policy that places a single-sided range and decides when to close it.
pub trait RangeStrategy {
    /// Name persisted with the position.
    fn name(&self) -> &'static str;

    /// Token deposited when opening or increasing.
    fn input_side(&self) -> TokenSide;

    /// Range for a new position. Both bounds are multiples of the pool's
    /// tick spacing and `lower < upper`.
    fn select_range(&self, pool: &PoolSnapshot) -> Result<TickRange, StrategyError>;

    /// Deposits the whole wallet balance of the input token.
    fn size_input(&self, pool: &PoolSnapshot, balances: &PairBalances) -> InputSizing {
        let side = self.input_side();
        InputSizing {
            side,
            mint: pool.mint(side).to_string(),
            amount: balances.side(side).amount,
        }
    }

    /// Runs the close checks and reports which one decided.
    fn evaluate_close(
        &self,
        pool: &PoolSnapshot,
        position: &PositionSnapshot,
    ) -> Result<CloseDecision, StrategyError> {
        evaluate_close(pool, position)
    }

    fn should_close(
        &self,
        pool: &PoolSnapshot,
        position: &PositionSnapshot,
    ) -> Result<bool, StrategyError> {
        Ok(self.evaluate_close(pool, position)?.should_close())
    }

    /// Range plus sized input for a new position.
    fn decide(
        &self,
        pool: &PoolSnapshot,
        balances: &PairBalances,
    ) -> Result<StrategyDecision, StrategyError> {
        Ok(StrategyDecision {
            range: self.select_range(pool)?,
            input: self.size_input(pool, balances),
        })
    }
}

/// Shared close policy.
///
/// Checks run in order: owed fees or rewards hold the position, an empty
/// position closes, and otherwise the current tick must stay within one tick
/// spacing of the range on either side.
pub fn evaluate_close(
    pool: &PoolSnapshot,
    position: &PositionSnapshot,
) -> Result<CloseDecision, StrategyError> {
    if has_collectible_fees(position) || has_collectible_rewards(position) {
        return Ok(CloseDecision::HoldCollectibles);
    }
    if position.liquidity == 0 {
        return Ok(CloseDecision::NoLiquidity);
    }

    let spacing = pool.tick_spacing;
    let tick_current = pool.tick_current_index;
    let lower = snap_to_initializable(
        position.tick_lower_index - spacing,
        spacing,
        SnapDirection::Floor,
    )?;
    let upper = snap_to_initializable(
        position.tick_upper_index + spacing,
        spacing,
        SnapDirection::Ceil,
    )?;

    if tick_current < lower {
        return Ok(CloseDecision::BelowRange {
            tick_current,
            threshold: lower,
        });
    }
    if tick_current > upper {
        return Ok(CloseDecision::AboveRange {
            tick_current,
            threshold: upper,
        });
    }
    Ok(CloseDecision::WithinBuffer)
}

/// `base + steps * spacing`, checked against i32 overflow.
fn offset(base: i32, steps: u32, spacing: i32) -> Option<i32> {
    i32::try_from(steps)
        .ok()
        .and_then(|steps| steps.checked_mul(spacing))
        .and_then(|delta| base.checked_add(delta))
}

/// Validates a proposed range against the program's initializable bounds.
fn bounded_range(
    lower: Option<i32>,
    upper: Option<i32>,
    spacing: i32,
) -> Result<TickRange, StrategyError> {
    let min = min_initializable_tick(spacing)?;
    let max = max_initializable_tick(spacing)?;
    match (lower, upper) {
        (Some(lower), Some(upper)) if lower >= min && upper <= max && lower < upper => {
            Ok(TickRange::new(lower, upper))
        }
        (lower, upper) => Err(StrategyError::RangeOutOfBounds {
            lower: lower.unwrap_or(i32::MIN),
            upper: upper.unwrap_or(i32::MAX),
        }),
    }
}

/// Tunables shared by the strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyParams {
    /// Width of an [`UpperBiased`] range in tick spacings.
    pub upper_spacings: u32,
    /// Width of a [`LowerBiased`] range in tick spacings.
    pub lower_spacings: u32,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            upper_spacings: UpperBiased::DEFAULT_SPACINGS,
            lower_spacings: LowerBiased::DEFAULT_SPACINGS,
        }
    }
}

/// Strategy names accepted in configuration and persisted records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    #[serde(alias = "one-tick-upper")]
    UpperBiased,
    #[serde(alias = "one-tick-lower")]
    LowerBiased,
    /// Chooses between the two biased strategies from wallet balances.
    #[serde(alias = "one-tick")]
    AutoSide,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::UpperBiased => UpperBiased::NAME,
            StrategyKind::LowerBiased => LowerBiased::NAME,
            StrategyKind::AutoSide => AutoSide::NAME,
        }
    }

    /// The concrete strategy, or `None` for the balance-driven selector.
    pub fn instantiate(&self, params: &StrategyParams) -> Option<Strategy> {
        match self {
            StrategyKind::UpperBiased => Some(Strategy::UpperBiased(UpperBiased::new(
                params.upper_spacings,
            ))),
            StrategyKind::LowerBiased => Some(Strategy::LowerBiased(LowerBiased::new(
                params.lower_spacings,
            ))),
            StrategyKind::AutoSide => None,
        }
    }
}

impl FromStr for StrategyKind {
    type Err = StrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upper-biased" | "one-tick-upper" => Ok(StrategyKind::UpperBiased),
            "lower-biased" | "one-tick-lower" => Ok(StrategyKind::LowerBiased),
            "auto-side" | "one-tick" => Ok(StrategyKind::AutoSide),
            other => Err(StrategyError::UnknownStrategy(other.to_string())),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concrete, range-placing strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    UpperBiased(UpperBiased),
    LowerBiased(LowerBiased),
}

impl Strategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::UpperBiased(_) => StrategyKind::UpperBiased,
            Strategy::LowerBiased(_) => StrategyKind::LowerBiased,
        }
    }
}

impl RangeStrategy for Strategy {
    fn name(&self) -> &'static str {
        match self {
            Strategy::UpperBiased(inner) => inner.name(),
            Strategy::LowerBiased(inner) => inner.name(),
        }
    }

    fn input_side(&self) -> TokenSide {
        match self {
            Strategy::UpperBiased(inner) => inner.input_side(),
            Strategy::LowerBiased(inner) => inner.input_side(),
        }
    }

    fn select_range(&self, pool: &PoolSnapshot) -> Result<TickRange, StrategyError> {
        match self {
            Strategy::UpperBiased(inner) => inner.select_range(pool),
            Strategy::LowerBiased(inner) => inner.select_range(pool),
        }
    }

    fn evaluate_close(
        &self,
        pool: &PoolSnapshot,
        position: &PositionSnapshot,
    ) -> Result<CloseDecision, StrategyError> {
        match self {
            Strategy::UpperBiased(inner) => inner.evaluate_close(pool, position),
            Strategy::LowerBiased(inner) => inner.evaluate_close(pool, position),
        }
    }
}
