//! Range opened just above the current price.
//!
//! The position starts out of range on the upper side, so it is funded with
//! token A alone and gradually converts into token B as the price rises
//! through it.

use super::{RangeStrategy, bounded_range, offset};
use crate::error::StrategyError;
use clmm_autopilot_domain::entities::PoolSnapshot;
use clmm_autopilot_domain::enums::TokenSide;
use clmm_autopilot_domain::math::tick_math::{SnapDirection, snap_to_initializable};
use clmm_autopilot_domain::value_objects::TickRange;

/// Single-sided token A range starting one initializable tick above the price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpperBiased {
    /// Range width in tick spacings.
    pub spacings: u32,
}

impl UpperBiased {
    pub const NAME: &'static str = "upper-biased";
    pub const DEFAULT_SPACINGS: u32 = 35;

    /// Creates the strategy; a width of zero is widened to one spacing.
    #[must_use]
    pub fn new(spacings: u32) -> Self {
        Self {
            spacings: spacings.max(1),
        }
    }
}

impl Default for UpperBiased {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SPACINGS)
    }
}

impl RangeStrategy for UpperBiased {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn input_side(&self) -> TokenSide {
        TokenSide::A
    }

    fn select_range(&self, pool: &PoolSnapshot) -> Result<TickRange, StrategyError> {
        let spacing = pool.tick_spacing;
        // The price sits somewhere inside [tick, tick + 1), so the first
        // boundary at or above it is the next multiple strictly above the
        // floored tick.
        let floor = snap_to_initializable(pool.tick_current_index, spacing, SnapDirection::Floor)?;
        let lower = floor.checked_add(spacing);
        let upper = lower.and_then(|lower| offset(lower, self.spacings, spacing));
        bounded_range(lower, upper, spacing)
    }
}
