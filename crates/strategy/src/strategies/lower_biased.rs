//! Range closed just below the current price, funded with token B.

use super::{RangeStrategy, bounded_range, offset};
use crate::error::StrategyError;
use clmm_autopilot_domain::entities::PoolSnapshot;
use clmm_autopilot_domain::enums::TokenSide;
use clmm_autopilot_domain::math::tick_math::{SnapDirection, snap_to_initializable};
use clmm_autopilot_domain::value_objects::TickRange;

/// Single-sided token B range whose upper bound is the initializable tick at
/// or below the current tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LowerBiased {
    /// Range width in tick spacings.
    pub spacings: u32,
}

impl LowerBiased {
    pub const NAME: &'static str = "lower-biased";
    pub const DEFAULT_SPACINGS: u32 = 25;

    #[must_use]
    pub fn new(spacings: u32) -> Self {
        Self {
            spacings: spacings.max(1),
        }
    }
}

impl Default for LowerBiased {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SPACINGS)
    }
}

impl RangeStrategy for LowerBiased {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn input_side(&self) -> TokenSide {
        TokenSide::B
    }

    fn select_range(&self, pool: &PoolSnapshot) -> Result<TickRange, StrategyError> {
        let spacing = pool.tick_spacing;
        let upper = snap_to_initializable(pool.tick_current_index, spacing, SnapDirection::Floor)?;
        let lower = offset(0, self.spacings, spacing)
            .and_then(|width| upper.checked_sub(width))
            .map(|lower| snap_to_initializable(lower, spacing, SnapDirection::Floor))
            .transpose()?;
        bounded_range(lower, Some(upper), spacing)
    }
}
