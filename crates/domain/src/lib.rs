//! Core domain types and pure math for concentrated-liquidity automation.
//!
//! Everything in this crate is deterministic and free of I/O: pool and
//! position snapshots, fixed-point tick conversions, curve primitives and the
//! position metrics derived from them.

/// Snapshot entities read from chain.
pub mod entities;
/// Shared enumerations.
pub mod enums;
/// Math error type.
pub mod error;
/// Fixed-point tick and liquidity math.
pub mod math;
/// Distribution, leverage and yield metrics.
pub mod metrics;
/// Value objects.
pub mod value_objects;

/// Commonly used items.
pub mod prelude {
    pub use crate::entities::{
        NUM_REWARDS, PairBalances, PoolSnapshot, PositionSnapshot, RewardInfo, Token, TokenBalance,
    };
    pub use crate::enums::{Protocol, TokenSide};
    pub use crate::error::MathError;
    pub use crate::math::concentrated_liquidity::{
        IncreaseLiquidityQuote, increase_liquidity_quote, token_amounts_from_liquidity,
    };
    pub use crate::math::tick_math::{
        MAX_TICK, MIN_TICK, SnapDirection, price_to_tick_index, snap_to_initializable,
        sqrt_price_x64_to_price, tick_to_price, tick_to_sqrt_price_x64,
    };
    pub use crate::metrics::{
        Distribution, EstimatedApr, distribution, estimate_apr, has_collectible_fees,
        has_collectible_rewards, leverage,
    };
    pub use crate::value_objects::{Percentage, TickRange};
}
