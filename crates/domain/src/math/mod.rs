//! Fixed-point math for concentrated-liquidity pools.

/// Token amounts, liquidity and increase quotes.
pub mod concentrated_liquidity;
/// Q64.64 and wide-ratio helpers.
pub mod fixed_point;
/// Tick, sqrt-price and price conversions.
pub mod tick_math;
