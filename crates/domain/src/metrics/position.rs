//! Distribution, leverage and collectible checks for a single position.

use crate::entities::PositionSnapshot;
use crate::error::MathError;
use crate::math::concentrated_liquidity::token_amounts_from_liquidity;
use crate::math::fixed_point::raw_to_decimal;
use crate::math::tick_math::sqrt_price_x64_to_price;
use crate::metrics::Distribution;
use rust_decimal::{Decimal, MathematicalOps};

/// Ceiling for leverage of near-zero-width ranges.
pub const MAX_LEVERAGE: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Token amounts of a position and the share of value each one represents.
///
/// `frac_a` is token A's share of the position valued in token A, `frac_b`
/// token B's share valued in token B; both views agree, so they sum to one.
pub fn distribution(
    sqrt_price: u128,
    sqrt_price_lower: u128,
    sqrt_price_upper: u128,
    liquidity: u128,
    decimals_a: u8,
    decimals_b: u8,
) -> Result<Distribution, MathError> {
    let (raw_a, raw_b) = token_amounts_from_liquidity(
        liquidity,
        sqrt_price,
        sqrt_price_lower,
        sqrt_price_upper,
        true,
    )?;
    let amount_a = raw_to_decimal(raw_a, decimals_a)?;
    let amount_b = raw_to_decimal(raw_b, decimals_b)?;
    let price = sqrt_price_x64_to_price(sqrt_price, decimals_a, decimals_b)?;
    if price <= Decimal::ZERO {
        return Err(MathError::NonPositivePrice);
    }

    let b_in_a = amount_b
        .checked_div(price)
        .ok_or(MathError::Overflow("distribution"))?;
    let a_in_b = amount_a
        .checked_mul(price)
        .ok_or(MathError::Overflow("distribution"))?;
    let total_in_a = amount_a + b_in_a;
    let total_in_b = a_in_b + amount_b;

    let frac_a = if total_in_a.is_zero() {
        Decimal::ZERO
    } else {
        amount_a / total_in_a
    };
    let frac_b = if total_in_b.is_zero() {
        Decimal::ZERO
    } else {
        amount_b / total_in_b
    };

    Ok(Distribution {
        amount_a,
        frac_a,
        amount_b,
        frac_b,
        total_in_a,
        total_in_b,
    })
}

/// Concentration of a range relative to a full-range position:
/// `1 / (1 - (lower / upper)^0.25)`.
///
/// Ranges too narrow to resolve saturate at [`MAX_LEVERAGE`].
pub fn leverage(price_lower: Decimal, price_upper: Decimal) -> Result<Decimal, MathError> {
    if price_lower <= Decimal::ZERO {
        return Err(MathError::NonPositivePrice);
    }
    if price_lower >= price_upper {
        return Err(MathError::InvalidRange {
            lower: price_lower.to_string(),
            upper: price_upper.to_string(),
        });
    }
    let ratio = price_lower / price_upper;
    let fourth_root = ratio
        .sqrt()
        .and_then(|root| root.sqrt())
        .ok_or(MathError::Overflow("leverage"))?;
    let gap = Decimal::ONE - fourth_root;
    if gap <= Decimal::ZERO {
        return Ok(MAX_LEVERAGE);
    }
    Ok(Decimal::ONE
        .checked_div(gap)
        .map_or(MAX_LEVERAGE, |value| value.min(MAX_LEVERAGE)))
}

/// Whether any trading fee is owed to the position.
pub fn has_collectible_fees(position: &PositionSnapshot) -> bool {
    position.fee_owed_a > 0 || position.fee_owed_b > 0
}

/// Whether any reward slot has an owed amount.
pub fn has_collectible_rewards(position: &PositionSnapshot) -> bool {
    position.reward_owed.iter().any(|owed| *owed > 0)
}
