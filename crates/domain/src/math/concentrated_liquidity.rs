//! Curve primitives over Q64.64 sqrt prices.
//!
//! Amounts are raw token base units. Liquidity derived from an input amount
//! rounds down, token amounts derived from liquidity round up when asked to,
//! so a quote never promises more liquidity than the deposit covers.

use crate::enums::TokenSide;
use crate::error::MathError;
use crate::math::fixed_point::RESOLUTION;
use crate::math::tick_math::tick_to_sqrt_price_x64;
use crate::value_objects::{Percentage, TickRange};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

fn sorted(sqrt_price_a: u128, sqrt_price_b: u128) -> (U256, U256) {
    if sqrt_price_a <= sqrt_price_b {
        (U256::from(sqrt_price_a), U256::from(sqrt_price_b))
    } else {
        (U256::from(sqrt_price_b), U256::from(sqrt_price_a))
    }
}

fn div(num: U256, den: U256, round_up: bool) -> U256 {
    let (quotient, remainder) = num.div_mod(den);
    if round_up && !remainder.is_zero() {
        quotient + U256::one()
    } else {
        quotient
    }
}

fn to_u128(value: U256, context: &'static str) -> Result<u128, MathError> {
    if value > U256::from(u128::MAX) {
        return Err(MathError::Overflow(context));
    }
    Ok(value.low_u128())
}

/// Amount of token A between two sqrt prices.
/// delta_a = L * (sqrt_upper - sqrt_lower) / (sqrt_upper * sqrt_lower)
pub fn get_amount_a_delta(
    liquidity: u128,
    sqrt_price_a: u128,
    sqrt_price_b: u128,
    round_up: bool,
) -> Result<u128, MathError> {
    let (lower, upper) = sorted(sqrt_price_a, sqrt_price_b);
    if lower.is_zero() {
        return Err(MathError::DivisionByZero("get_amount_a_delta"));
    }
    let numerator = (U256::from(liquidity) << RESOLUTION)
        .checked_mul(upper - lower)
        .ok_or(MathError::Overflow("get_amount_a_delta"))?;
    let step = div(numerator, upper, round_up);
    to_u128(div(step, lower, round_up), "get_amount_a_delta")
}

/// Amount of token B between two sqrt prices.
/// delta_b = L * (sqrt_upper - sqrt_lower)
pub fn get_amount_b_delta(
    liquidity: u128,
    sqrt_price_a: u128,
    sqrt_price_b: u128,
    round_up: bool,
) -> Result<u128, MathError> {
    let (lower, upper) = sorted(sqrt_price_a, sqrt_price_b);
    let product = U256::from(liquidity) * (upper - lower);
    to_u128(div(product, U256::one() << RESOLUTION, round_up), "get_amount_b_delta")
}

/// Liquidity provided by an amount of token A over a sqrt price range.
pub fn get_liquidity_for_amount_a(
    amount: u64,
    sqrt_price_a: u128,
    sqrt_price_b: u128,
) -> Result<u128, MathError> {
    let (lower, upper) = sorted(sqrt_price_a, sqrt_price_b);
    if upper == lower {
        return Err(MathError::DivisionByZero("get_liquidity_for_amount_a"));
    }
    let numerator = U256::from(amount)
        .checked_mul(lower)
        .and_then(|value| value.checked_mul(upper))
        .ok_or(MathError::Overflow("get_liquidity_for_amount_a"))?;
    to_u128(
        (numerator / (upper - lower)) >> RESOLUTION,
        "get_liquidity_for_amount_a",
    )
}

/// Liquidity provided by an amount of token B over a sqrt price range.
pub fn get_liquidity_for_amount_b(
    amount: u64,
    sqrt_price_a: u128,
    sqrt_price_b: u128,
) -> Result<u128, MathError> {
    let (lower, upper) = sorted(sqrt_price_a, sqrt_price_b);
    if upper == lower {
        return Err(MathError::DivisionByZero("get_liquidity_for_amount_b"));
    }
    to_u128(
        (U256::from(amount) << RESOLUTION) / (upper - lower),
        "get_liquidity_for_amount_b",
    )
}

/// Raw token amounts held by `liquidity` over `[sqrt_lower, sqrt_upper]` at
/// the current sqrt price.
pub fn token_amounts_from_liquidity(
    liquidity: u128,
    sqrt_price_current: u128,
    sqrt_price_lower: u128,
    sqrt_price_upper: u128,
    round_up: bool,
) -> Result<(u128, u128), MathError> {
    if sqrt_price_current < sqrt_price_lower {
        let amount_a =
            get_amount_a_delta(liquidity, sqrt_price_lower, sqrt_price_upper, round_up)?;
        Ok((amount_a, 0))
    } else if sqrt_price_current < sqrt_price_upper {
        let amount_a =
            get_amount_a_delta(liquidity, sqrt_price_current, sqrt_price_upper, round_up)?;
        let amount_b =
            get_amount_b_delta(liquidity, sqrt_price_lower, sqrt_price_current, round_up)?;
        Ok((amount_a, amount_b))
    } else {
        let amount_b =
            get_amount_b_delta(liquidity, sqrt_price_lower, sqrt_price_upper, round_up)?;
        Ok((0, amount_b))
    }
}

/// Quote for depositing a single input token into a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IncreaseLiquidityQuote {
    /// Liquidity the deposit adds.
    pub liquidity_amount: u128,
    /// Expected token A spent.
    pub token_est_a: u64,
    /// Expected token B spent.
    pub token_est_b: u64,
    /// Token A cap including slippage.
    pub token_max_a: u64,
    /// Token B cap including slippage.
    pub token_max_b: u64,
}

impl IncreaseLiquidityQuote {
    /// Whether the quote adds no liquidity.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.liquidity_amount == 0
    }
}

fn saturating_u64(value: u128) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

/// Quotes the liquidity obtainable from `input_amount` of one token.
///
/// Position status is decided from the current tick: below the range only
/// token A is accepted, above it only token B, inside it either side works
/// and the other token's requirement is estimated. An input on the wrong
/// side yields an empty quote.
pub fn increase_liquidity_quote(
    input_side: TokenSide,
    input_amount: u64,
    sqrt_price: u128,
    tick_current: i32,
    range: TickRange,
    slippage: Percentage,
) -> Result<IncreaseLiquidityQuote, MathError> {
    if range.lower >= range.upper {
        return Err(MathError::InvalidRange {
            lower: range.lower.to_string(),
            upper: range.upper.to_string(),
        });
    }
    if input_amount == 0 {
        return Ok(IncreaseLiquidityQuote::default());
    }

    let sqrt_lower = tick_to_sqrt_price_x64(range.lower)?;
    let sqrt_upper = tick_to_sqrt_price_x64(range.upper)?;

    let (liquidity, est_a, est_b) = if tick_current < range.lower {
        if input_side == TokenSide::B {
            return Ok(IncreaseLiquidityQuote::default());
        }
        let liquidity = get_liquidity_for_amount_a(input_amount, sqrt_lower, sqrt_upper)?;
        let est_a = get_amount_a_delta(liquidity, sqrt_lower, sqrt_upper, true)?;
        (liquidity, est_a, 0)
    } else if tick_current < range.upper {
        let liquidity = match input_side {
            TokenSide::A => get_liquidity_for_amount_a(input_amount, sqrt_price, sqrt_upper)?,
            TokenSide::B => get_liquidity_for_amount_b(input_amount, sqrt_lower, sqrt_price)?,
        };
        let est_a = get_amount_a_delta(liquidity, sqrt_price, sqrt_upper, true)?;
        let est_b = get_amount_b_delta(liquidity, sqrt_lower, sqrt_price, true)?;
        (liquidity, est_a, est_b)
    } else {
        if input_side == TokenSide::A {
            return Ok(IncreaseLiquidityQuote::default());
        }
        let liquidity = get_liquidity_for_amount_b(input_amount, sqrt_lower, sqrt_upper)?;
        let est_b = get_amount_b_delta(liquidity, sqrt_lower, sqrt_upper, true)?;
        (liquidity, 0, est_b)
    };

    let token_est_a = saturating_u64(est_a);
    let token_est_b = saturating_u64(est_b);
    Ok(IncreaseLiquidityQuote {
        liquidity_amount: liquidity,
        token_est_a,
        token_est_b,
        token_max_a: slippage.add_to(token_est_a),
        token_max_b: slippage.add_to(token_est_b),
    })
}
