use crate::error::MathError;
use primitive_types::U256;
use rust_decimal::Decimal;

/// Number of fractional bits in a Q64.64 value.
pub const RESOLUTION: usize = 64;

/// Largest mantissa a `Decimal` can hold (2^96 - 1).
const MAX_DECIMAL_MANTISSA: u128 = 79_228_162_514_264_337_593_543_950_335;

/// Largest scale a `Decimal` supports.
const MAX_DECIMAL_SCALE: u32 = 28;

/// `2^64` as a wide integer.
#[must_use]
pub fn q64() -> U256 {
    U256::one() << RESOLUTION
}

/// `10^exp` as a wide integer.
#[must_use]
pub fn pow10(exp: u32) -> U256 {
    U256::exp10(exp as usize)
}

/// Converts `num / den` into a `Decimal`, keeping as many fractional digits as
/// fit. The quotient is truncated once, at the last representable digit.
pub fn ratio_to_decimal(num: U256, den: U256) -> Result<Decimal, MathError> {
    if den.is_zero() {
        return Err(MathError::DivisionByZero("ratio_to_decimal"));
    }
    let max = U256::from(MAX_DECIMAL_MANTISSA);
    for scale in (0..=MAX_DECIMAL_SCALE).rev() {
        let Some(scaled) = num.checked_mul(pow10(scale)) else {
            continue;
        };
        let quotient = scaled / den;
        if quotient <= max {
            let mantissa = i128::try_from(quotient.low_u128())
                .map_err(|_| MathError::Overflow("ratio_to_decimal"))?;
            return Ok(Decimal::from_i128_with_scale(mantissa, scale).normalize());
        }
    }
    Err(MathError::Overflow("ratio_to_decimal"))
}

/// Converts a Q64.64 value into a `Decimal`.
pub fn x64_to_decimal(value: u128) -> Result<Decimal, MathError> {
    ratio_to_decimal(U256::from(value), q64())
}

/// Converts a raw integer amount into token units.
pub fn raw_to_decimal(amount: u128, decimals: u8) -> Result<Decimal, MathError> {
    ratio_to_decimal(U256::from(amount), pow10(u32::from(decimals)))
}
