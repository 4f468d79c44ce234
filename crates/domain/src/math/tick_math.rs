//! Tick, sqrt-price and price conversions.
//!
//! Sqrt prices are Q64.64 fixed-point values, matching the on-chain
//! representation. Decimal prices are derived from them with a single
//! truncation at the end of the computation.

use crate::error::MathError;
use crate::math::fixed_point::{pow10, q64, ratio_to_decimal};
use primitive_types::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lowest tick supported by the pool program.
pub const MIN_TICK: i32 = -443_636;
/// Highest tick supported by the pool program.
pub const MAX_TICK: i32 = 443_636;
/// Sqrt price at `MIN_TICK`.
pub const MIN_SQRT_PRICE_X64: u128 = 4_295_048_016;
/// Sqrt price at `MAX_TICK`.
pub const MAX_SQRT_PRICE_X64: u128 = 79_226_673_515_401_279_992_447_579_055;

/// `sqrt(1.0001)^(2^i)` as Q32.96.
const POSITIVE_FACTORS_X96: [u128; 19] = [
    79_232_123_823_359_799_118_286_999_567,
    79_236_085_330_515_764_027_303_304_731,
    79_244_008_939_048_815_603_706_035_061,
    79_259_858_533_276_714_757_314_932_305,
    79_291_567_232_598_584_799_939_703_904,
    79_355_022_692_464_371_645_785_046_466,
    79_482_085_999_252_804_386_437_311_141,
    79_736_823_300_114_093_921_829_183_326,
    80_248_749_790_819_932_309_965_073_892,
    81_282_483_887_344_747_381_513_967_011,
    83_390_072_131_320_151_908_154_831_281,
    87_770_609_709_833_776_024_991_924_138,
    97_234_110_755_111_693_312_479_820_773,
    119_332_217_159_966_728_226_237_229_890,
    179_736_315_981_702_064_433_883_588_727,
    407_748_233_172_238_350_107_850_275_304,
    2_098_478_828_474_011_932_436_660_412_517,
    55_581_415_166_113_811_149_459_800_483_533,
    38_992_368_544_603_139_932_233_054_999_993_551,
];

/// `sqrt(1.0001)^(-2^i)` as Q64.64.
const NEGATIVE_FACTORS_X64: [u128; 19] = [
    18_445_821_805_675_392_311,
    18_444_899_583_751_176_498,
    18_443_055_278_223_354_162,
    18_439_367_220_385_604_838,
    18_431_993_317_065_449_817,
    18_417_254_355_718_160_513,
    18_387_811_781_193_591_352,
    18_329_067_761_203_520_168,
    18_212_142_134_806_087_854,
    17_980_523_815_641_551_639,
    17_526_086_738_831_147_013,
    16_651_378_430_235_024_244,
    15_030_750_278_693_429_944,
    12_247_334_978_882_834_399,
    8_131_365_268_884_726_200,
    3_584_323_654_723_342_297,
    696_457_651_847_595_233,
    26_294_789_957_452_057,
    37_481_735_321_082,
];

/// Direction used when a raw tick must land on a multiple of the spacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapDirection {
    /// Largest multiple at or below the tick.
    Floor,
    /// Smallest multiple at or above the tick.
    Ceil,
    /// Closest multiple; ties go down.
    Nearest,
}

/// Returns the Q64.64 sqrt price of a tick, `sqrt(1.0001^tick) * 2^64`.
pub fn tick_to_sqrt_price_x64(tick: i32) -> Result<u128, MathError> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(MathError::TickOutOfBounds(tick));
    }
    if tick >= 0 {
        Ok(positive_tick_to_sqrt_price(tick))
    } else {
        Ok(negative_tick_to_sqrt_price(tick))
    }
}

fn positive_tick_to_sqrt_price(tick: i32) -> u128 {
    let mut ratio = if tick & 1 != 0 {
        U256::from(POSITIVE_FACTORS_X96[0])
    } else {
        U256::one() << 96
    };
    for (bit, factor) in POSITIVE_FACTORS_X96.iter().enumerate().skip(1) {
        if tick & (1 << bit) != 0 {
            ratio = (ratio * U256::from(*factor)) >> 96;
        }
    }
    (ratio >> 32).low_u128()
}

fn negative_tick_to_sqrt_price(tick: i32) -> u128 {
    let abs_tick = tick.unsigned_abs();
    let mut ratio = if abs_tick & 1 != 0 {
        U256::from(NEGATIVE_FACTORS_X64[0])
    } else {
        q64()
    };
    for (bit, factor) in NEGATIVE_FACTORS_X64.iter().enumerate().skip(1) {
        if abs_tick & (1 << bit) != 0 {
            ratio = (ratio * U256::from(*factor)) >> 64;
        }
    }
    ratio.low_u128()
}

/// Returns the largest tick whose sqrt price is at or below `sqrt_price_x64`.
pub fn sqrt_price_x64_to_tick(sqrt_price_x64: u128) -> Result<i32, MathError> {
    if !(MIN_SQRT_PRICE_X64..=MAX_SQRT_PRICE_X64).contains(&sqrt_price_x64) {
        return Err(MathError::SqrtPriceOutOfBounds(sqrt_price_x64));
    }
    let (mut low, mut high) = (MIN_TICK, MAX_TICK);
    while low < high {
        let mid = low + (high - low + 1) / 2;
        if tick_to_sqrt_price_x64(mid)? <= sqrt_price_x64 {
            low = mid;
        } else {
            high = mid - 1;
        }
    }
    Ok(low)
}

/// Converts a Q64.64 sqrt price into the price of token A in token B units.
pub fn sqrt_price_x64_to_price(
    sqrt_price_x64: u128,
    decimals_a: u8,
    decimals_b: u8,
) -> Result<Decimal, MathError> {
    let sqrt = U256::from(sqrt_price_x64);
    let mut num = sqrt * sqrt;
    let mut den = U256::one() << 128;
    let shift = i32::from(decimals_a) - i32::from(decimals_b);
    if shift >= 0 {
        num = num
            .checked_mul(pow10(shift.unsigned_abs()))
            .ok_or(MathError::Overflow("sqrt_price_x64_to_price"))?;
    } else {
        den *= pow10(shift.unsigned_abs());
    }
    ratio_to_decimal(num, den)
}

/// Converts a decimal price back into a Q64.64 sqrt price.
pub fn price_to_sqrt_price_x64(
    price: Decimal,
    decimals_a: u8,
    decimals_b: u8,
) -> Result<u128, MathError> {
    if price <= Decimal::ZERO {
        return Err(MathError::NonPositivePrice);
    }
    let mantissa = u128::try_from(price.mantissa())
        .map_err(|_| MathError::Overflow("price_to_sqrt_price_x64"))?;
    let mut num = U256::from(mantissa) << 128;
    let mut den = pow10(price.scale());
    let shift = i32::from(decimals_b) - i32::from(decimals_a);
    if shift >= 0 {
        num = num
            .checked_mul(pow10(shift.unsigned_abs()))
            .ok_or(MathError::Overflow("price_to_sqrt_price_x64"))?;
    } else {
        den *= pow10(shift.unsigned_abs());
    }
    let sqrt = (num / den).integer_sqrt();
    if sqrt > U256::from(u128::MAX) {
        return Err(MathError::Overflow("price_to_sqrt_price_x64"));
    }
    Ok(sqrt.low_u128())
}

/// Decimal price at a tick.
pub fn tick_to_price(tick: i32, decimals_a: u8, decimals_b: u8) -> Result<Decimal, MathError> {
    sqrt_price_x64_to_price(tick_to_sqrt_price_x64(tick)?, decimals_a, decimals_b)
}

/// Tick whose price is closest to `price`, saturating at the tick bounds.
pub fn price_to_tick_index(price: Decimal, decimals_a: u8, decimals_b: u8) -> Result<i32, MathError> {
    let sqrt = price_to_sqrt_price_x64(price, decimals_a, decimals_b)?
        .clamp(MIN_SQRT_PRICE_X64, MAX_SQRT_PRICE_X64);
    let floor = sqrt_price_x64_to_tick(sqrt)?;
    if floor == MAX_TICK {
        return Ok(floor);
    }
    let below = sqrt - tick_to_sqrt_price_x64(floor)?;
    let above = tick_to_sqrt_price_x64(floor + 1)? - sqrt;
    Ok(if above < below { floor + 1 } else { floor })
}

/// Snaps a tick onto a multiple of `spacing` in the given direction.
pub fn snap_to_initializable(
    tick: i32,
    spacing: i32,
    direction: SnapDirection,
) -> Result<i32, MathError> {
    if spacing <= 0 {
        return Err(MathError::InvalidTickSpacing(spacing));
    }
    let floor = tick.div_euclid(spacing) * spacing;
    let remainder = tick - floor;
    Ok(match direction {
        SnapDirection::Floor => floor,
        SnapDirection::Ceil if remainder == 0 => tick,
        SnapDirection::Ceil => floor + spacing,
        SnapDirection::Nearest if remainder * 2 <= spacing => floor,
        SnapDirection::Nearest => floor + spacing,
    })
}

/// Whether `tick` is a valid range boundary for the spacing.
#[must_use]
pub fn is_initializable(tick: i32, spacing: i32) -> bool {
    spacing > 0 && tick.rem_euclid(spacing) == 0
}

/// Lowest initializable tick within the program bounds.
pub fn min_initializable_tick(spacing: i32) -> Result<i32, MathError> {
    snap_to_initializable(MIN_TICK, spacing, SnapDirection::Ceil)
}

/// Highest initializable tick within the program bounds.
pub fn max_initializable_tick(spacing: i32) -> Result<i32, MathError> {
    snap_to_initializable(MAX_TICK, spacing, SnapDirection::Floor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_tick_to_sqrt_price_known_values() {
        assert_eq!(tick_to_sqrt_price_x64(0).unwrap(), 1u128 << 64);
        assert_eq!(tick_to_sqrt_price_x64(1).unwrap(), 18_447_666_387_855_959_850);
        assert_eq!(tick_to_sqrt_price_x64(-1).unwrap(), 18_445_821_805_675_392_311);
        assert_eq!(tick_to_sqrt_price_x64(1000).unwrap(), 19_392_480_388_906_836_277);
        assert_eq!(tick_to_sqrt_price_x64(960).unwrap(), 19_353_736_122_490_583_312);
        assert_eq!(tick_to_sqrt_price_x64(-640).unwrap(), 17_865_821_636_704_340_278);
        assert_eq!(tick_to_sqrt_price_x64(-28800).unwrap(), 4_370_860_398_009_328_522);
    }

    #[test]
    fn test_tick_bounds() {
        assert_eq!(tick_to_sqrt_price_x64(MAX_TICK).unwrap(), MAX_SQRT_PRICE_X64);
        assert_eq!(tick_to_sqrt_price_x64(MIN_TICK).unwrap(), MIN_SQRT_PRICE_X64);
        assert_eq!(
            tick_to_sqrt_price_x64(MAX_TICK + 1),
            Err(MathError::TickOutOfBounds(MAX_TICK + 1))
        );
        assert!(tick_to_sqrt_price_x64(MIN_TICK - 1).is_err());
    }

    #[test]
    fn test_sqrt_price_to_tick_is_floor() {
        let at_1000 = tick_to_sqrt_price_x64(1000).unwrap();
        assert_eq!(sqrt_price_x64_to_tick(at_1000).unwrap(), 1000);
        assert_eq!(sqrt_price_x64_to_tick(at_1000 + 1).unwrap(), 1000);
        assert_eq!(sqrt_price_x64_to_tick(at_1000 - 1).unwrap(), 999);
        assert_eq!(sqrt_price_x64_to_tick(MIN_SQRT_PRICE_X64).unwrap(), MIN_TICK);
        assert_eq!(sqrt_price_x64_to_tick(MAX_SQRT_PRICE_X64).unwrap(), MAX_TICK);
    }

    #[test]
    fn test_sqrt_price_to_price() {
        assert_eq!(sqrt_price_x64_to_price(1 << 64, 6, 6).unwrap(), dec!(1));
        // SOL (9 decimals) against USDC (6 decimals).
        assert_eq!(sqrt_price_x64_to_price(1 << 64, 9, 6).unwrap(), dec!(1000));
        assert_eq!(sqrt_price_x64_to_price(1 << 64, 6, 9).unwrap(), dec!(0.001));
        assert_eq!(sqrt_price_x64_to_price(1 << 65, 6, 6).unwrap(), dec!(4));
    }

    #[test]
    fn test_tick_to_price_tracks_one_basis_point() {
        let price = tick_to_price(100, 6, 6).unwrap();
        let expected = dec!(1.0100496620928754);
        assert!((price - expected).abs() < dec!(0.000000001));
    }

    #[test]
    fn test_price_to_tick_index() {
        assert_eq!(price_to_tick_index(dec!(1), 6, 6).unwrap(), 0);
        assert_eq!(price_to_tick_index(dec!(1.0100496620928754), 6, 6).unwrap(), 100);
        assert!(price_to_tick_index(Decimal::ZERO, 6, 6).is_err());
    }

    #[test]
    fn test_snap_to_initializable() {
        assert_eq!(snap_to_initializable(1000, 64, SnapDirection::Floor).unwrap(), 960);
        assert_eq!(snap_to_initializable(1000, 64, SnapDirection::Ceil).unwrap(), 1024);
        assert_eq!(snap_to_initializable(1000, 64, SnapDirection::Nearest).unwrap(), 1024);
        assert_eq!(snap_to_initializable(990, 64, SnapDirection::Nearest).unwrap(), 960);
        assert_eq!(snap_to_initializable(-1000, 64, SnapDirection::Floor).unwrap(), -1024);
        assert_eq!(snap_to_initializable(-1000, 64, SnapDirection::Ceil).unwrap(), -960);
        assert_eq!(snap_to_initializable(-640, 64, SnapDirection::Floor).unwrap(), -640);
        assert_eq!(snap_to_initializable(-640, 64, SnapDirection::Ceil).unwrap(), -640);
        assert_eq!(
            snap_to_initializable(10, 0, SnapDirection::Floor),
            Err(MathError::InvalidTickSpacing(0))
        );
    }

    #[test]
    fn test_initializable_bounds() {
        assert_eq!(min_initializable_tick(64).unwrap(), -443_584);
        assert_eq!(max_initializable_tick(64).unwrap(), 443_584);
        assert!(is_initializable(-640, 64));
        assert!(!is_initializable(1000, 64));
    }

    proptest! {
        #[test]
        fn prop_sqrt_price_is_monotonic(tick in MIN_TICK..MAX_TICK) {
            let here = tick_to_sqrt_price_x64(tick).unwrap();
            let next = tick_to_sqrt_price_x64(tick + 1).unwrap();
            prop_assert!(here < next);
        }

        #[test]
        fn prop_initializable_tick_round_trips(
            spacing in prop::sample::select(vec![1, 2, 8, 64, 128, 256]),
            steps in -6_000i32..6_000,
            decimals in prop::sample::select(vec![(6u8, 6u8), (9, 6), (8, 6)]),
        ) {
            let tick = (steps * spacing).clamp(
                min_initializable_tick(spacing).unwrap(),
                max_initializable_tick(spacing).unwrap(),
            );
            let price = tick_to_price(tick, decimals.0, decimals.1).unwrap();
            let raw = price_to_tick_index(price, decimals.0, decimals.1).unwrap();
            let snapped = snap_to_initializable(raw, spacing, SnapDirection::Nearest).unwrap();
            prop_assert_eq!(snapped, tick);
        }

        #[test]
        fn prop_snap_lands_on_multiple(
            tick in MIN_TICK..=MAX_TICK,
            spacing in 1i32..=512,
        ) {
            for direction in [SnapDirection::Floor, SnapDirection::Ceil, SnapDirection::Nearest] {
                let snapped = snap_to_initializable(tick, spacing, direction).unwrap();
                prop_assert!(is_initializable(snapped, spacing));
                prop_assert!((snapped - tick).abs() < spacing);
            }
        }
    }
}
