//! Yield estimation for an open position.

use crate::entities::NUM_REWARDS;
use crate::error::MathError;
use crate::math::fixed_point::{pow10, ratio_to_decimal};
use crate::metrics::EstimatedApr;
use crate::value_objects::TickRange;
use primitive_types::U256;
use rust_decimal::Decimal;

/// 365 days.
pub const SECONDS_PER_YEAR: u64 = 60 * 60 * 24 * 365;

/// Emission rate of one reward slot with its USD price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RewardEmission {
    /// Token units emitted per second.
    pub per_second: Decimal,
    /// `None` when no price is available.
    pub price_usd: Option<Decimal>,
}

impl RewardEmission {
    /// Builds an emission from a Q64.64 raw-unit rate.
    pub fn from_x64(
        emissions_per_second_x64: u128,
        decimals: u8,
        price_usd: Option<Decimal>,
    ) -> Result<Self, MathError> {
        let den = (U256::one() << 64) * pow10(u32::from(decimals));
        Ok(Self {
            per_second: ratio_to_decimal(U256::from(emissions_per_second_x64), den)?,
            price_usd,
        })
    }
}

/// Inputs of [`estimate_apr`].
#[derive(Debug, Clone, Copy)]
pub struct AprInputs<'a> {
    /// Reward slots of the pool, in slot order.
    pub rewards: &'a [RewardEmission],
    /// USD value of fees accrued since the last harvest.
    pub fees_collected_usd: Decimal,
    /// Seconds elapsed since the last harvest.
    pub elapsed_secs: u64,
    /// Token A held by the position, in token units.
    pub amount_a: Decimal,
    /// Token B held by the position, in token units.
    pub amount_b: Decimal,
    pub price_a: Option<Decimal>,
    pub price_b: Option<Decimal>,
    pub range: TickRange,
}

fn positive(price: Option<Decimal>) -> Option<Decimal> {
    price.filter(|value| *value > Decimal::ZERO)
}

/// Annualised fee and reward yield relative to the position's USD value.
///
/// Degenerate inputs (no fees, a missing or non-positive token price, an
/// inverted range, zero elapsed time or zero position value) produce
/// [`EstimatedApr::ZERO`] instead of an error.
pub fn estimate_apr(inputs: &AprInputs<'_>) -> EstimatedApr {
    let (Some(price_a), Some(price_b)) = (positive(inputs.price_a), positive(inputs.price_b))
    else {
        return EstimatedApr::ZERO;
    };
    if inputs.fees_collected_usd <= Decimal::ZERO
        || inputs.range.lower >= inputs.range.upper
        || inputs.elapsed_secs == 0
    {
        return EstimatedApr::ZERO;
    }

    let concentrated_value = match inputs
        .amount_a
        .checked_mul(price_a)
        .zip(inputs.amount_b.checked_mul(price_b))
        .and_then(|(a, b)| a.checked_add(b))
    {
        Some(value) if value > Decimal::ZERO => value,
        _ => return EstimatedApr::ZERO,
    };
    let year = Decimal::from(SECONDS_PER_YEAR);

    let fee = inputs
        .fees_collected_usd
        .checked_mul(year)
        .and_then(|scaled| scaled.checked_div(Decimal::from(inputs.elapsed_secs)))
        .and_then(|per_year| per_year.checked_div(concentrated_value))
        .unwrap_or(Decimal::ZERO);

    let mut rewards = [Decimal::ZERO; NUM_REWARDS];
    for (slot, emission) in rewards.iter_mut().zip(inputs.rewards) {
        let Some(price) = positive(emission.price_usd) else {
            continue;
        };
        *slot = emission
            .per_second
            .checked_mul(year)
            .and_then(|per_year| per_year.checked_mul(price))
            .and_then(|value| value.checked_div(concentrated_value))
            .unwrap_or(Decimal::ZERO);
    }

    EstimatedApr { fee, rewards }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn inputs(rewards: &[RewardEmission]) -> AprInputs<'_> {
        AprInputs {
            rewards,
            fees_collected_usd: dec!(10),
            elapsed_secs: 86_400,
            amount_a: dec!(5),
            amount_b: dec!(500),
            price_a: Some(dec!(100)),
            price_b: Some(dec!(1)),
            range: TickRange::new(-640, 960),
        }
    }

    #[test]
    fn test_fee_apr() {
        // $10/day on $1000 of liquidity is 365%.
        let apr = estimate_apr(&inputs(&[]));
        assert_eq!(apr.fee, dec!(3.65));
        assert_eq!(apr.rewards, [Decimal::ZERO; NUM_REWARDS]);
    }

    #[test]
    fn test_reward_apr() {
        let rewards = [
            RewardEmission {
                per_second: dec!(0.0001),
                price_usd: Some(dec!(2)),
            },
            RewardEmission {
                per_second: dec!(1),
                price_usd: None,
            },
        ];
        let apr = estimate_apr(&inputs(&rewards));
        // 0.0001 * 31_536_000 * 2 / 1000
        assert_eq!(apr.rewards[0], dec!(6.3072));
        assert_eq!(apr.rewards[1], Decimal::ZERO);
        assert_eq!(apr.rewards[2], Decimal::ZERO);
        assert_eq!(apr.total(), dec!(9.9572));
    }

    #[test]
    fn test_zero_fees_yield_zero_apr() {
        let rewards = [RewardEmission {
            per_second: dec!(1),
            price_usd: Some(dec!(1)),
        }];
        let mut input = inputs(&rewards);
        input.fees_collected_usd = Decimal::ZERO;
        let apr = estimate_apr(&input);
        assert_eq!(apr, EstimatedApr::ZERO);
        assert_eq!(apr.fee, Decimal::ZERO);
        assert_eq!(apr.rewards, [Decimal::ZERO, Decimal::ZERO, Decimal::ZERO]);
    }

    #[test]
    fn test_degenerate_inputs_yield_zero_apr() {
        let mut missing_price = inputs(&[]);
        missing_price.price_b = None;
        assert_eq!(estimate_apr(&missing_price), EstimatedApr::ZERO);

        let mut negative_price = inputs(&[]);
        negative_price.price_a = Some(dec!(-1));
        assert_eq!(estimate_apr(&negative_price), EstimatedApr::ZERO);

        let mut inverted = inputs(&[]);
        inverted.range = TickRange::new(960, 960);
        assert_eq!(estimate_apr(&inverted), EstimatedApr::ZERO);

        let mut no_time = inputs(&[]);
        no_time.elapsed_secs = 0;
        assert_eq!(estimate_apr(&no_time), EstimatedApr::ZERO);

        let mut empty = inputs(&[]);
        empty.amount_a = Decimal::ZERO;
        empty.amount_b = Decimal::ZERO;
        assert_eq!(estimate_apr(&empty), EstimatedApr::ZERO);
    }

    #[test]
    fn test_reward_emission_from_x64() {
        // One raw unit per second of a six-decimals token.
        let emission = RewardEmission::from_x64(1 << 64, 6, None).unwrap();
        assert_eq!(emission.per_second, dec!(0.000001));
    }
}
