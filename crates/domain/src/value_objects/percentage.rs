use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// A fraction such as a slippage tolerance (0.001 = 0.1%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Percentage(pub Decimal);

impl Percentage {
    pub fn from_bps(bps: u32) -> Self {
        Self(Decimal::from(bps) / Decimal::from(10000))
    }

    /// `numerator / denominator`; a zero denominator yields zero.
    pub fn from_fraction(numerator: u64, denominator: u64) -> Self {
        if denominator == 0 {
            return Self(Decimal::ZERO);
        }
        Self(Decimal::from(numerator) / Decimal::from(denominator))
    }

    pub fn to_bps(&self) -> u32 {
        (self.0 * Decimal::from(10000)).to_u32().unwrap_or(0)
    }

    /// `amount * (1 + self)`, rounded up and saturating at `u64::MAX`.
    #[must_use]
    pub fn add_to(&self, amount: u64) -> u64 {
        Decimal::from(amount)
            .checked_mul(Decimal::ONE + self.0)
            .and_then(|value| value.ceil().to_u64())
            .unwrap_or(u64::MAX)
    }

    /// `amount * (1 - self)`, rounded down and floored at zero.
    #[must_use]
    pub fn subtract_from(&self, amount: u64) -> u64 {
        if self.0 >= Decimal::ONE {
            return 0;
        }
        Decimal::from(amount)
            .checked_mul(Decimal::ONE - self.0)
            .and_then(|value| value.floor().to_u64())
            .unwrap_or(0)
    }
}
