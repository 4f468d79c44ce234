//! Balance-driven choice between the two biased strategies.

use super::{LowerBiased, Strategy, StrategyParams, UpperBiased};
use clmm_autopilot_domain::entities::PairBalances;
use rust_decimal::Decimal;

/// Picks [`UpperBiased`] when the wallet's token A is worth more than its
/// token B, [`LowerBiased`] otherwise, so the larger holding becomes the
/// single-sided deposit.
///
/// The choice is not cached: callers resolve it again every time a fresh
/// decision is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AutoSide {
    pub params: StrategyParams,
}

impl AutoSide {
    pub const NAME: &'static str = "auto-side";

    #[must_use]
    pub fn new(params: StrategyParams) -> Self {
        Self { params }
    }

    /// USD value of each balance; a missing price values that side at zero.
    pub fn usd_values(
        balances: &PairBalances,
        price_a: Option<Decimal>,
        price_b: Option<Decimal>,
    ) -> (Decimal, Decimal) {
        let value = |amount: Decimal, price: Option<Decimal>| {
            price
                .and_then(|price| amount.checked_mul(price))
                .unwrap_or(Decimal::ZERO)
        };
        (
            value(balances.a.ui_amount(), price_a),
            value(balances.b.ui_amount(), price_b),
        )
    }

    /// Strategy for the given USD values. Ties go to [`LowerBiased`].
    pub fn choose(&self, usd_a: Decimal, usd_b: Decimal) -> Strategy {
        if usd_a > usd_b {
            Strategy::UpperBiased(UpperBiased::new(self.params.upper_spacings))
        } else {
            Strategy::LowerBiased(LowerBiased::new(self.params.lower_spacings))
        }
    }

    pub fn resolve(
        &self,
        balances: &PairBalances,
        price_a: Option<Decimal>,
        price_b: Option<Decimal>,
    ) -> Strategy {
        let (usd_a, usd_b) = Self::usd_values(balances, price_a, price_b);
        self.choose(usd_a, usd_b)
    }
}
