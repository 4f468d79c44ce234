//! Published snapshot of a live position.

use clmm_autopilot_domain::enums::Protocol;
use clmm_autopilot_domain::metrics::EstimatedApr;
use clmm_autopilot_domain::value_objects::TickRange;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// Amount of one token held by a position and its share of the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenShare {
    /// Token units.
    pub amount: Decimal,
    /// Fraction of the position value.
    pub distribution: Decimal,
}

/// Derived view of a position, recomputed on every query.
///
/// Values keep full precision; rounding only happens when rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionState {
    /// Pair label such as `SOL/USDC`.
    pub tokens: String,
    pub protocol: Protocol,
    pub strategy: String,
    pub pool: String,
    pub position: String,
    pub token_mint_a: String,
    pub token_mint_b: String,
    pub tick_spacing: i32,
    pub tick_current: i32,
    pub tick_range: TickRange,
    pub price_lower: Decimal,
    pub price_current: Decimal,
    pub price_upper: Decimal,
    pub in_range: bool,
    pub leverage: Decimal,
    pub token_a: TokenShare,
    pub token_b: TokenShare,
    /// `None` when either token has no USD price.
    pub usd_value: Option<Decimal>,
    pub apr: EstimatedApr,
}

fn percent(fraction: Decimal) -> String {
    format!("{}%", (fraction * Decimal::ONE_HUNDRED).round_dp(2))
}

impl PositionState {
    /// Decimal places used for prices and token amounts.
    pub fn display_precision(&self) -> u32 {
        if self.price_current < Decimal::ONE { 5 } else { 3 }
    }

    /// Label and rendered value of every field, in display order.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let dp = self.display_precision();
        let share = |share: &TokenShare| {
            format!(
                "{} ({})",
                share.amount.round_dp(dp),
                percent(share.distribution)
            )
        };
        let rewards = self
            .apr
            .rewards
            .iter()
            .map(|reward| percent(*reward))
            .collect::<Vec<_>>()
            .join(", ");

        vec![
            ("tokens", self.tokens.clone()),
            ("protocol", self.protocol.to_string()),
            ("strategy", self.strategy.clone()),
            ("pool", self.pool.clone()),
            ("position", self.position.clone()),
            ("tokenMintA", self.token_mint_a.clone()),
            ("tokenMintB", self.token_mint_b.clone()),
            ("tickSpacing", self.tick_spacing.to_string()),
            ("tickCurrent", self.tick_current.to_string()),
            (
                "tickRange",
                format!("{} <> {}", self.tick_range.lower, self.tick_range.upper),
            ),
            ("currentPrice", self.price_current.round_dp(dp).to_string()),
            (
                "priceRange",
                format!(
                    "{} <> {}",
                    self.price_lower.round_dp(dp),
                    self.price_upper.round_dp(dp)
                ),
            ),
            ("inRange", self.in_range.to_string()),
            ("leverage", self.leverage.round_dp(2).to_string()),
            ("tokensA", share(&self.token_a)),
            ("tokensB", share(&self.token_b)),
            (
                "usdValue",
                self.usd_value
                    .map_or_else(|| "n/a".to_string(), |value| value.round_dp(2).to_string()),
            ),
            ("feeApr", percent(self.apr.fee)),
            ("rewardAprs", rewards),
            ("totalApr", percent(self.apr.total())),
        ]
    }
}

impl fmt::Display for PositionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, value) in self.rows() {
            writeln!(f, "{label:>12}: {value}")?;
        }
        Ok(())
    }
}
