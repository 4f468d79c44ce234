use crate::enums::TokenSide;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub mint_address: String,
    pub symbol: String,
    pub decimals: u8,
    pub name: String,
    pub coingecko_id: Option<String>,
}

impl Token {
    pub fn new(
        mint: impl Into<String>,
        symbol: impl Into<String>,
        decimals: u8,
        name: impl Into<String>,
    ) -> Self {
        Self {
            mint_address: mint.into(),
            symbol: symbol.into(),
            decimals,
            name: name.into(),
            coingecko_id: None,
        }
    }

    #[must_use]
    pub fn with_coingecko_id(mut self, id: impl Into<String>) -> Self {
        self.coingecko_id = Some(id.into());
        self
    }
}

/// Raw balance of a token account together with its mint decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenBalance {
    pub amount: u64,
    pub decimals: u8,
}

impl TokenBalance {
    #[must_use]
    pub fn new(amount: u64, decimals: u8) -> Self {
        Self { amount, decimals }
    }

    /// Balance expressed in whole token units.
    #[must_use]
    pub fn ui_amount(&self) -> Decimal {
        let mut value = Decimal::from(self.amount);
        // A Decimal scale tops out at 28, well above any SPL mint.
        if value.set_scale(u32::from(self.decimals)).is_err() {
            return Decimal::ZERO;
        }
        value.normalize()
    }
}

/// Wallet balances of both tokens of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PairBalances {
    pub a: TokenBalance,
    pub b: TokenBalance,
}

impl PairBalances {
    #[must_use]
    pub fn new(a: TokenBalance, b: TokenBalance) -> Self {
        Self { a, b }
    }

    #[must_use]
    pub fn side(&self, side: TokenSide) -> TokenBalance {
        match side {
            TokenSide::A => self.a,
            TokenSide::B => self.b,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ui_amount() {
        assert_eq!(TokenBalance::new(1_500_000, 6).ui_amount(), dec!(1.5));
        assert_eq!(TokenBalance::new(42, 0).ui_amount(), dec!(42));
        assert_eq!(TokenBalance::new(1, 9).ui_amount(), dec!(0.000000001));
    }
}
