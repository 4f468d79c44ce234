//! Range selection and close policies for single-sided liquidity positions.
//!
//! A strategy answers three questions about a pool: which tick range to open,
//! which token (and how much of it) to deposit, and whether an existing
//! position should be closed. The set of strategies is closed and resolved
//! from configuration through [`StrategyKind`].

/// Outputs of strategy evaluation.
pub mod decision;
/// Strategy errors.
pub mod error;
/// Strategy implementations.
pub mod strategies;

pub use decision::{CloseDecision, InputSizing, StrategyDecision};
pub use error::StrategyError;
pub use strategies::{
    AutoSide, LowerBiased, RangeStrategy, Strategy, StrategyKind, StrategyParams, UpperBiased,
};

/// Commonly used items.
pub mod prelude {
    pub use crate::decision::{CloseDecision, InputSizing, StrategyDecision};
    pub use crate::error::StrategyError;
    pub use crate::strategies::{
        AutoSide, LowerBiased, RangeStrategy, Strategy, StrategyKind, StrategyParams, UpperBiased,
    };
}
