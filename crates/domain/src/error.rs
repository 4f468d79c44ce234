//! Errors raised by the fixed-point and position math.

use thiserror::Error;

/// Failure of a pure math routine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MathError {
    /// Tick outside of `[MIN_TICK, MAX_TICK]`.
    #[error("tick {0} is out of bounds")]
    TickOutOfBounds(i32),
    /// Sqrt price outside of the representable range.
    #[error("sqrt price {0} is out of bounds")]
    SqrtPriceOutOfBounds(u128),
    /// Tick spacing must be strictly positive.
    #[error("invalid tick spacing {0}")]
    InvalidTickSpacing(i32),
    /// Lower bound is not strictly below the upper bound.
    #[error("invalid range: lower {lower} must be below upper {upper}")]
    InvalidRange {
        /// Lower bound.
        lower: String,
        /// Upper bound.
        upper: String,
    },
    /// Price must be strictly positive.
    #[error("price must be positive")]
    NonPositivePrice,
    /// Intermediate value does not fit the target type.
    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),
    /// Division by zero.
    #[error("division by zero in {0}")]
    DivisionByZero(&'static str),
}
