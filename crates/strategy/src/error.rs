use clmm_autopilot_domain::error::MathError;
use thiserror::Error;

/// Failure to evaluate a strategy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrategyError {
    /// Name does not match any known strategy.
    #[error("unknown strategy '{0}'")]
    UnknownStrategy(String),
    /// The selected range would leave the program's tick bounds.
    #[error("range [{lower}, {upper}] does not fit the tick bounds")]
    RangeOutOfBounds {
        /// Proposed lower tick.
        lower: i32,
        /// Proposed upper tick.
        upper: i32,
    },
    /// Underlying math failure.
    #[error(transparent)]
    Math(#[from] MathError),
}
