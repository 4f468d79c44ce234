use clmm_autopilot_data::StoreError;
use clmm_autopilot_domain::error::MathError;
use clmm_autopilot_protocols::ProtocolError;
use clmm_autopilot_strategy::StrategyError;
use thiserror::Error;

/// Errors surfaced by the execution layer.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// Missing or invalid configuration; fatal at startup.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Strategy(#[from] StrategyError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Math(#[from] MathError),
}

impl ExecutionError {
    pub fn configuration(message: impl Into<String>) -> Self {
        ExecutionError::Configuration(message.into())
    }
}
