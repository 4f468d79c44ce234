use clmm_autopilot_domain::error::MathError;
use thiserror::Error;

/// Errors raised by protocol adapters and external services.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The account does not exist on chain.
    #[error("account not found at address {0}")]
    NotFound(String),

    #[error("invalid address {0}")]
    InvalidAddress(String),

    #[error("failed to decode {kind} account {address}: {reason}")]
    Decode {
        kind: &'static str,
        address: String,
        reason: String,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("rpc error: {0}")]
    Rpc(String),

    /// Submission or confirmation failed.
    #[error("transaction failed: {0}")]
    Transaction(String),

    #[error("http error: {0}")]
    Http(String),

    #[error("no swap route from {input_mint} to {output_mint}")]
    NoRoute {
        input_mint: String,
        output_mint: String,
    },

    #[error(transparent)]
    Math(#[from] MathError),
}

impl ProtocolError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProtocolError::NotFound(_))
    }
}

impl From<reqwest::Error> for ProtocolError {
    fn from(err: reqwest::Error) -> Self {
        ProtocolError::Http(err.to_string())
    }
}

impl From<solana_client::client_error::ClientError> for ProtocolError {
    fn from(err: solana_client::client_error::ClientError) -> Self {
        ProtocolError::Rpc(err.to_string())
    }
}
