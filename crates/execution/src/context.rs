//! Shared collaborators handed to every position manager.

use crate::config::ExecutionSettings;
use clmm_autopilot_data::PositionStore;
use clmm_autopilot_protocols::cache::Clock;
use clmm_autopilot_protocols::{
    PoolClient, PriceOracle, SwapAggregator, TokenAccountProvider, TokenRegistry,
    TransactionSubmitter,
};
use std::sync::Arc;

/// Read-only context shared by the managers of one automator.
#[derive(Clone)]
pub struct AutomatorContext {
    pub pools: Arc<dyn PoolClient>,
    pub submitter: Arc<dyn TransactionSubmitter>,
    pub token_accounts: Arc<dyn TokenAccountProvider>,
    pub prices: Arc<dyn PriceOracle>,
    pub tokens: Arc<dyn TokenRegistry>,
    pub swaps: Arc<dyn SwapAggregator>,
    pub store: Arc<dyn PositionStore>,
    pub clock: Arc<dyn Clock>,
    pub settings: ExecutionSettings,
}

impl std::fmt::Debug for AutomatorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutomatorContext")
            .field("wallet", &self.submitter.wallet())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
