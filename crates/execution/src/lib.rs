//! Liquidity automation: configuration, per-pool position management and
//! the lifecycle pipeline run on every cycle.
//!
//! An [`Automator`](scheduler::Automator) walks the configured positions.
//! For each one a [`PositionManager`](manager::PositionManager) resolves the
//! persisted record, the pool and the strategy, and the lifecycle tasks add
//! liquidity, harvest, swap rewards and close out-of-range positions.

/// Prelude module for convenient imports.
pub mod prelude;

/// Automator configuration.
pub mod config;
/// Shared collaborators.
pub mod context;
/// Execution errors.
pub mod error;
/// Lifecycle tasks and pipeline.
pub mod lifecycle;
/// Per-pool position manager.
pub mod manager;
/// Report rendering.
pub mod report;
/// Cycle scheduling.
pub mod scheduler;
/// Published position state.
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;
