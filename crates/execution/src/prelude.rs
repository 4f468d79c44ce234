//! Prelude module for convenient imports.
//!
//! # Example
//!
//! ```rust
//! use clmm_autopilot_execution::prelude::*;
//! ```

pub use crate::config::{AutomatorConfig, ExecutionSettings, PortfolioConfig, PositionConfig};
pub use crate::context::AutomatorContext;
pub use crate::error::ExecutionError;
pub use crate::lifecycle::{
    CYCLE_TASKS, CycleReport, PipelineReport, SkipReason, StepReport, SwapAttempt, SwapStatus,
    TaskKind, TaskOutcome, add_liquidity, close_position, collect_fees_and_rewards, cycle_tasks,
    run_pipeline, swap_collected_tokens,
};
pub use crate::manager::PositionManager;
pub use crate::scheduler::Automator;
pub use crate::state::{PositionState, TokenShare};
