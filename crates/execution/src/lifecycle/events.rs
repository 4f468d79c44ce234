//! Outcomes reported by the lifecycle tasks.

use crate::error::ExecutionError;
use crate::state::PositionState;
use clmm_autopilot_domain::enums::Protocol;
use clmm_autopilot_domain::value_objects::TickRange;
use clmm_autopilot_strategy::CloseDecision;
use serde::Serialize;
use std::fmt;

/// Steps of a position pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TaskKind {
    AddLiquidity,
    CollectFeesAndRewards,
    SwapCollectedTokens,
    ClosePosition,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::AddLiquidity => "add liquidity",
            TaskKind::CollectFeesAndRewards => "collect fees and rewards",
            TaskKind::SwapCollectedTokens => "swap collected tokens",
            TaskKind::ClosePosition => "close position",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a task did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// Configured distribution is zero.
    ZeroDistribution,
    NoPosition,
    /// The quote would add no liquidity.
    EmptyQuote,
    /// The pool emits no rewards.
    NoRewards,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SkipReason::ZeroDistribution => "distribution is zero",
            SkipReason::NoPosition => "no position",
            SkipReason::EmptyQuote => "quote adds no liquidity",
            SkipReason::NoRewards => "pool has no rewards",
        })
    }
}

/// Result of converting one reward token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SwapStatus {
    Swapped { signatures: Vec<String> },
    /// Balance at or below the dust threshold.
    BelowDust,
    /// The reward already is the strategy's input token.
    AlreadyInput,
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwapAttempt {
    pub input_mint: String,
    pub output_mint: String,
    /// Raw balance of the reward token.
    pub amount: u64,
    pub status: SwapStatus,
}

/// What a task did.
///
/// Submission failures are outcomes, not errors: the pipeline moves on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TaskOutcome {
    Skipped(SkipReason),
    Opened {
        address: String,
        range: TickRange,
        liquidity: u128,
        strategy: String,
        signature: String,
    },
    Increased {
        liquidity: u128,
        token_est_a: u64,
        token_est_b: u64,
        signature: String,
    },
    Collected {
        signature: String,
        /// The accounting refresh was dropped after the full batch failed.
        partial: bool,
    },
    Swapped(Vec<SwapAttempt>),
    /// The strategy keeps the position open.
    Held(CloseDecision),
    Closed {
        address: String,
        /// Liquidity withdrawn before burning the position.
        withdrawn: u128,
        signature: String,
    },
    /// Submission failed; the rest of the step was skipped.
    TransactionFailed { label: String, error: String },
}

/// One executed step.
#[derive(Debug)]
pub struct StepReport {
    pub task: TaskKind,
    /// `Err` for failures the task did not isolate itself.
    pub result: Result<TaskOutcome, ExecutionError>,
}

impl StepReport {
    pub fn is_failure(&self) -> bool {
        matches!(
            self.result,
            Err(_) | Ok(TaskOutcome::TransactionFailed { .. })
        )
    }
}

/// Steps and final state of one position.
#[derive(Debug)]
pub struct PipelineReport {
    pub protocol: Protocol,
    pub pool: String,
    /// Pair label, `None` when the pool could not be read.
    pub tokens: Option<String>,
    pub steps: Vec<StepReport>,
    pub state: Result<Option<PositionState>, ExecutionError>,
}

impl PipelineReport {
    pub fn failures(&self) -> usize {
        self.steps.iter().filter(|step| step.is_failure()).count()
    }
}

/// All pipelines of one cycle, in configuration order.
#[derive(Debug, Default)]
pub struct CycleReport {
    pub pipelines: Vec<PipelineReport>,
}

impl CycleReport {
    pub fn failures(&self) -> usize {
        self.pipelines.iter().map(PipelineReport::failures).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failures_count_isolated_and_unexpected_errors() {
        let report = PipelineReport {
            protocol: Protocol::Whirlpool,
            pool: "pool".to_string(),
            tokens: None,
            steps: vec![
                StepReport {
                    task: TaskKind::AddLiquidity,
                    result: Ok(TaskOutcome::Skipped(SkipReason::ZeroDistribution)),
                },
                StepReport {
                    task: TaskKind::CollectFeesAndRewards,
                    result: Ok(TaskOutcome::TransactionFailed {
                        label: "collect".to_string(),
                        error: "blockhash expired".to_string(),
                    }),
                },
                StepReport {
                    task: TaskKind::ClosePosition,
                    result: Err(ExecutionError::configuration("boom")),
                },
            ],
            state: Ok(None),
        };
        assert_eq!(report.failures(), 2);

        let cycle = CycleReport {
            pipelines: vec![report],
        };
        assert_eq!(cycle.failures(), 2);
    }
}
