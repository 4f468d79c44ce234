use super::{
    PipelineReport, StepReport, TaskKind, TaskOutcome, add_liquidity, close_position,
    collect_fees_and_rewards, swap_collected_tokens,
};
use crate::error::ExecutionError;
use crate::manager::PositionManager;

/// Order of the steps in every cycle.
pub const CYCLE_TASKS: [TaskKind; 4] = [
    TaskKind::AddLiquidity,
    TaskKind::CollectFeesAndRewards,
    TaskKind::SwapCollectedTokens,
    TaskKind::ClosePosition,
];

/// Steps of one cycle. With `reopen_after_close` a position closed in this
/// cycle is opened again right away.
pub fn cycle_tasks(reopen_after_close: bool) -> Vec<TaskKind> {
    let mut tasks = CYCLE_TASKS.to_vec();
    if reopen_after_close {
        tasks.push(TaskKind::AddLiquidity);
    }
    tasks
}

impl TaskKind {
    pub async fn run(self, manager: &mut PositionManager) -> Result<TaskOutcome, ExecutionError> {
        match self {
            TaskKind::AddLiquidity => add_liquidity(manager).await,
            TaskKind::CollectFeesAndRewards => collect_fees_and_rewards(manager).await,
            TaskKind::SwapCollectedTokens => swap_collected_tokens(manager).await,
            TaskKind::ClosePosition => close_position(manager).await,
        }
    }
}

/// Runs `tasks` in order against one manager, then takes its state.
///
/// A failing step is recorded and the next one still runs.
pub async fn run_pipeline(manager: &mut PositionManager, tasks: &[TaskKind]) -> PipelineReport {
    let tokens = manager.pair_label().await.ok();

    let mut steps = Vec::with_capacity(tasks.len());
    for task in tasks {
        let result = task.run(manager).await;
        steps.push(StepReport {
            task: *task,
            result,
        });
    }

    PipelineReport {
        protocol: manager.protocol(),
        pool: manager.config().pool.clone(),
        tokens,
        steps,
        state: manager.state().await,
    }
}
