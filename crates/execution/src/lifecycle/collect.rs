use super::{SkipReason, TaskOutcome, transaction_failed};
use crate::error::ExecutionError;
use crate::manager::PositionManager;
use clmm_autopilot_protocols::PendingTransaction;

/// Harvests fees and every initialized reward in one transaction.
///
/// The batch starts with an accounting refresh. When the full batch is
/// rejected the collection alone is retried once.
pub async fn collect_fees_and_rewards(
    manager: &mut PositionManager,
) -> Result<TaskOutcome, ExecutionError> {
    let Some(position) = manager.position().await? else {
        return Ok(TaskOutcome::Skipped(SkipReason::NoPosition));
    };
    let pool = manager.pool(true).await?;
    let pools = manager.context().pools.clone();
    let submitter = manager.context().submitter.clone();

    let mut collect = vec![pools.collect_fees(&pool, &position).await?];
    for (index, reward) in pool.initialized_rewards() {
        manager.token_account(&reward.mint, true).await?;
        collect.push(pools.collect_reward(&pool, &position, index).await?);
    }
    let update = pools.update_fees_and_rewards(&pool, &position).await?;

    let full = PendingTransaction::batch(
        format!("update and collect {}", position.address),
        std::iter::once(update).chain(collect.iter().cloned()),
    )?;
    let (receipt, partial) = match submitter.submit(&full).await {
        Ok(receipt) => (receipt, false),
        Err(_) => {
            let fallback =
                PendingTransaction::batch(format!("collect {}", position.address), collect)?;
            match submitter.submit(&fallback).await {
                Ok(receipt) => (receipt, true),
                Err(err) => return Ok(transaction_failed(&fallback, err)),
            }
        }
    };

    manager
        .update_record(|record, now| record.mark_collected(now))
        .await?;
    Ok(TaskOutcome::Collected {
        signature: receipt.signature,
        partial,
    })
}
