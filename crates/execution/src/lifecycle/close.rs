use super::{SkipReason, TaskOutcome, transaction_failed};
use crate::error::ExecutionError;
use crate::manager::PositionManager;
use clmm_autopilot_protocols::ProtocolError;
use clmm_autopilot_strategy::RangeStrategy;

/// Withdraws and burns the live position when the strategy gives up on it,
/// or unconditionally once the configured distribution drops to zero.
///
/// The full withdrawal accepts any output amount. The record is cleared
/// only after the close was confirmed.
pub async fn close_position(manager: &mut PositionManager) -> Result<TaskOutcome, ExecutionError> {
    let Some(mut position) = manager.position().await? else {
        return Ok(TaskOutcome::Skipped(SkipReason::NoPosition));
    };
    let pool = manager.pool(true).await?;

    if manager.config().has_allocation() {
        let strategy = manager.strategy(true).await?;
        let decision = strategy.evaluate_close(&pool, &position)?;
        if !decision.should_close() {
            return Ok(TaskOutcome::Held(decision));
        }
    }

    let pools = manager.context().pools.clone();
    let submitter = manager.context().submitter.clone();
    let address = position.address.clone();
    let withdrawn = position.liquidity;

    if position.liquidity > 0 {
        let transaction = pools
            .decrease_liquidity(&pool, &position, position.liquidity, 0, 0)
            .await?;
        if let Err(err) = submitter.submit(&transaction).await {
            return Ok(transaction_failed(&transaction, err));
        }
        position = match manager.position().await? {
            Some(position) => position,
            None => return Err(ProtocolError::NotFound(address).into()),
        };
    }

    let transaction = pools
        .close_position(&pool, &position, manager.settings().close_tolerance)
        .await?;
    let receipt = match submitter.submit(&transaction).await {
        Ok(receipt) => receipt,
        Err(err) => return Ok(transaction_failed(&transaction, err)),
    };

    manager
        .update_record(|record, _| record.clear_position())
        .await?;
    Ok(TaskOutcome::Closed {
        address,
        withdrawn,
        signature: receipt.signature,
    })
}
