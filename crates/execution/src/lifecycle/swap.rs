use super::{SkipReason, SwapAttempt, SwapStatus, TaskOutcome};
use crate::error::ExecutionError;
use crate::manager::PositionManager;
use clmm_autopilot_protocols::{ProtocolError, SwapAggregator, TransactionSubmitter};
use clmm_autopilot_strategy::RangeStrategy;

async fn swap(
    swaps: &dyn SwapAggregator,
    submitter: &dyn TransactionSubmitter,
    input_mint: &str,
    output_mint: &str,
    amount: u64,
) -> Result<Vec<String>, ProtocolError> {
    let route = swaps.quote(input_mint, output_mint, amount).await?;
    let transactions = swaps
        .build_transactions(&route, &submitter.wallet())
        .await?;

    let mut signatures = Vec::with_capacity(transactions.len());
    for transaction in &transactions {
        signatures.push(submitter.submit(transaction).await?.signature);
    }
    Ok(signatures)
}

/// Converts harvested reward tokens into the strategy's input token.
///
/// Every reward mint is attempted; one failing swap does not stop the
/// others.
pub async fn swap_collected_tokens(
    manager: &mut PositionManager,
) -> Result<TaskOutcome, ExecutionError> {
    if manager.position().await?.is_none() {
        return Ok(TaskOutcome::Skipped(SkipReason::NoPosition));
    }
    let pool = manager.pool(true).await?;
    let mut reward_mints: Vec<String> = Vec::new();
    for (_, reward) in pool.initialized_rewards() {
        if !reward_mints.contains(&reward.mint) {
            reward_mints.push(reward.mint.clone());
        }
    }
    if reward_mints.is_empty() {
        return Ok(TaskOutcome::Skipped(SkipReason::NoRewards));
    }

    let strategy = manager.strategy(false).await?;
    let output_mint = pool.mint(strategy.input_side()).to_string();
    let dust_threshold = manager.settings().dust_threshold;
    let swaps = manager.context().swaps.clone();
    let submitter = manager.context().submitter.clone();

    let mut attempts = Vec::with_capacity(reward_mints.len());
    for input_mint in reward_mints {
        let (amount, status) = match manager.token_balance(&input_mint).await {
            Err(err) => (0, SwapStatus::Failed {
                error: err.to_string(),
            }),
            Ok(_) if input_mint == output_mint => (0, SwapStatus::AlreadyInput),
            Ok(balance) if balance.amount <= dust_threshold => {
                (balance.amount, SwapStatus::BelowDust)
            }
            Ok(balance) => {
                let status = match swap(
                    swaps.as_ref(),
                    submitter.as_ref(),
                    &input_mint,
                    &output_mint,
                    balance.amount,
                )
                .await
                {
                    Ok(signatures) => SwapStatus::Swapped { signatures },
                    Err(err) => SwapStatus::Failed {
                        error: err.to_string(),
                    },
                };
                (balance.amount, status)
            }
        };
        attempts.push(SwapAttempt {
            input_mint,
            output_mint: output_mint.clone(),
            amount,
            status,
        });
    }
    Ok(TaskOutcome::Swapped(attempts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Harness, MINT_A, pool_at, position_at};
    use clmm_autopilot_strategy::StrategyKind;
    use rust_decimal_macros::dec;

    const ORCA: &str = "orca-mint";
    const BONK: &str = "bonk-mint";

    fn pool_with_rewards(mints: &[&str]) -> clmm_autopilot_domain::entities::PoolSnapshot {
        let mut pool = pool_at(1000);
        for (index, mint) in mints.iter().enumerate() {
            pool.reward_infos[index].mint = (*mint).to_string();
        }
        pool
    }

    async fn harness_with_position(mints: &[&str]) -> Harness {
        let harness = Harness::new(pool_with_rewards(mints));
        harness.add_position(position_at("position", 1024, 3264, 1_000));
        harness.attach_record("position", "upper-biased").await;
        harness
    }

    fn attempt(outcome: &TaskOutcome, mint: &str) -> SwapAttempt {
        let TaskOutcome::Swapped(attempts) = outcome else {
            panic!("expected swaps, got {outcome:?}");
        };
        attempts
            .iter()
            .find(|attempt| attempt.input_mint == mint)
            .cloned()
            .unwrap()
    }

    #[tokio::test]
    async fn test_no_rewards_skips() {
        let harness = harness_with_position(&[]).await;
        let mut manager = harness.manager(StrategyKind::UpperBiased, dec!(1));

        let outcome = swap_collected_tokens(&mut manager).await.unwrap();
        assert_eq!(outcome, TaskOutcome::Skipped(SkipReason::NoRewards));
    }

    #[tokio::test]
    async fn test_swaps_rewards_above_dust_into_input_token() {
        let harness = harness_with_position(&[ORCA, BONK]).await;
        harness.set_balance(ORCA, 5_000_000);
        harness.set_balance(BONK, 100);
        let mut manager = harness.manager(StrategyKind::UpperBiased, dec!(1));

        let outcome = swap_collected_tokens(&mut manager).await.unwrap();

        let orca = attempt(&outcome, ORCA);
        assert_eq!(orca.output_mint, MINT_A);
        assert_eq!(orca.amount, 5_000_000);
        assert!(matches!(orca.status, SwapStatus::Swapped { ref signatures } if signatures.len() == 2));
        assert_eq!(attempt(&outcome, BONK).status, SwapStatus::BelowDust);
        assert_eq!(harness.swaps.quoted(), vec![(ORCA.to_string(), MINT_A.to_string(), 5_000_000)]);
    }

    #[tokio::test]
    async fn test_one_failing_swap_does_not_block_others() {
        let harness = harness_with_position(&[ORCA, BONK]).await;
        harness.set_balance(ORCA, 5_000_000);
        harness.set_balance(BONK, 9_000_000);
        harness.swaps.fail_for(ORCA);
        let mut manager = harness.manager(StrategyKind::UpperBiased, dec!(1));

        let outcome = swap_collected_tokens(&mut manager).await.unwrap();

        assert!(matches!(attempt(&outcome, ORCA).status, SwapStatus::Failed { .. }));
        assert!(matches!(attempt(&outcome, BONK).status, SwapStatus::Swapped { .. }));
    }

    #[tokio::test]
    async fn test_reward_equal_to_input_token_is_kept() {
        let harness = harness_with_position(&[MINT_A]).await;
        harness.set_balance(MINT_A, 5_000_000);
        let mut manager = harness.manager(StrategyKind::UpperBiased, dec!(1));

        let outcome = swap_collected_tokens(&mut manager).await.unwrap();
        assert_eq!(attempt(&outcome, MINT_A).status, SwapStatus::AlreadyInput);
        assert!(harness.swaps.quoted().is_empty());
    }
}
