use super::{SkipReason, TaskOutcome, transaction_failed};
use crate::error::ExecutionError;
use crate::manager::PositionManager;
use clmm_autopilot_domain::math::concentrated_liquidity::increase_liquidity_quote;
use clmm_autopilot_domain::value_objects::TickRange;
use clmm_autopilot_strategy::RangeStrategy;

/// Tops up the live position from the wallet, or opens a new one.
///
/// A failed increase usually means the wallet holds the wrong token for the
/// current price; it is reported and left to the next cycle.
pub async fn add_liquidity(manager: &mut PositionManager) -> Result<TaskOutcome, ExecutionError> {
    if !manager.config().has_allocation() {
        return Ok(TaskOutcome::Skipped(SkipReason::ZeroDistribution));
    }

    let position = manager.position().await?;
    let pool = manager.pool(true).await?;
    let strategy = manager.strategy(true).await?;
    let balances = manager.token_balances().await?;
    let slippage = manager.settings().slippage;
    let pools = manager.context().pools.clone();
    let submitter = manager.context().submitter.clone();

    if let Some(position) = position {
        let input = strategy.size_input(&pool, &balances);
        let quote = increase_liquidity_quote(
            input.side,
            input.amount,
            pool.sqrt_price,
            pool.tick_current_index,
            TickRange::new(position.tick_lower_index, position.tick_upper_index),
            slippage,
        )?;
        if quote.is_empty() {
            return Ok(TaskOutcome::Skipped(SkipReason::EmptyQuote));
        }

        let transaction = pools.increase_liquidity(&pool, &position, &quote).await?;
        return Ok(match submitter.submit(&transaction).await {
            Ok(receipt) => TaskOutcome::Increased {
                liquidity: quote.liquidity_amount,
                token_est_a: quote.token_est_a,
                token_est_b: quote.token_est_b,
                signature: receipt.signature,
            },
            Err(err) => transaction_failed(&transaction, err),
        });
    }

    let decision = strategy.decide(&pool, &balances)?;
    let quote = increase_liquidity_quote(
        decision.input.side,
        decision.input.amount,
        pool.sqrt_price,
        pool.tick_current_index,
        decision.range,
        slippage,
    )?;
    if quote.is_empty() {
        return Ok(TaskOutcome::Skipped(SkipReason::EmptyQuote));
    }

    let opened = pools.open_position(&pool, decision.range, &quote).await?;
    let receipt = match submitter.submit(&opened.transaction).await {
        Ok(receipt) => receipt,
        Err(err) => return Ok(transaction_failed(&opened.transaction, err)),
    };

    let address = opened.position_address.clone();
    let name = strategy.name();
    manager
        .update_record(move |record, now| record.attach(address, name, now))
        .await?;

    Ok(TaskOutcome::Opened {
        address: opened.position_address,
        range: decision.range,
        liquidity: quote.liquidity_amount,
        strategy: name.to_string(),
        signature: receipt.signature,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Harness, MINT_A, MINT_B, pool_at, position_at};
    use clmm_autopilot_strategy::StrategyKind;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_zero_distribution_is_a_no_op() {
        let harness = Harness::new(pool_at(1000));
        harness.set_balance(MINT_A, 5_000_000_000);
        let mut manager = harness.manager(StrategyKind::UpperBiased, dec!(0));

        let outcome = add_liquidity(&mut manager).await.unwrap();
        assert_eq!(outcome, TaskOutcome::Skipped(SkipReason::ZeroDistribution));
        assert!(harness.submitter.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_opens_upper_biased_position_and_records_it() {
        let harness = Harness::new(pool_at(1000));
        harness.set_balance(MINT_A, 5_000_000_000);
        let mut manager = harness.manager(StrategyKind::UpperBiased, dec!(1));

        let outcome = add_liquidity(&mut manager).await.unwrap();
        let TaskOutcome::Opened {
            address,
            range,
            liquidity,
            strategy,
            ..
        } = outcome
        else {
            panic!("expected an opened position, got {outcome:?}");
        };
        assert_eq!(range, TickRange::new(1024, 3264));
        assert!(liquidity > 0);
        assert_eq!(strategy, "upper-biased");

        let record = harness.stored_record().await;
        assert_eq!(record.address, Some(address));
        assert_eq!(record.strategy.as_deref(), Some("upper-biased"));
        assert!(record.last_collected_at.is_some());
    }

    #[tokio::test]
    async fn test_auto_side_opens_on_the_larger_holding() {
        let harness = Harness::new(pool_at(1000));
        harness.set_price(MINT_A, dec!(150));
        harness.set_price(MINT_B, dec!(1));
        harness.set_balance(MINT_A, 100_000);
        harness.set_balance(MINT_B, 500_000_000);
        let mut manager = harness.manager(StrategyKind::AutoSide, dec!(1));

        let outcome = add_liquidity(&mut manager).await.unwrap();
        assert!(matches!(
            outcome,
            TaskOutcome::Opened { range, ref strategy, .. }
                if range == TickRange::new(-640, 960) && strategy == "lower-biased"
        ));
    }

    #[tokio::test]
    async fn test_empty_quote_skips() {
        let harness = Harness::new(pool_at(1000));
        let mut manager = harness.manager(StrategyKind::UpperBiased, dec!(1));

        let outcome = add_liquidity(&mut manager).await.unwrap();
        assert_eq!(outcome, TaskOutcome::Skipped(SkipReason::EmptyQuote));
        assert!(harness.pools.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_open_leaves_record_untouched() {
        let harness = Harness::new(pool_at(1000));
        harness.set_balance(MINT_A, 5_000_000_000);
        harness.submitter.fail_on("open position");
        let mut manager = harness.manager(StrategyKind::UpperBiased, dec!(1));

        let outcome = add_liquidity(&mut manager).await.unwrap();
        assert!(matches!(outcome, TaskOutcome::TransactionFailed { .. }));
        assert_eq!(harness.stored_record().await.address, None);
    }

    #[tokio::test]
    async fn test_increases_existing_position_over_its_own_range() {
        let harness = Harness::new(pool_at(1000));
        harness.add_position(position_at("position", 1088, 2048, 1_000));
        harness.attach_record("position", "upper-biased").await;
        harness.set_balance(MINT_A, 1_000_000_000);
        let mut manager = harness.manager(StrategyKind::UpperBiased, dec!(1));

        let outcome = add_liquidity(&mut manager).await.unwrap();
        assert!(matches!(
            outcome,
            TaskOutcome::Increased { liquidity, token_est_b: 0, .. } if liquidity > 0
        ));
        assert_eq!(harness.pools.calls(), vec!["increase liquidity position"]);
    }

    #[tokio::test]
    async fn test_failed_increase_is_swallowed() {
        let harness = Harness::new(pool_at(1000));
        harness.add_position(position_at("position", 1088, 2048, 1_000));
        harness.attach_record("position", "upper-biased").await;
        harness.set_balance(MINT_A, 1_000_000_000);
        harness.submitter.fail_on("increase liquidity");
        let mut manager = harness.manager(StrategyKind::UpperBiased, dec!(1));

        let outcome = add_liquidity(&mut manager).await.unwrap();
        assert!(matches!(outcome, TaskOutcome::TransactionFailed { ref label, .. }
            if label == "increase liquidity position"));
        assert_eq!(
            harness.stored_record().await.address.as_deref(),
            Some("position")
        );
    }
}
