//! Renders task outcomes through `tracing`.
//!
//! Progress is logged at info level, isolated failures at warn.

use crate::lifecycle::{
    CycleReport, PipelineReport, StepReport, SwapStatus, TaskKind, TaskOutcome,
};
use tracing::{info, warn};

pub fn log_step(pool: &str, tokens: &str, step: &StepReport) {
    let task = step.task.as_str();
    let outcome = match &step.result {
        Ok(outcome) => outcome,
        Err(err) => {
            warn!(pool, tokens, task, error = %err, "Task failed");
            return;
        }
    };

    match outcome {
        TaskOutcome::Skipped(reason) => info!(pool, tokens, task, %reason, "Nothing to do"),
        TaskOutcome::Opened {
            address,
            range,
            liquidity,
            strategy,
            signature,
        } => info!(
            pool,
            tokens,
            position = %address,
            %range,
            liquidity,
            strategy = %strategy,
            %signature,
            "Opened position"
        ),
        TaskOutcome::Increased {
            liquidity,
            token_est_a,
            token_est_b,
            signature,
        } => info!(
            pool,
            tokens,
            liquidity,
            token_est_a,
            token_est_b,
            %signature,
            "Increased liquidity"
        ),
        TaskOutcome::Collected { signature, partial } => {
            if *partial {
                warn!(pool, tokens, %signature, "Collected without refreshing fees and rewards");
            } else {
                info!(pool, tokens, %signature, "Collected fees and rewards");
            }
        }
        TaskOutcome::Swapped(attempts) => {
            for attempt in attempts {
                let input = attempt.input_mint.as_str();
                let amount = attempt.amount;
                match &attempt.status {
                    SwapStatus::Swapped { signatures } => info!(
                        pool,
                        tokens,
                        input,
                        output = %attempt.output_mint,
                        amount,
                        transactions = signatures.len(),
                        "Swapped reward"
                    ),
                    SwapStatus::BelowDust => info!(pool, tokens, input, amount, "Reward balance below dust"),
                    SwapStatus::AlreadyInput => info!(pool, tokens, input, "Reward is the input token"),
                    SwapStatus::Failed { error } => {
                        warn!(pool, tokens, input, amount, %error, "Reward swap failed")
                    }
                }
            }
        }
        TaskOutcome::Held(decision) => info!(pool, tokens, %decision, "Keeping position"),
        TaskOutcome::Closed {
            address,
            withdrawn,
            signature,
        } => info!(
            pool,
            tokens,
            position = %address,
            withdrawn,
            %signature,
            "Closed position"
        ),
        TaskOutcome::TransactionFailed { label, error } => {
            if step.task == TaskKind::AddLiquidity {
                warn!(pool, tokens, transaction = %label, %error, "Adding liquidity failed, the wallet may need a swap first");
            } else {
                warn!(pool, tokens, task, transaction = %label, %error, "Transaction failed");
            }
        }
    }
}

pub fn log_pipeline(report: &PipelineReport) {
    let pool = report.pool.as_str();
    let tokens = report.tokens.as_deref().unwrap_or("?");
    for step in &report.steps {
        log_step(pool, tokens, step);
    }

    match &report.state {
        Ok(Some(state)) => info!(pool, tokens, "Position state\n{state}"),
        Ok(None) => info!(pool, tokens, "No open position"),
        Err(err) => warn!(pool, tokens, error = %err, "Could not read position state"),
    }
}

pub fn log_cycle(report: &CycleReport) {
    for pipeline in &report.pipelines {
        log_pipeline(pipeline);
    }
    info!(
        positions = report.pipelines.len(),
        failures = report.failures(),
        "Cycle finished"
    );
}
