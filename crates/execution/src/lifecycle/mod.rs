//! Position lifecycle: the four tasks, the pipeline that orders them and
//! the outcomes they report.
//!
//! Tasks never log. Each returns a [`TaskOutcome`]; submission failures are
//! reported as [`TaskOutcome::TransactionFailed`] so the pipeline can move
//! on to the next step.

mod add_liquidity;
mod close;
mod collect;
mod events;
mod pipeline;
mod swap;

pub use add_liquidity::add_liquidity;
pub use close::close_position;
pub use collect::collect_fees_and_rewards;
pub use events::*;
pub use pipeline::{CYCLE_TASKS, cycle_tasks, run_pipeline};
pub use swap::swap_collected_tokens;

use clmm_autopilot_protocols::{PendingTransaction, ProtocolError};

fn transaction_failed(transaction: &PendingTransaction, err: ProtocolError) -> TaskOutcome {
    TaskOutcome::TransactionFailed {
        label: transaction.label.clone(),
        error: err.to_string(),
    }
}
