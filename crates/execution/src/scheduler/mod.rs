//! Cycle scheduling.
//!
//! A cycle runs the pipeline of every configured position, one after the
//! other. In `work` mode cycles repeat forever; the next one starts an
//! interval after the previous one finished, so two cycles never overlap.

use crate::config::AutomatorConfig;
use crate::context::AutomatorContext;
use crate::lifecycle::{CycleReport, TaskKind, cycle_tasks, run_pipeline};
use crate::manager::PositionManager;
use crate::report;
use std::future::Future;
use std::sync::Arc;
use tokio::time::{MissedTickBehavior, interval};
use tracing::info;

/// Drives the configured positions.
pub struct Automator {
    ctx: Arc<AutomatorContext>,
    config: AutomatorConfig,
}

impl Automator {
    pub fn new(ctx: Arc<AutomatorContext>, config: AutomatorConfig) -> Self {
        Self { ctx, config }
    }

    pub fn config(&self) -> &AutomatorConfig {
        &self.config
    }

    /// Steps run for every position in a cycle.
    pub fn tasks(&self) -> Vec<TaskKind> {
        cycle_tasks(self.config.reopen_after_close)
    }

    async fn run(&self, tasks: &[TaskKind]) -> CycleReport {
        let mut report = CycleReport::default();
        for (protocol, position) in self.config.positions() {
            let mut manager = PositionManager::new(self.ctx.clone(), protocol, position.clone());
            report.pipelines.push(run_pipeline(&mut manager, tasks).await);
        }
        report
    }

    /// One pass over every position.
    pub async fn run_cycle(&self) -> CycleReport {
        self.run(&self.tasks()).await
    }

    /// State of every position without running any task.
    pub async fn inspect(&self) -> CycleReport {
        self.run(&[]).await
    }

    /// Runs cycles until `shutdown` resolves. A running cycle is always
    /// finished before stopping.
    pub async fn work<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = interval(self.config.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(
            positions = self.config.positions().count(),
            interval_secs = self.config.interval_secs,
            "Starting automator"
        );

        loop {
            tokio::select! {
                () = &mut shutdown => break,
                _ = ticker.tick() => {}
            }

            let report = self.run_cycle().await;
            report::log_cycle(&report);
            ticker.reset();
        }

        info!("Automator stopped");
    }
}
