//! Purge command.

use anyhow::Result;
use std::io;
use std::sync::Arc;
use teardown_config::PurgeConfig;
use teardown_core::PipelineReport;
use teardown_scheduler::{
    Operator, PurgeContext, PurgeOrchestrator, PurgeSummary, prompt_for_confirmation,
};
use tracing::warn;

use super::stack_table;
use crate::snapshot::SnapshotProvider;

/// Operator at the terminal: prints the candidates and reads the answer from stdin.
pub struct TerminalOperator;

impl Operator for TerminalOperator {
    fn present(&self, summary: &PurgeSummary) {
        println!("{}", stack_table(&summary.rows));
    }

    fn confirm(&self, summary: &PurgeSummary) -> bool {
        let stdin = io::stdin();
        match prompt_for_confirmation(stdin.lock(), io::stdout(), summary.count()) {
            Ok(confirmed) => confirmed,
            Err(e) => {
                warn!(error = %e, "Couldn't read confirmation");
                false
            }
        }
    }
}

/// Purge every tagged stack known to the provider.
pub async fn run(
    config: PurgeConfig,
    provider: Arc<SnapshotProvider>,
    operator: Arc<dyn Operator>,
) -> Result<PipelineReport> {
    let namespace = config.namespace.clone();
    let ctx = PurgeContext::new(namespace, provider.clone(), provider, Arc::new(config));
    let report = PurgeOrchestrator::new(ctx, operator).purge().await?;

    println!("Purged {} of {} steps", report.succeeded, report.total);
    for failure in &report.failures {
        println!("  {}: {}", failure.step, failure.error);
    }

    Ok(report)
}
