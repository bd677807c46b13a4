//! End-to-end pipeline: ensure the control table exists, truncate it, reload
//! it from the catalog, then apply compression under the active mode. Runs
//! exactly once per invocation, strictly in that order.

use std::sync::Arc;
use std::time::Duration;

use encopt_client::{DataApi, StatementExecutor};
use encopt_common::{JobConfig, Result};

use crate::applier::{Applier, RunSummary};
use crate::control::ControlTable;

pub async fn run(job: &JobConfig, api: Arc<dyn DataApi>) -> Result<RunSummary> {
    job.validate()?;

    let exec = Arc::new(
        StatementExecutor::new(api, job.target.clone())
            .with_poll_interval(Duration::from_secs(job.poll_interval_secs)),
    );

    let control = ControlTable::new(exec.clone());
    control.ensure_schema().await?;
    control.reset().await?;
    let loaded = control.populate(&job.schema).await?;
    tracing::info!(schema = %job.schema, rows = loaded, "control table loaded");

    let applier = Applier::new(exec);
    let summary = applier.apply(&job.schema, job.mode, job.threshold).await?;
    tracing::info!(?summary, "compression run finished");
    Ok(summary)
}
