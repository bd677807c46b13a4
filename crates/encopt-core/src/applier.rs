//! Compression applier
//!
//! Walks the tables journaled in the control table, filters them through the
//! active mode, and re-encodes every column whose estimated reduction is
//! positive and which is not the leading sort key. Each decision lands back
//! in the control table.

use std::sync::Arc;

use encopt_client::StatementExecutor;
use encopt_common::{CompressionMode, Result};
use serde::Serialize;

use crate::advisor::Advisor;
use crate::control::ControlTable;

/// Outcome counters for one run, logged by the entry point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Tables that passed the mode filter and were analyzed.
    pub tables_examined: usize,

    /// Tables excluded by the size-threshold filter.
    pub tables_filtered_out: usize,

    /// Tables whose analysis produced no rows; their control rows keep the
    /// load-time defaults.
    pub tables_without_analysis: usize,

    pub columns_altered: usize,

    /// Columns analyzed but left on their current encoding.
    pub columns_skipped: usize,
}

pub struct Applier {
    exec: Arc<StatementExecutor>,
    control: ControlTable,
    advisor: Advisor,
}

impl Applier {
    pub fn new(exec: Arc<StatementExecutor>) -> Self {
        Self {
            control: ControlTable::new(exec.clone()),
            advisor: Advisor::new(exec.clone()),
            exec,
        }
    }

    /// Apply compression across every table the mode selects.
    pub async fn apply(
        &self,
        schema: &str,
        mode: CompressionMode,
        threshold: Option<u64>,
    ) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        for table in self.control.tables(schema).await? {
            if mode.needs_threshold() {
                let size_mb = self.advisor.table_size_mb(schema, &table).await?.unwrap_or(0);
                if !mode.selects(size_mb, threshold) {
                    tracing::debug!(schema, %table, size_mb, %mode, "table filtered out");
                    summary.tables_filtered_out += 1;
                    continue;
                }
            }
            self.apply_table(schema, &table, &mut summary).await?;
        }

        Ok(summary)
    }

    async fn apply_table(
        &self,
        schema: &str,
        table: &str,
        summary: &mut RunSummary,
    ) -> Result<()> {
        let sort_key = self.advisor.leading_sort_key(schema, table).await?;

        let recommendations = match self.advisor.analyze(schema, table).await? {
            Some(recommendations) => recommendations,
            None => {
                // No analysis rows: the table's control rows stay at their
                // load-time defaults.
                tracing::warn!(schema, table, "analysis produced no rows, skipping table");
                summary.tables_without_analysis += 1;
                return Ok(());
            }
        };

        summary.tables_examined += 1;
        for rec in &recommendations {
            let is_sort_key = sort_key.as_deref() == Some(rec.column.as_str());
            if rec.reduction_pct > 0.0 && !is_sort_key {
                let sql = alter_encoding_sql(schema, table, &rec.column, &rec.encoding);
                self.exec.execute(&sql).await?;
                tracing::info!(
                    schema,
                    table,
                    column = %rec.column,
                    encoding = %rec.encoding,
                    reduction = %rec.reduction_raw,
                    "altered column encoding"
                );
                self.control
                    .record(schema, table, &rec.column, &rec.encoding, &rec.reduction_raw, true)
                    .await?;
                summary.columns_altered += 1;
            } else {
                self.control
                    .record(schema, table, &rec.column, &rec.encoding, &rec.reduction_raw, false)
                    .await?;
                summary.columns_skipped += 1;
            }
        }
        Ok(())
    }
}

fn alter_encoding_sql(schema: &str, table: &str, column: &str, encoding: &str) -> String {
    format!("alter table {schema}.{table} alter column {column} encode {encoding};")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alter_encoding_sql_shape() {
        let sql = alter_encoding_sql("public", "orders", "qty", "zstd");
        assert_eq!(
            sql,
            "alter table public.orders alter column qty encode zstd;"
        );
    }
}
