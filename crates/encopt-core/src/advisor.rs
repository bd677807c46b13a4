//! Compression advisor
//!
//! Wraps the warehouse's native `analyze compression` facility plus the two
//! catalog lookups the applier needs: the leading sort-key column (which is
//! never re-encoded) and the table size used by the threshold modes.

use std::sync::Arc;

use encopt_client::{Row, StatementExecutor};
use encopt_common::Result;

/// One column-level recommendation from `analyze compression`.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub column: String,
    pub encoding: String,

    /// Estimated reduction exactly as the warehouse reported it; written
    /// back to the control table verbatim.
    pub reduction_raw: String,

    /// Parsed value of `reduction_raw`, used for the apply decision.
    pub reduction_pct: f64,
}

impl Recommendation {
    /// Result layout: (table, column, encoding, est_reduction_pct).
    fn from_row(row: &Row) -> Result<Self> {
        let reduction_raw = row.str(3)?.to_string();
        let reduction_pct = row.decimal_str(3)?;
        Ok(Self {
            column: row.str(1)?.to_string(),
            encoding: row.str(2)?.to_string(),
            reduction_raw,
            reduction_pct,
        })
    }
}

pub struct Advisor {
    exec: Arc<StatementExecutor>,
}

impl Advisor {
    pub fn new(exec: Arc<StatementExecutor>) -> Self {
        Self { exec }
    }

    /// Column with sort-key ordinal 1, or `None` when the table has no sort
    /// key.
    pub async fn leading_sort_key(&self, schema: &str, table: &str) -> Result<Option<String>> {
        let sql = format!(
            "select \"column\" from pg_table_def \
             where schemaname = '{schema}' and tablename = '{table}' and sortkey = 1;"
        );
        match self.exec.execute(&sql).await? {
            Some(rows) if !rows.is_empty() => Ok(Some(rows[0].str(0)?.to_string())),
            _ => Ok(None),
        }
    }

    /// Table size in MB from the catalog's size view, or `None` when the
    /// view has no row for the table.
    pub async fn table_size_mb(&self, schema: &str, table: &str) -> Result<Option<i64>> {
        let sql = format!(
            "select \"schema\" as schemaname, \"table\" as tablename, size as size_mb \
             from svv_table_info \
             where schemaname = '{schema}' and tablename = '{table}';"
        );
        match self.exec.execute(&sql).await? {
            Some(rows) if !rows.is_empty() => Ok(Some(rows[0].long(2)?)),
            _ => Ok(None),
        }
    }

    /// Run `analyze compression` on a table.
    ///
    /// Returns `None` when the statement produces no rows (an empty table,
    /// for instance).
    pub async fn analyze(&self, schema: &str, table: &str) -> Result<Option<Vec<Recommendation>>> {
        tracing::info!(schema, table, "analyzing compression");
        let sql = format!("analyze compression {schema}.{table};");
        let rows = match self.exec.execute(&sql).await? {
            Some(rows) if !rows.is_empty() => rows,
            _ => return Ok(None),
        };

        let mut recommendations = Vec::with_capacity(rows.len());
        for row in &rows {
            recommendations.push(Recommendation::from_row(row)?);
        }
        Ok(Some(recommendations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encopt_client::SqlValue;

    fn analysis_row(column: &str, encoding: &str, pct: &str) -> Row {
        Row::new(vec![
            SqlValue::Str("orders".into()),
            SqlValue::Str(column.into()),
            SqlValue::Str(encoding.into()),
            SqlValue::Str(pct.into()),
        ])
    }

    #[test]
    fn test_recommendation_from_row() {
        let rec = Recommendation::from_row(&analysis_row("qty", "zstd", "37.25")).unwrap();
        assert_eq!(rec.column, "qty");
        assert_eq!(rec.encoding, "zstd");
        assert_eq!(rec.reduction_raw, "37.25");
        assert_eq!(rec.reduction_pct, 37.25);
    }

    #[test]
    fn test_recommendation_keeps_raw_string() {
        let rec = Recommendation::from_row(&analysis_row("qty", "lzo", "0.00")).unwrap();
        assert_eq!(rec.reduction_raw, "0.00");
        assert_eq!(rec.reduction_pct, 0.0);
    }

    #[test]
    fn test_non_numeric_reduction_is_decode_error() {
        assert!(Recommendation::from_row(&analysis_row("qty", "lzo", "n/a")).is_err());
    }
}
