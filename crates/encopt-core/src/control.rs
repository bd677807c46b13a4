//! Control table manager
//!
//! Owns `public.encoding_control`, the per-column journal of encoding
//! decisions. The table is rebuilt on every invocation: created if absent,
//! truncated, then reloaded from the system catalog.

use std::sync::Arc;

use encopt_client::{Row, StatementExecutor};
use encopt_common::{EncoptError, Result};

/// Fully qualified name of the journal table.
pub const CONTROL_TABLE: &str = "public.encoding_control";

/// Bare table name, excluded from its own inventory.
pub const CONTROL_TABLE_NAME: &str = "encoding_control";

/// One (schema, table, column, encoding) tuple from the system catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogColumn {
    pub schema: String,
    pub table: String,
    pub column: String,
    pub encoding: String,
}

impl CatalogColumn {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            schema: row.str(0)?.to_string(),
            table: row.str(1)?.to_string(),
            column: row.str(2)?.to_string(),
            encoding: row.str(3)?.to_string(),
        })
    }
}

pub struct ControlTable {
    exec: Arc<StatementExecutor>,
}

impl ControlTable {
    pub fn new(exec: Arc<StatementExecutor>) -> Self {
        Self { exec }
    }

    /// Create the control table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        tracing::info!("creating control table if not exists");
        self.exec.execute(CREATE_CONTROL_TABLE_SQL).await?;
        Ok(())
    }

    /// Drop every row from the previous run.
    pub async fn reset(&self) -> Result<()> {
        tracing::info!("truncating control table");
        self.exec
            .execute(&format!("truncate {CONTROL_TABLE}"))
            .await?;
        Ok(())
    }

    /// Reload the control table from the system catalog.
    ///
    /// Inserts one row per column of every table in `schema` (the control
    /// table itself excluded), with the recommendation and status fields at
    /// their defaults. A schema with no tables is fatal.
    pub async fn populate(&self, schema: &str) -> Result<usize> {
        let rows = match self.exec.execute(&list_columns_sql(schema)).await? {
            Some(rows) if !rows.is_empty() => rows,
            _ => {
                return Err(EncoptError::Catalog(format!(
                    "schema {schema} does not exist or does not have any tables"
                )))
            }
        };

        tracing::info!(schema, columns = rows.len(), "loading control table");
        let mut inserted = 0;
        for row in &rows {
            let column = CatalogColumn::from_row(row)?;
            self.exec.execute(&insert_row_sql(&column)).await?;
            inserted += 1;
        }
        Ok(inserted)
    }

    /// Distinct table names journaled for `schema` in the current run.
    pub async fn tables(&self, schema: &str) -> Result<Vec<String>> {
        let rows = self.exec.execute(&list_tables_sql(schema)).await?;
        let mut tables = Vec::new();
        for row in rows.unwrap_or_default() {
            tables.push(row.str(0)?.to_string());
        }
        Ok(tables)
    }

    /// Record the applier's decision for one column.
    pub async fn record(
        &self,
        schema: &str,
        table: &str,
        column: &str,
        encoding: &str,
        est_red_pct: &str,
        altered: bool,
    ) -> Result<()> {
        self.exec
            .execute(&update_row_sql(
                schema, table, column, encoding, est_red_pct, altered,
            ))
            .await?;
        Ok(())
    }
}

const CREATE_CONTROL_TABLE_SQL: &str = "\
create table if not exists public.encoding_control ( \
schema_name character varying(100) not null encode lzo, \
table_name character varying(100) not null encode lzo, \
column_name character varying(100) not null encode lzo, \
curr_encoding_type character varying(20) not null encode lzo, \
recmd_encoding_type character varying(20) not null default 'unknown' encode lzo, \
est_red_pct character varying(20) not null default '0.00' encode lzo, \
analyze_ind character(1) not null default 'N'::bpchar encode lzo, \
alter_status character(1) not null default 'N'::bpchar encode lzo, \
update_timestamp timestamp without time zone encode az64 \
) diststyle auto;";

fn list_columns_sql(schema: &str) -> String {
    format!(
        "select schemaname, tablename, \"column\" as columnname, encoding \
         from pg_table_def \
         where schemaname = '{schema}' and tablename <> '{CONTROL_TABLE_NAME}';"
    )
}

fn insert_row_sql(column: &CatalogColumn) -> String {
    format!(
        "insert into {CONTROL_TABLE} values ('{}', '{}', '{}', '{}', \
         default, default, default, default, current_timestamp);",
        column.schema, column.table, column.column, column.encoding
    )
}

fn list_tables_sql(schema: &str) -> String {
    format!(
        "select distinct table_name from {CONTROL_TABLE} where schema_name = '{schema}';"
    )
}

fn update_row_sql(
    schema: &str,
    table: &str,
    column: &str,
    encoding: &str,
    est_red_pct: &str,
    altered: bool,
) -> String {
    let alter_status = if altered { "Y" } else { "N" };
    format!(
        "update {CONTROL_TABLE} \
         set recmd_encoding_type = '{encoding}', \
         est_red_pct = '{est_red_pct}', \
         analyze_ind = 'Y', \
         alter_status = '{alter_status}', \
         update_timestamp = current_timestamp \
         where schema_name = '{schema}' \
         and table_name = '{table}' \
         and column_name = '{column}';"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use encopt_client::SqlValue;

    #[test]
    fn test_catalog_column_from_row() {
        let row = Row::new(vec![
            SqlValue::Str("public".into()),
            SqlValue::Str("orders".into()),
            SqlValue::Str("order_id".into()),
            SqlValue::Str("az64".into()),
        ]);
        let column = CatalogColumn::from_row(&row).unwrap();
        assert_eq!(column.table, "orders");
        assert_eq!(column.encoding, "az64");
    }

    #[test]
    fn test_list_columns_excludes_control_table() {
        let sql = list_columns_sql("sales");
        assert!(sql.contains("schemaname = 'sales'"));
        assert!(sql.contains("tablename <> 'encoding_control'"));
    }

    #[test]
    fn test_insert_row_uses_defaults_and_timestamp() {
        let column = CatalogColumn {
            schema: "public".into(),
            table: "orders".into(),
            column: "order_id".into(),
            encoding: "az64".into(),
        };
        let sql = insert_row_sql(&column);
        assert!(sql.contains("'public', 'orders', 'order_id', 'az64'"));
        assert!(sql.contains("default, default, default, default, current_timestamp"));
    }

    #[test]
    fn test_update_row_alter_status() {
        let sql = update_row_sql("public", "orders", "qty", "zstd", "12.50", true);
        assert!(sql.contains("alter_status = 'Y'"));
        assert!(sql.contains("analyze_ind = 'Y'"));
        assert!(sql.contains("est_red_pct = '12.50'"));

        let sql = update_row_sql("public", "orders", "qty", "zstd", "0.00", false);
        assert!(sql.contains("alter_status = 'N'"));
        assert!(sql.contains("analyze_ind = 'Y'"));
    }
}
