//! Data API trait
//!
//! The warehouse's SQL service is asynchronous: a statement is submitted,
//! its status polled, and a result set fetched once it finishes. Everything
//! above this trait is testable against an in-memory implementation.

use async_trait::async_trait;
use encopt_common::{Result, WarehouseTarget};

use crate::row::Row;

/// Service-side handle for a submitted statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StatementId(pub String);

impl std::fmt::Display for StatementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Statement lifecycle as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementState {
    Submitted,
    Picked,
    Started,
    Finished,
    Aborted,
    Failed,
}

/// Snapshot of a statement from a describe call.
#[derive(Debug, Clone)]
pub struct StatementStatus {
    pub state: StatementState,

    /// Service-reported error message, present for failed statements.
    pub error: Option<String>,

    /// Whether the statement produced a result set to fetch.
    pub has_result_set: bool,
}

/// Submit/describe/fetch surface of the warehouse data service.
#[async_trait]
pub trait DataApi: Send + Sync {
    /// Submit a statement for asynchronous execution.
    async fn submit(&self, target: &WarehouseTarget, sql: &str) -> Result<StatementId>;

    /// Report the current status of a submitted statement.
    async fn describe(&self, id: &StatementId) -> Result<StatementStatus>;

    /// Fetch the full result set of a finished statement.
    async fn fetch_rows(&self, id: &StatementId) -> Result<Vec<Row>>;
}
