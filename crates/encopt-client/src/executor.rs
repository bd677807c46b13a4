//! Polling statement executor
//!
//! One statement in flight at a time: submit, poll on a fixed interval until
//! the service reports a terminal state, then fetch the result set if one
//! exists. There is no timeout and no cancellation; a statement that never
//! terminates blocks the run.

use std::sync::Arc;
use std::time::Duration;

use encopt_common::{EncoptError, Result, WarehouseTarget, DEFAULT_POLL_INTERVAL_SECS};

use crate::api::{DataApi, StatementState};
use crate::row::Row;

pub struct StatementExecutor {
    api: Arc<dyn DataApi>,
    target: WarehouseTarget,
    poll_interval: Duration,
}

impl StatementExecutor {
    pub fn new(api: Arc<dyn DataApi>, target: WarehouseTarget) -> Self {
        Self {
            api,
            target,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        }
    }

    /// Override the poll interval (tests use a zero interval).
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Run a statement to completion.
    ///
    /// Returns `Some(rows)` when the statement finishes with a result set,
    /// `None` when it finishes without one (DDL, DML). Aborted and failed
    /// statements surface as their error variants; any service-level error
    /// from submit/describe/fetch propagates unchanged.
    pub async fn execute(&self, sql: &str) -> Result<Option<Vec<Row>>> {
        let id = self.api.submit(&self.target, sql).await?;
        tracing::trace!(statement = %id, "submitted statement");

        loop {
            let status = self.api.describe(&id).await?;
            match status.state {
                StatementState::Finished => {
                    if status.has_result_set {
                        let rows = self.api.fetch_rows(&id).await?;
                        return Ok(Some(rows));
                    }
                    return Ok(None);
                }
                StatementState::Aborted => {
                    return Err(EncoptError::ExecutionAborted { id: id.0 });
                }
                StatementState::Failed => {
                    return Err(EncoptError::ExecutionFailed {
                        id: id.0,
                        message: status.error.unwrap_or_else(|| "unknown error".to_string()),
                    });
                }
                state => {
                    tracing::trace!(statement = %id, ?state, "statement in flight");
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::api::{StatementId, StatementStatus};
    use crate::row::SqlValue;

    /// Replays a scripted sequence of describe statuses for one statement.
    struct ScriptedApi {
        statuses: Mutex<Vec<StatementStatus>>,
        rows: Vec<Row>,
        describe_calls: Mutex<usize>,
    }

    impl ScriptedApi {
        fn new(statuses: Vec<StatementStatus>, rows: Vec<Row>) -> Self {
            Self {
                statuses: Mutex::new(statuses),
                rows,
                describe_calls: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl DataApi for ScriptedApi {
        async fn submit(&self, _target: &WarehouseTarget, _sql: &str) -> Result<StatementId> {
            Ok(StatementId("stmt-1".to_string()))
        }

        async fn describe(&self, _id: &StatementId) -> Result<StatementStatus> {
            *self.describe_calls.lock().unwrap() += 1;
            let mut statuses = self.statuses.lock().unwrap();
            Ok(statuses.remove(0))
        }

        async fn fetch_rows(&self, _id: &StatementId) -> Result<Vec<Row>> {
            Ok(self.rows.clone())
        }
    }

    fn status(state: StatementState, has_result_set: bool) -> StatementStatus {
        StatementStatus {
            state,
            error: None,
            has_result_set,
        }
    }

    fn executor(api: ScriptedApi) -> StatementExecutor {
        let target = WarehouseTarget::new("cluster", "db", "secret");
        StatementExecutor::new(Arc::new(api), target).with_poll_interval(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_finished_with_result_set_returns_rows() {
        let rows = vec![Row::new(vec![SqlValue::Str("a".into())])];
        let api = ScriptedApi::new(vec![status(StatementState::Finished, true)], rows.clone());
        let exec = executor(api);

        let got = exec.execute("select 1").await.unwrap();
        assert_eq!(got, Some(rows));
    }

    #[tokio::test]
    async fn test_finished_without_result_set_returns_none() {
        let api = ScriptedApi::new(vec![status(StatementState::Finished, false)], vec![]);
        let exec = executor(api);

        let got = exec.execute("truncate t").await.unwrap();
        assert_eq!(got, None);
    }

    #[tokio::test]
    async fn test_polls_until_terminal() {
        let api = Arc::new(ScriptedApi::new(
            vec![
                status(StatementState::Submitted, false),
                status(StatementState::Picked, false),
                status(StatementState::Started, false),
                status(StatementState::Finished, false),
            ],
            vec![],
        ));
        let target = WarehouseTarget::new("cluster", "db", "secret");
        let exec = StatementExecutor::new(api.clone(), target)
            .with_poll_interval(Duration::ZERO);

        exec.execute("insert into t values (1)").await.unwrap();

        assert_eq!(*api.describe_calls.lock().unwrap(), 4);
    }

    #[tokio::test]
    async fn test_aborted_maps_to_execution_aborted() {
        let api = ScriptedApi::new(vec![status(StatementState::Aborted, false)], vec![]);
        let exec = executor(api);

        let err = exec.execute("select 1").await.unwrap_err();
        assert!(matches!(err, EncoptError::ExecutionAborted { .. }));
    }

    #[tokio::test]
    async fn test_failed_carries_service_message() {
        let api = ScriptedApi::new(
            vec![StatementStatus {
                state: StatementState::Failed,
                error: Some("permission denied".to_string()),
                has_result_set: false,
            }],
            vec![],
        );
        let exec = executor(api);

        let err = exec.execute("select 1").await.unwrap_err();
        match err {
            EncoptError::ExecutionFailed { message, .. } => {
                assert_eq!(message, "permission denied");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
