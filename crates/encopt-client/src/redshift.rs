//! AWS Redshift Data API implementation of [`DataApi`].
//!
//! Credentials and region come from the default provider chain. Service
//! errors are mapped onto the workspace taxonomy by error code; all of them
//! terminate the run.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_redshiftdata::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_redshiftdata::types::{Field, StatusString};
use aws_sdk_redshiftdata::Client;
use encopt_common::{EncoptError, Result, WarehouseTarget};

use crate::api::{DataApi, StatementId, StatementState, StatementStatus};
use crate::row::{Row, SqlValue};

pub struct RedshiftDataApi {
    client: Client,
}

impl RedshiftDataApi {
    /// Build a client from the ambient AWS configuration.
    pub async fn connect() -> Self {
        let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self {
            client: Client::new(&config),
        }
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataApi for RedshiftDataApi {
    async fn submit(&self, target: &WarehouseTarget, sql: &str) -> Result<StatementId> {
        let out = self
            .client
            .execute_statement()
            .cluster_identifier(&target.cluster_id)
            .database(&target.database)
            .secret_arn(&target.secret_arn)
            .sql(sql)
            .send()
            .await
            .map_err(map_sdk_error)?;

        let id = out
            .id()
            .ok_or_else(|| EncoptError::Unknown("service returned no statement id".to_string()))?;
        Ok(StatementId(id.to_string()))
    }

    async fn describe(&self, id: &StatementId) -> Result<StatementStatus> {
        let out = self
            .client
            .describe_statement()
            .id(&id.0)
            .send()
            .await
            .map_err(map_sdk_error)?;

        let state = match out.status() {
            Some(StatusString::Submitted) => StatementState::Submitted,
            Some(StatusString::Picked) => StatementState::Picked,
            Some(StatusString::Started) => StatementState::Started,
            Some(StatusString::Finished) => StatementState::Finished,
            Some(StatusString::Aborted) => StatementState::Aborted,
            Some(StatusString::Failed) => StatementState::Failed,
            other => {
                return Err(EncoptError::Unknown(format!(
                    "statement {id} in unrecognized state {other:?}"
                )))
            }
        };

        Ok(StatementStatus {
            state,
            error: out.error().map(str::to_string),
            has_result_set: out.has_result_set().unwrap_or(false),
        })
    }

    async fn fetch_rows(&self, id: &StatementId) -> Result<Vec<Row>> {
        let mut rows = Vec::new();
        let mut next_token: Option<String> = None;

        // Drain every result page.
        loop {
            let mut req = self.client.get_statement_result().id(&id.0);
            if let Some(token) = &next_token {
                req = req.next_token(token);
            }
            let out = req.send().await.map_err(map_sdk_error)?;

            for record in out.records() {
                rows.push(decode_record(record));
            }

            match out.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        Ok(rows)
    }
}

fn decode_record(record: &[Field]) -> Row {
    let values = record
        .iter()
        .map(|field| match field {
            Field::StringValue(s) => SqlValue::Str(s.clone()),
            Field::LongValue(v) => SqlValue::Long(*v),
            Field::DoubleValue(v) => SqlValue::Double(*v),
            Field::BooleanValue(v) => SqlValue::Bool(*v),
            Field::IsNull(_) => SqlValue::Null,
            _ => SqlValue::Null,
        })
        .collect();
    Row::new(values)
}

/// Map a service error onto the workspace taxonomy by its error code.
fn map_sdk_error<E, R>(err: SdkError<E, R>) -> EncoptError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    let message = match err.message() {
        Some(m) => m.to_string(),
        None => format!("{}", DisplayErrorContext(&err)),
    };

    match err.code() {
        Some("ValidationException") => EncoptError::Validation(message),
        Some("ActiveStatementsExceededException") => {
            EncoptError::ActiveStatementsExceeded(message)
        }
        Some("ResourceNotFoundException") => EncoptError::ResourceNotFound(message),
        Some("InternalServerException") => EncoptError::InternalService(message),
        Some(code) => EncoptError::Client(format!("{code}: {message}")),
        None => EncoptError::Unknown(message),
    }
}
