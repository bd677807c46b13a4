//! Warehouse statement-execution layer: the asynchronous submit/describe/
//! fetch surface, the typed result-row model, the polling executor, and the
//! production Redshift Data API client.

pub mod api;
pub mod executor;
pub mod redshift;
pub mod row;

pub use api::{DataApi, StatementId, StatementState, StatementStatus};
pub use executor::StatementExecutor;
pub use redshift::RedshiftDataApi;
pub use row::{Row, SqlValue};
