//! Error taxonomy shared by every crate in the workspace.
//!
//! Every variant is fatal to the run: the entry point is the single place
//! that maps an error to process exit behavior.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncoptError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Statement {id} was aborted by the warehouse")]
    ExecutionAborted { id: String },

    #[error("Statement {id} failed: {message}")]
    ExecutionFailed { id: String, message: String },

    #[error("Active statements exceeded: {0}")]
    ActiveStatementsExceeded(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Internal service error: {0}")]
    InternalService(String),

    #[error("Client error: {0}")]
    Client(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Row decode error: {0}")]
    Decode(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

pub type Result<T> = std::result::Result<T, EncoptError>;
