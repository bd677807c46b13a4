//! Shared types for the encopt workspace: error taxonomy and job
//! configuration.

pub mod config;
pub mod error;

pub use config::{
    CompressionMode, JobConfig, WarehouseTarget, DEFAULT_POLL_INTERVAL_SECS,
};
pub use error::{EncoptError, Result};
