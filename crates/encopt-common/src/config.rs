//! Job configuration
//!
//! Everything the pipeline needs travels in explicit structs; there is no
//! global state and no environment lookup outside the warehouse client's own
//! credential chain.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Seconds between status polls while a statement is in flight.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;

/// Identifies the warehouse a statement runs against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WarehouseTarget {
    /// Cluster identifier.
    pub cluster_id: String,

    /// Database to connect to.
    pub database: String,

    /// Secret reference (ARN or friendly name) holding the credentials.
    pub secret_arn: String,
}

impl WarehouseTarget {
    pub fn new(
        cluster_id: impl Into<String>,
        database: impl Into<String>,
        secret_arn: impl Into<String>,
    ) -> Self {
        Self {
            cluster_id: cluster_id.into(),
            database: database.into(),
            secret_arn: secret_arn.into(),
        }
    }
}

/// Which tables of the schema get analyzed and re-encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CompressionMode {
    /// Every table in the schema.
    #[value(name = "compress-all")]
    CompressAll,

    /// Only tables at or under the size threshold.
    #[value(name = "compress-small")]
    CompressSmall,

    /// Only tables over the size threshold.
    #[value(name = "compress-large")]
    CompressLarge,
}

impl CompressionMode {
    /// Whether this mode needs the threshold argument.
    pub fn needs_threshold(&self) -> bool {
        !matches!(self, CompressionMode::CompressAll)
    }

    /// Mode filter over a table's size.
    ///
    /// The size arrives in MB and is divided by 1024 twice (keeping the
    /// fractional part) before comparing against the threshold.
    /// `compress-all` ignores the threshold entirely.
    pub fn selects(&self, size_mb: i64, threshold: Option<u64>) -> bool {
        match self {
            CompressionMode::CompressAll => true,
            CompressionMode::CompressSmall => !is_over_threshold(size_mb, threshold),
            CompressionMode::CompressLarge => is_over_threshold(size_mb, threshold),
        }
    }
}

fn is_over_threshold(size_mb: i64, threshold: Option<u64>) -> bool {
    match threshold {
        // True division: fractional-TB sizes must not floor to whole TB.
        Some(t) => (size_mb as f64) / 1024.0 / 1024.0 > t as f64,
        None => false,
    }
}

impl std::fmt::Display for CompressionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CompressionMode::CompressAll => "compress-all",
            CompressionMode::CompressSmall => "compress-small",
            CompressionMode::CompressLarge => "compress-large",
        };
        write!(f, "{s}")
    }
}

/// One full invocation of the utility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub target: WarehouseTarget,

    /// Schema whose tables get inventoried and re-encoded.
    pub schema: String,

    pub mode: CompressionMode,

    /// Size threshold in TB for the small/large modes; `None` for
    /// `compress-all`.
    pub threshold: Option<u64>,

    /// Poll interval for in-flight statements, in seconds.
    pub poll_interval_secs: u64,
}

impl JobConfig {
    pub fn new(
        target: WarehouseTarget,
        schema: impl Into<String>,
        mode: CompressionMode,
        threshold: Option<u64>,
    ) -> Self {
        Self {
            target,
            schema: schema.into(),
            mode,
            threshold,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }

    /// Threshold modes must carry a positive threshold.
    pub fn validate(&self) -> crate::Result<()> {
        if self.mode.needs_threshold() {
            match self.threshold {
                Some(t) if t > 0 => Ok(()),
                _ => Err(crate::EncoptError::InvalidArgument(format!(
                    "mode {} requires a positive threshold value in TB",
                    self.mode
                ))),
            }
        } else {
            Ok(())
        }
    }
}
