//! Column-encoding optimization core: control-table bookkeeping, the
//! compression advisor, the applier, and the pipeline tying them together.

pub mod advisor;
pub mod applier;
pub mod control;
pub mod pipeline;

pub use advisor::{Advisor, Recommendation};
pub use applier::{Applier, RunSummary};
pub use control::{CatalogColumn, ControlTable, CONTROL_TABLE, CONTROL_TABLE_NAME};
