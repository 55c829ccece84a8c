//! Relief Registry Core
//!
//! Data-consistency core for disaster-relief management: an in-memory
//! entity store over evacuation centers, evacuees, families, donations and
//! inventory, the referential-integrity rules that span them, and the
//! derived reports built on top. HTTP routing, authentication and form
//! handling are the caller's concern.

pub mod config;
pub mod error;
pub mod filter;
pub mod model;
pub mod registry;
pub mod report;
pub mod rules;
pub mod seed;
pub mod snapshot;

pub use config::ReportConfig;
pub use error::{Conflict, EntityKind, Error, Invalid};
pub use model::*;
pub use registry::Registry;
pub use report::{occupancy_percent, CenterLoad, DashboardSummary};
pub use rules::FamilyDeletion;
pub use snapshot::{Snapshot, SnapshotError};
