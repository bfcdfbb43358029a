//! Saved snapshots and the "reopen a saved reference" entry point
//!
//! - [`Snapshot`]: document text plus hash, capture time and source context
//! - [`SnapshotResolver`]: parse a snapshot and locate a saved node in it
//! - [`TreeCache`]: caller-owned cache of parsed trees keyed by hash
//! - [`check_health`]: quality report for a stored snapshot

pub mod cache;
pub mod errors;
pub mod hash;
pub mod health;
pub mod model;
pub mod resolver;

pub use cache::TreeCache;
pub use errors::SnapshotError;
pub use health::{
    check_health, check_health_at, HealthChecks, HealthIssue, HealthSeverity, IssueLevel,
    SnapshotHealth,
};
pub use model::{Snapshot, SourceContext};
pub use resolver::{Resolution, SnapshotResolver};
