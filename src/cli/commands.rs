use clap::Subcommand;

use super::criteria::CriteriaArgs;
use super::fingerprint::FingerprintArgs;
use super::relocate::{CaptureArgs, RelocateArgs};
use super::snapshot::{HealthArgs, ResolveArgs};
use super::tree::{InspectArgs, PathArgs, QueryArgs};

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// List every node with its label and absolute path
    Inspect(InspectArgs),

    /// Evaluate an absolute or predicate path
    Query(QueryArgs),

    /// Print the paths that address a node
    Path(PathArgs),

    /// Build or evaluate match criteria
    Criteria(CriteriaArgs),

    /// Compute a node's fingerprint and its components
    Fingerprint(FingerprintArgs),

    /// Save what is needed to find a node again
    Capture(CaptureArgs),

    /// Find a captured node in a new dump
    Relocate(RelocateArgs),

    /// Locate a saved node inside a stored snapshot
    Resolve(ResolveArgs),

    /// Report on the quality of a stored snapshot
    Health(HealthArgs),
}
