//! Locate & relocate - multi-strategy node relocation
//!
//! This crate turns a node picked once into a portable [`ElementContext`] and
//! later finds the same node in another tree with:
//! - Exact absolute path (primary strategy)
//! - AND-ed predicate path over identifier, text and class
//! - Attribute scoring with fuzzy text
//! - Bounds proximity within a pixel tolerance
//! - Fingerprint similarity (last resort)

pub mod config;
pub mod context;
pub mod errors;
pub mod relocator;
pub mod strategies;
pub mod types;

pub use config::*;
pub use context::*;
pub use errors::*;
pub use relocator::*;
pub use strategies::*;
pub use types::*;
