//! UI hierarchy model
//!
//! This crate is the substrate the locator engine works on:
//! - Arena tree of UiAutomator-style nodes with parent back-references
//! - Dump parser with an explicit parent-link pass
//! - Absolute structural paths (build and re-walk)
//! - A closed predicate-path grammar (`//tag[@attr='v']` and friends)

pub mod bounds;
pub mod errors;
pub mod model;
pub mod parser;
pub mod path;
pub mod predicate;

pub use bounds::Bounds;
pub use errors::*;
pub use model::{keys, Ancestors, Descendants, NodeFlag, NodeId, UiNode, UiTree};
pub use parser::{attach_parent_links, parse};
pub use path::{build_absolute_path, evaluate_absolute_path};
pub use predicate::{
    evaluate_predicate_path, evaluate_predicate_path_all, Predicate, PredicatePath, TagSelector,
};
