//! Match criteria engine
//!
//! Named strategies with fixed field presets, a registry of matchable fields
//! (own attributes plus parent/child/ancestor context), normalization of the
//! persisted criteria shape, and a matcher that evaluates criteria against a
//! parsed tree.

pub mod criteria;
pub mod errors;
pub mod fields;
pub mod matcher;
pub mod normalize;
pub mod strategy;

pub use criteria::*;
pub use errors::*;
pub use fields::*;
pub use matcher::*;
pub use normalize::*;
pub use strategy::*;
