//! Element fingerprints
//!
//! A fingerprint is a short opaque hash over a weighted multiset of a node's
//! identity components. Equal fingerprints mean "same element"; component
//! overlap gives a cheaper "probably same" judgment. The similarity helpers
//! here are shared with the relocator's scoring strategies.

pub mod components;
pub mod config;
pub mod errors;
pub mod generator;
pub mod similarity;

pub use components::FingerprintComponents;
pub use config::{FingerprintConfig, FingerprintWeights, SimilarityWeights};
pub use errors::FingerprintError;
pub use generator::{generate_fingerprint, is_same_element, Fingerprint, FingerprintGenerator};
pub use similarity::{levenshtein, text_similarity, weighted_similarity, AttributeProfile, TextMatchOptions};
