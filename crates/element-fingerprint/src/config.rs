//! Fingerprint and similarity tuning
//!
//! The default weights are empirical; they are kept as configuration.

use serde::{Deserialize, Serialize};

use crate::errors::FingerprintError;

/// How many times each component token is repeated before hashing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FingerprintWeights {
    pub resource_id: u32,
    pub text: u32,
    pub content_desc: u32,
    pub class_name: u32,
    pub path: u32,
    pub parent_context: u32,
    pub sibling_index: u32,
    pub bounds: u32,
    pub document: u32,
}

impl Default for FingerprintWeights {
    fn default() -> Self {
        Self {
            resource_id: 10,
            text: 6,
            content_desc: 6,
            class_name: 4,
            path: 8,
            parent_context: 5,
            sibling_index: 2,
            bounds: 3,
            document: 1,
        }
    }
}

impl FingerprintWeights {
    /// Weight by component key; unknown keys weigh 1.
    pub fn weight_of(&self, key: &str) -> u32 {
        match key {
            "resourceId" => self.resource_id,
            "text" => self.text,
            "contentDesc" => self.content_desc,
            "className" => self.class_name,
            "path" => self.path,
            "parentContext" => self.parent_context,
            "siblingIndex" => self.sibling_index,
            "bounds" => self.bounds,
            "document" => self.document,
            _ => 1,
        }
    }
}

/// Weights of the overall attribute similarity used to rank candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityWeights {
    pub resource_id: f64,
    pub text: f64,
    pub content_desc: f64,
    pub class_name: f64,
    pub bounds: f64,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            resource_id: 10.0,
            text: 6.0,
            content_desc: 6.0,
            class_name: 4.0,
            bounds: 3.0,
        }
    }
}

impl SimilarityWeights {
    pub fn total(&self) -> f64 {
        self.resource_id + self.text + self.content_desc + self.class_name + self.bounds
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FingerprintConfig {
    pub weights: FingerprintWeights,

    /// Add the node's bounds as a component (off: bounds move too easily)
    pub include_bounds: bool,

    /// Add a hash of the document head when document text is supplied
    pub include_document_hash: bool,

    /// Component agreement needed by `is_same_element`
    pub same_element_threshold: f64,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            weights: FingerprintWeights::default(),
            include_bounds: false,
            include_document_hash: false,
            same_element_threshold: 0.8,
        }
    }
}

impl FingerprintConfig {
    pub fn validate(&self) -> Result<(), FingerprintError> {
        if !(0.0..=1.0).contains(&self.same_element_threshold) {
            return Err(FingerprintError::InvalidConfig(format!(
                "same_element_threshold must be within [0, 1], got {}",
                self.same_element_threshold
            )));
        }
        Ok(())
    }
}
