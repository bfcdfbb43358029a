//! Relocator configuration

use element_fingerprint::{SimilarityWeights, TextMatchOptions};
use serde::{Deserialize, Serialize};
use ui_tree::keys;

use crate::errors::LocatorError;
use crate::types::RelocationStrategy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelocatorConfig {
    /// Strategies in the order they are tried
    pub strategies: Vec<RelocationStrategy>,

    /// Attributes worth 30 points on exact equality
    pub exact_attributes: Vec<String>,

    /// Attributes worth up to 20 points by text similarity
    pub fuzzy_attributes: Vec<String>,

    pub ignore_case: bool,

    pub allow_partial_text: bool,

    /// Maximum edge deviation in pixels
    pub bounds_tolerance: u32,

    /// Minimum similarity for a fuzzy attribute to score
    pub text_similarity: f64,

    /// Component agreement needed by the fuzzy-fingerprint strategy
    pub fuzzy_threshold: f64,

    pub similarity_weights: SimilarityWeights,
}

impl Default for RelocatorConfig {
    fn default() -> Self {
        Self {
            strategies: RelocationStrategy::fallback_chain(),
            exact_attributes: vec![keys::RESOURCE_ID.to_string()],
            fuzzy_attributes: vec![keys::TEXT.to_string(), keys::CONTENT_DESC.to_string()],
            ignore_case: true,
            allow_partial_text: true,
            bounds_tolerance: 10,
            text_similarity: 0.7,
            fuzzy_threshold: 0.6,
            similarity_weights: SimilarityWeights::default(),
        }
    }
}

impl RelocatorConfig {
    pub fn text_options(&self) -> TextMatchOptions {
        TextMatchOptions {
            ignore_case: self.ignore_case,
            allow_partial_text: self.allow_partial_text,
        }
    }

    pub fn with_strategies(mut self, strategies: Vec<RelocationStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn with_bounds_tolerance(mut self, tolerance: u32) -> Self {
        self.bounds_tolerance = tolerance;
        self
    }

    pub fn validate(&self) -> Result<(), LocatorError> {
        if self.strategies.is_empty() {
            return Err(LocatorError::InvalidConfig(
                "strategy list is empty".to_string(),
            ));
        }
        for (name, value) in [
            ("text_similarity", self.text_similarity),
            ("fuzzy_threshold", self.fuzzy_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(LocatorError::InvalidConfig(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        if self.similarity_weights.total() <= 0.0 {
            return Err(LocatorError::InvalidConfig(
                "similarity weights sum to zero".to_string(),
            ));
        }
        Ok(())
    }
}
