//! Core types for the relocation pipeline

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use ui_tree::NodeId;

use crate::context::Locator;
use crate::errors::LocatorError;

/// Relocation strategy enumeration
///
/// Variants are listed in the default fallback order, from the most
/// structural to the most forgiving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelocationStrategy {
    /// Re-walk the captured absolute path
    #[serde(alias = "exact-xpath")]
    ExactPath,

    /// AND-ed equality predicates on identifier, text and class
    #[serde(alias = "predicate-xpath")]
    PredicatePath,

    /// Exact and fuzzy attribute scoring over every node
    #[serde(alias = "attributes")]
    AttributeScoring,

    /// Closest bounds within a pixel tolerance
    #[serde(alias = "bounds")]
    BoundsProximity,

    /// Fingerprint component agreement plus weighted similarity
    #[serde(alias = "fuzzy")]
    FuzzyFingerprint,
}

impl RelocationStrategy {
    /// Get strategy name as string
    pub fn name(&self) -> &'static str {
        match self {
            RelocationStrategy::ExactPath => "exact-path",
            RelocationStrategy::PredicatePath => "predicate-path",
            RelocationStrategy::AttributeScoring => "attribute-scoring",
            RelocationStrategy::BoundsProximity => "bounds-proximity",
            RelocationStrategy::FuzzyFingerprint => "fuzzy-fingerprint",
        }
    }

    /// Get all strategies in fallback order
    pub fn fallback_chain() -> Vec<RelocationStrategy> {
        vec![
            RelocationStrategy::ExactPath,
            RelocationStrategy::PredicatePath,
            RelocationStrategy::AttributeScoring,
            RelocationStrategy::BoundsProximity,
            RelocationStrategy::FuzzyFingerprint,
        ]
    }
}

impl fmt::Display for RelocationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RelocationStrategy {
    type Err = LocatorError;

    /// Accepts the current names plus the short names older saved configs use.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact-path" | "exact-xpath" => Ok(RelocationStrategy::ExactPath),
            "predicate-path" | "predicate-xpath" => Ok(RelocationStrategy::PredicatePath),
            "attribute-scoring" | "attributes" => Ok(RelocationStrategy::AttributeScoring),
            "bounds-proximity" | "bounds" => Ok(RelocationStrategy::BoundsProximity),
            "fuzzy-fingerprint" | "fuzzy" => Ok(RelocationStrategy::FuzzyFingerprint),
            other => Err(LocatorError::UnknownStrategy(other.to_string())),
        }
    }
}

/// Node candidate produced by one strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Node in the tree the strategy ran against
    pub node: NodeId,

    /// Strategy that produced this candidate
    pub strategy: RelocationStrategy,

    /// Confidence score (0.0-1.0)
    pub confidence: f64,

    /// Why this node was considered
    pub reasons: Vec<String>,
}

impl Candidate {
    /// Create a new candidate
    pub fn new(node: NodeId, strategy: RelocationStrategy, confidence: f64) -> Self {
        Self {
            node,
            strategy,
            confidence,
            reasons: Vec::new(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reasons.push(reason.into());
        self
    }

    /// Check if this is a high-confidence match (>= 0.8)
    pub fn is_high_confidence(&self) -> bool {
        self.confidence >= 0.8
    }

    /// Check if this is an acceptable match (>= 0.5)
    pub fn is_acceptable(&self) -> bool {
        self.confidence >= 0.5
    }
}

/// Every candidate of every strategy, ranked by confidence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackPlan {
    /// Locator the plan was built for
    pub primary: Locator,

    /// Candidates, highest confidence first
    pub fallbacks: Vec<Candidate>,

    /// Whether any strategy produced a candidate
    pub has_fallbacks: bool,
}

impl FallbackPlan {
    /// Create an empty plan for `primary`
    pub fn new(primary: Locator) -> Self {
        Self {
            primary,
            fallbacks: Vec::new(),
            has_fallbacks: false,
        }
    }

    /// Add fallback candidate
    pub fn add_fallback(&mut self, candidate: Candidate) {
        self.fallbacks.push(candidate);
        self.has_fallbacks = true;
    }

    /// Sort by confidence, keeping strategy order among equals
    pub fn rank(&mut self) {
        self.fallbacks.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    }

    /// Get best fallback candidate (highest confidence, earliest on ties)
    pub fn best_fallback(&self) -> Option<&Candidate> {
        self.fallbacks.iter().reduce(|best, candidate| {
            if candidate.confidence > best.confidence {
                candidate
            } else {
                best
            }
        })
    }

    /// Get acceptable fallback candidates (confidence >= 0.5)
    pub fn acceptable_fallbacks(&self) -> Vec<&Candidate> {
        self.fallbacks.iter().filter(|c| c.is_acceptable()).collect()
    }
}

/// Outcome of a relocation
///
/// Never persisted: always recomputed from a saved context and a live tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelocationResult {
    /// Relocated node, `None` when every strategy failed
    pub node: Option<NodeId>,

    /// Strategy that produced `node`; serialized as `"none"` when absent
    #[serde(with = "strategy_or_none")]
    pub strategy_used: Option<RelocationStrategy>,

    /// Confidence score (0.0-1.0); 0 when nothing was found
    pub confidence: f64,

    /// Reasons collected from every attempted strategy, in pipeline order
    pub reasons: Vec<String>,
}

impl RelocationResult {
    pub fn found(
        node: NodeId,
        strategy: RelocationStrategy,
        confidence: f64,
        reasons: Vec<String>,
    ) -> Self {
        Self {
            node: Some(node),
            strategy_used: Some(strategy),
            confidence,
            reasons,
        }
    }

    pub fn not_found(reasons: Vec<String>) -> Self {
        Self {
            node: None,
            strategy_used: None,
            confidence: 0.0,
            reasons,
        }
    }

    pub fn is_found(&self) -> bool {
        self.node.is_some()
    }

    /// Name of the strategy used, `"none"` when nothing was found
    pub fn strategy_name(&self) -> &'static str {
        self.strategy_used.map(|s| s.name()).unwrap_or("none")
    }
}

mod strategy_or_none {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<RelocationStrategy>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.map(|s| s.name()).unwrap_or("none"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<RelocationStrategy>, D::Error> {
        let name = String::deserialize(deserializer)?;
        if name == "none" {
            return Ok(None);
        }
        name.parse().map(Some).map_err(serde::de::Error::custom)
    }
}
