//! Error types for match criteria

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CriteriaError {
    /// Strategy name outside the known set
    #[error("Unknown match strategy: {0}")]
    UnknownStrategy(String),

    /// Match mode name outside equals/contains/regex
    #[error("Unknown match mode: {0}")]
    UnknownMatchMode(String),

    /// Node id not present in the tree
    #[error("Node not found: {0}")]
    NodeNotFound(String),
}

impl CriteriaError {
    /// Get error severity (0=low, 1=medium, 2=high)
    pub fn severity(&self) -> u8 {
        match self {
            CriteriaError::NodeNotFound(_) => 2,
            CriteriaError::UnknownStrategy(_) | CriteriaError::UnknownMatchMode(_) => 0,
        }
    }
}
