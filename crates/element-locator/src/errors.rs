//! Error types for the locator

use thiserror::Error;

/// Locator error enumeration
///
/// "Not found" during relocation is a result, not an error; these cover
/// unusable input and configuration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LocatorError {
    /// Node id outside the tree it was used with
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Locator or context could not be read
    #[error("Invalid locator: {0}")]
    InvalidLocator(String),

    /// Strategy name outside the known set
    #[error("Unknown relocation strategy: {0}")]
    UnknownStrategy(String),

    /// Relocator configuration out of range
    #[error("Invalid relocator config: {0}")]
    InvalidConfig(String),
}

impl LocatorError {
    /// Get error severity (0=low, 1=medium, 2=high)
    pub fn severity(&self) -> u8 {
        match self {
            LocatorError::InvalidConfig(_) | LocatorError::InvalidLocator(_) => 2,
            LocatorError::ElementNotFound(_) => 1,
            LocatorError::UnknownStrategy(_) => 0,
        }
    }
}

impl From<serde_json::Error> for LocatorError {
    fn from(err: serde_json::Error) -> Self {
        LocatorError::InvalidLocator(err.to_string())
    }
}
