use thiserror::Error;
use ui_tree::ParseError;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum SnapshotError {
    #[error("snapshot document did not parse: {0}")]
    Parse(#[from] ParseError),
    #[error("snapshot hash mismatch (stored {stored}, computed {computed})")]
    HashMismatch { stored: String, computed: String },
    #[error("snapshot unreadable: {0}")]
    Invalid(String),
}

impl SnapshotError {
    /// Get error severity (0=low, 1=medium, 2=high)
    pub fn severity(&self) -> u8 {
        match self {
            SnapshotError::Parse(_) | SnapshotError::Invalid(_) => 2,
            SnapshotError::HashMismatch { .. } => 1,
        }
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(err: serde_json::Error) -> Self {
        SnapshotError::Invalid(err.to_string())
    }
}
