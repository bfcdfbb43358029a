//! Error types for the UI tree crate

use thiserror::Error;

/// Failure to turn document text into a tree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Input was empty or whitespace only
    #[error("document is empty")]
    EmptyDocument,

    /// Input contained no element at all
    #[error("document has no root element")]
    NoRootElement,

    /// A second top-level element followed the root
    #[error("multiple root elements (second one at byte {position})")]
    MultipleRoots { position: u64 },

    /// Document ended while elements were still open
    #[error("unclosed element <{tag}>")]
    UnclosedTag { tag: String },

    /// Attribute could not be read or decoded
    #[error("invalid attribute at byte {position}: {reason}")]
    InvalidAttribute { position: u64, reason: String },

    /// Low-level reader rejected the markup
    #[error("malformed markup at byte {position}: {reason}")]
    Malformed { position: u64, reason: String },
}

impl ParseError {
    /// Byte offset of the failure, when the reader reported one
    pub fn position(&self) -> Option<u64> {
        match self {
            ParseError::MultipleRoots { position }
            | ParseError::InvalidAttribute { position, .. }
            | ParseError::Malformed { position, .. } => Some(*position),
            _ => None,
        }
    }
}

/// Failure to read a `[x1,y1][x2,y2]` rectangle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoundsError {
    #[error("invalid bounds format: {0}")]
    Format(String),

    #[error("inverted bounds: {0}")]
    Inverted(String),
}

/// Predicate-path text outside the supported grammar.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported path expression at column {position}: {reason}")]
pub struct PathSyntaxError {
    pub position: usize,
    pub reason: String,
}

impl PathSyntaxError {
    pub fn new(position: usize, reason: impl Into<String>) -> Self {
        Self {
            position,
            reason: reason.into(),
        }
    }
}
