use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FingerprintError {
    #[error("invalid fingerprint config: {0}")]
    InvalidConfig(String),
}
