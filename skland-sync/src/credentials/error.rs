//! Credential persistence errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The backing store refused the write.
    #[error("Store rejected credential: {0}")]
    Rejected(String),
}

impl CredentialError {
    /// Check if this error is transient and the write may be retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
