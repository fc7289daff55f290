//! Storage error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Entry rejected: {0}")]
    Rejected(String),

    #[error("Invalid cache key: {0}")]
    InvalidKey(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl StorageError {
    /// Whether the tier refused the write because of its own bounds
    pub fn is_rejected(&self) -> bool {
        matches!(self, StorageError::Rejected(_))
    }
}
