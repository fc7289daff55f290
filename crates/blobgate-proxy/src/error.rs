//! Proxy error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Origin object not found: {0}")]
    NotFound(String),

    #[error("Origin store error: {0}")]
    Store(#[from] object_store::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}
