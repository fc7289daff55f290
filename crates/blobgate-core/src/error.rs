//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Origin returned no content type for {0}")]
    MissingContentType(String),

    #[error("Proxy error: {0}")]
    Proxy(#[from] blobgate_proxy::ProxyError),
}

/// Failure to turn stored bytes back into an envelope
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Malformed envelope: {0}")]
    Malformed(String),

    #[error("Envelope followed by {0} unexpected bytes")]
    TrailingBytes(usize),
}

/// Why a tier probe produced nothing usable
#[derive(Error, Debug)]
pub enum CacheFault {
    #[error("Corrupt cache entry: {0}")]
    Corrupt(#[from] DecodeError),

    #[error("Tier error: {0}")]
    Tier(#[from] blobgate_storage::StorageError),
}
