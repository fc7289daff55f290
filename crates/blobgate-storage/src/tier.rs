//! Cache tier capability traits

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use std::time::Duration;

use crate::error::StorageError;

/// Type alias for a boxed stream of bytes
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// Fast in-process tier keyed by raw key bytes.
///
/// Implementations are shared across requests and must be safe to call
/// concurrently. A `set` that exceeds the tier's bounds returns
/// [`StorageError::Rejected`].
#[async_trait]
pub trait MemoryTier: Send + Sync {
    /// Look up an entry, `Ok(None)` when the key is not present
    async fn get(&self, key: &[u8]) -> Result<Option<Bytes>, StorageError>;

    /// Store an entry; `ttl` of `None` means the entry never expires
    async fn set(&self, key: &[u8], value: Bytes, ttl: Option<Duration>)
    -> Result<(), StorageError>;
}

/// Larger persistent tier keyed by string keys.
///
/// Implementations are shared across requests and must be safe to call
/// concurrently. A `put` that exceeds the tier's bounds returns
/// [`StorageError::Rejected`].
#[async_trait]
pub trait DiskTier: Send + Sync {
    /// Open an entry for reading, `Ok(None)` when the key is not present
    async fn get(&self, key: &str) -> Result<Option<ByteStream>, StorageError>;

    /// Store an entry
    async fn put(&self, key: &str, value: Bytes) -> Result<(), StorageError>;
}
