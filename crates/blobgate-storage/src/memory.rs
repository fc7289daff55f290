//! In-memory cache tier
//!
//! A byte-weighted [`moka`] cache. The total weight of all entries is bounded
//! by the configured capacity, and any single entry larger than the per-entry
//! ceiling is refused outright instead of pushing everything else out.

use async_trait::async_trait;
use bytes::Bytes;
use moka::Expiry;
use moka::future::Cache;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::error::StorageError;
use crate::tier::MemoryTier;

/// Fraction of the total capacity a single entry may occupy
const MAX_ENTRY_DIVISOR: u64 = 1024;

#[derive(Clone)]
struct MemoryEntry {
    value: Bytes,
    ttl: Option<Duration>,
}

/// Per-entry expiration driven by the ttl passed to `set`
struct EntryExpiry;

impl Expiry<Vec<u8>, MemoryEntry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &Vec<u8>,
        value: &MemoryEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &Vec<u8>,
        value: &MemoryEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl
    }
}

/// In-memory tier backed by moka
pub struct MemoryCache {
    cache: Cache<Vec<u8>, MemoryEntry>,
    capacity: u64,
    max_entry_size: u64,
}

impl MemoryCache {
    /// Create a memory tier holding at most `capacity` bytes.
    ///
    /// Entries larger than 1/1024 of the capacity are rejected.
    pub fn new(capacity: u64) -> Self {
        Self::with_max_entry_size(capacity, capacity / MAX_ENTRY_DIVISOR)
    }

    /// Create a memory tier with an explicit per-entry ceiling
    pub fn with_max_entry_size(capacity: u64, max_entry_size: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity)
            .weigher(|key: &Vec<u8>, entry: &MemoryEntry| -> u32 {
                u32::try_from(entry_weight(key.len(), entry.value.len())).unwrap_or(u32::MAX)
            })
            .expire_after(EntryExpiry)
            .build();

        info!(
            "Initialized memory cache (capacity: {} bytes, max entry: {} bytes)",
            capacity, max_entry_size
        );

        Self {
            cache,
            capacity,
            max_entry_size,
        }
    }

    /// Total capacity in bytes
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Largest entry, key included, the tier will accept
    pub fn max_entry_size(&self) -> u64 {
        self.max_entry_size
    }

    /// Approximate number of bytes held
    pub fn weighted_size(&self) -> u64 {
        self.cache.weighted_size()
    }

    /// Apply pending evictions and expirations
    pub async fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks().await;
    }
}

fn entry_weight(key_len: usize, value_len: usize) -> u64 {
    (key_len as u64).saturating_add(value_len as u64)
}

#[async_trait]
impl MemoryTier for MemoryCache {
    async fn get(&self, key: &[u8]) -> Result<Option<Bytes>, StorageError> {
        Ok(self.cache.get(key).await.map(|entry| entry.value))
    }

    async fn set(
        &self,
        key: &[u8],
        value: Bytes,
        ttl: Option<Duration>,
    ) -> Result<(), StorageError> {
        let weight = entry_weight(key.len(), value.len());
        if weight > self.max_entry_size {
            debug!(
                "Rejecting {} byte entry, memory ceiling is {} bytes",
                weight, self.max_entry_size
            );
            return Err(StorageError::Rejected(format!(
                "entry of {} bytes exceeds the {} byte memory ceiling",
                weight, self.max_entry_size
            )));
        }

        self.cache
            .insert(key.to_vec(), MemoryEntry { value, ttl })
            .await;
        Ok(())
    }
}
