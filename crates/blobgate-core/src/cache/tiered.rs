//! Two-tier cache lookup and population

use blobgate_storage::{DiskTier, MemoryTier};
use bytes::Bytes;
use futures::TryStreamExt;
use std::sync::Arc;
use tracing::{debug, warn};

use super::outcome::{PopulateOutcome, Tier, TierLookup};
use crate::envelope::Envelope;
use crate::error::CacheFault;
use crate::key::CacheKey;

/// Memory tier in front of a disk tier.
///
/// Lookups try memory first and fall through to disk; writes go to memory
/// and fall back to disk when memory refuses them. Every tier failure is
/// absorbed here and never reaches the caller.
pub struct TieredCache {
    memory: Arc<dyn MemoryTier>,
    disk: Arc<dyn DiskTier>,
}

impl TieredCache {
    /// Create a tiered cache over two tier handles
    pub fn new(memory: Arc<dyn MemoryTier>, disk: Arc<dyn DiskTier>) -> Self {
        Self { memory, disk }
    }

    /// Find a cached envelope, `None` when neither tier has a usable copy
    pub async fn lookup(&self, key: &CacheKey) -> Option<Envelope> {
        for tier in [Tier::Memory, Tier::Disk] {
            let probe = self.probe(tier, key).await;
            record_lookup(tier, key, &probe);

            if let Some(envelope) = probe.into_envelope() {
                return Some(envelope);
            }
        }

        debug!("Cache miss for {}", key);
        None
    }

    /// Probe a single tier
    pub async fn probe(&self, tier: Tier, key: &CacheKey) -> TierLookup {
        let fetched = match tier {
            Tier::Memory => self.memory.get(key.as_bytes()).await,
            Tier::Disk => self.read_disk(&key.to_hex()).await,
        };

        match fetched {
            Ok(Some(data)) => match Envelope::decode(&data) {
                Ok(envelope) => TierLookup::Hit(envelope),
                Err(e) => TierLookup::Failed(CacheFault::Corrupt(e)),
            },
            Ok(None) => TierLookup::Miss,
            Err(e) => TierLookup::Failed(CacheFault::Tier(e)),
        }
    }

    async fn read_disk(
        &self,
        key: &str,
    ) -> Result<Option<Bytes>, blobgate_storage::StorageError> {
        let Some(stream) = self.disk.get(key).await? else {
            return Ok(None);
        };

        let chunks: Vec<Bytes> = stream.try_collect().await?;
        Ok(Some(Bytes::from(chunks.concat())))
    }

    /// Store an envelope, memory first with disk as the fallback.
    ///
    /// Never fails; the returned outcome says where the envelope landed.
    pub async fn populate(&self, key: &CacheKey, envelope: &Envelope) -> PopulateOutcome {
        let encoded = envelope.encode();
        debug!("Encoded envelope for {} ({} bytes)", key, encoded.len());

        match self.memory.set(key.as_bytes(), encoded.clone(), None).await {
            Ok(()) => {
                record_write(Tier::Memory, "stored");
                return PopulateOutcome::Memory;
            }
            Err(e) => {
                record_write(Tier::Memory, if e.is_rejected() { "rejected" } else { "error" });
                debug!("Will not cache {} in memory: {}", key, e);
            }
        }

        let hex_key = key.to_hex();
        debug!("Will attempt to cache on disk, cache key {}", hex_key);

        match self.disk.put(&hex_key, encoded).await {
            Ok(()) => {
                record_write(Tier::Disk, "stored");
                PopulateOutcome::Disk
            }
            Err(e) => {
                record_write(Tier::Disk, if e.is_rejected() { "rejected" } else { "error" });
                debug!("Will not cache {} on disk: {}", hex_key, e);
                PopulateOutcome::Dropped
            }
        }
    }
}

fn record_lookup(tier: Tier, key: &CacheKey, probe: &TierLookup) {
    metrics::counter!(
        "blobgate_cache_lookups_total",
        "tier" => tier.as_str(),
        "outcome" => probe.label()
    )
    .increment(1);

    match probe {
        TierLookup::Hit(envelope) => debug!(
            "{} cache hit for {} ({} byte body)",
            tier.as_str(),
            key,
            envelope.body().len()
        ),
        TierLookup::Miss => debug!("Key {} not found in {} cache", key, tier.as_str()),
        TierLookup::Failed(CacheFault::Corrupt(e)) => {
            warn!("Ignoring corrupt {} cache entry {}: {}", tier.as_str(), key, e)
        }
        TierLookup::Failed(CacheFault::Tier(e)) => {
            warn!("{} cache error for {}: {}", tier.as_str(), key, e)
        }
    }
}

fn record_write(tier: Tier, outcome: &'static str) {
    metrics::counter!(
        "blobgate_cache_writes_total",
        "tier" => tier.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}
