//! Blobgate Cache Tiers
//!
//! This crate provides the two cache tiers used by Blobgate: a byte-weighted
//! in-memory tier and a bounded on-disk tier. Each tier owns its own
//! admission and eviction policy and is exposed to the rest of the
//! workspace through the capability traits in [`tier`].

pub mod disk;
pub mod error;
pub mod memory;
pub mod tier;

pub use disk::{DiskCache, DiskCacheConfig};
pub use error::StorageError;
pub use memory::MemoryCache;
pub use tier::{ByteStream, DiskTier, MemoryTier};
