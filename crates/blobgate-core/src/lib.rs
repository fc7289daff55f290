//! Blobgate Core Business Logic
//!
//! This crate provides the core functionality for Blobgate: cache key
//! derivation, the envelope stored in each cache tier, the tiered
//! lookup/populate pipeline and the per-request gateway flow.

pub mod cache;
pub mod envelope;
pub mod error;
pub mod gateway;
pub mod key;

#[cfg(test)]
mod testing;

pub use cache::{PopulateOutcome, Tier, TierLookup, TieredCache};
pub use envelope::Envelope;
pub use error::{CacheFault, CoreError, DecodeError};
pub use gateway::{DIRECTORY_CONTENT_TYPE, Gateway};
pub use key::CacheKey;
