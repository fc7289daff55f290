//! Tiered cache module

mod outcome;
mod tiered;

pub use outcome::{PopulateOutcome, Tier, TierLookup};
pub use tiered::TieredCache;
