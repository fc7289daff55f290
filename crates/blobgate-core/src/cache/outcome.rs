//! Per-tier results of the lookup and populate steps

use crate::envelope::Envelope;
use crate::error::CacheFault;

/// Which cache tier an operation touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// In-process byte-weighted tier, always probed first
    Memory,
    /// Local disk tier, probed when memory has nothing usable
    Disk,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Memory => "memory",
            Tier::Disk => "disk",
        }
    }
}

/// Result of probing a single tier
#[derive(Debug)]
pub enum TierLookup {
    /// The tier held a decodable envelope
    Hit(Envelope),
    /// The tier does not hold the key
    Miss,
    /// The tier held something unusable or could not be read
    Failed(CacheFault),
}

impl TierLookup {
    /// Collapse the probe into what the lookup acts on.
    ///
    /// A failed probe counts as a miss: a broken or unreachable tier only
    /// ever sends the request on to the next tier or the origin.
    pub fn into_envelope(self) -> Option<Envelope> {
        match self {
            TierLookup::Hit(envelope) => Some(envelope),
            TierLookup::Miss | TierLookup::Failed(_) => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TierLookup::Hit(_) => "hit",
            TierLookup::Miss => "miss",
            TierLookup::Failed(CacheFault::Corrupt(_)) => "corrupt",
            TierLookup::Failed(CacheFault::Tier(_)) => "error",
        }
    }
}

/// Where a populate call left the envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopulateOutcome {
    /// Accepted by the memory tier
    Memory,
    /// Refused by memory, accepted by disk
    Disk,
    /// Refused by both tiers; the object is not cached
    Dropped,
}
