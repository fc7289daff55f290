//! Cache key derivation

use sha2::{Digest, Sha256};
use std::fmt;

/// Digest identifying the cached object for one request URI.
///
/// The raw bytes key the memory tier; the lowercase hex form keys the disk
/// tier and shows up in logs.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey([u8; 32]);

impl CacheKey {
    /// Derive the key for a request URI (path plus query, exactly as received)
    pub fn derive(request_uri: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(request_uri.as_bytes());
        Self(hasher.finalize().into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CacheKey({})", self.to_hex())
    }
}
