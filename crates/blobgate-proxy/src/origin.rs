//! Origin fetcher capability

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::ProxyError;

/// An object as returned by the origin store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginObject {
    /// Content type reported by the origin, if any
    pub content_type: Option<String>,
    /// Entity tag reported by the origin, if any
    pub etag: Option<String>,
    /// Full object body
    pub body: Bytes,
}

/// Source of truth queried on a full cache miss.
///
/// One call is one attempt; implementations report a missing object as
/// [`ProxyError::NotFound`] and everything else as another variant.
#[async_trait]
pub trait OriginFetcher: Send + Sync {
    /// Fetch the object at `object_path` (the percent-encoded request path)
    async fn fetch(&self, object_path: &str) -> Result<OriginObject, ProxyError>;
}
