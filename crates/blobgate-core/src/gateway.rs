//! Per-request gateway flow
//!
//! Ties key derivation, the tiered cache and the origin together: a request
//! is answered from the cache when possible, otherwise from the origin, and
//! a successful origin fetch is written back to the cache.

use blobgate_proxy::{OriginFetcher, ProxyError};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::cache::TieredCache;
use crate::envelope::Envelope;
use crate::error::CoreError;
use crate::key::CacheKey;

/// Content type S3 uses for folder placeholder objects
pub const DIRECTORY_CONTENT_TYPE: &str = "application/x-directory";

/// Read-through gateway over the tiered cache and the origin
pub struct Gateway {
    cache: Arc<TieredCache>,
    origin: Arc<dyn OriginFetcher>,
}

impl Gateway {
    /// Create a new gateway
    pub fn new(cache: Arc<TieredCache>, origin: Arc<dyn OriginFetcher>) -> Self {
        Self { cache, origin }
    }

    /// Resolve one request.
    ///
    /// `request_uri` (path and query as received) identifies the cache
    /// entry; `object_path` (the percent-encoded path) names the object at
    /// the origin. The origin is asked at most once.
    pub async fn fetch(&self, request_uri: &str, object_path: &str) -> Result<Envelope, CoreError> {
        let key = CacheKey::derive(request_uri);
        debug!("Hashed key ({}): {}", request_uri, key);

        if let Some(envelope) = self.cache.lookup(&key).await {
            return Ok(envelope);
        }

        info!("Cache miss for {}, fetching from origin", request_uri);

        let object = match self.origin.fetch(object_path).await {
            Ok(object) => {
                record_origin("ok");
                object
            }
            Err(ProxyError::NotFound(detail)) => {
                record_origin("not_found");
                debug!("Origin has no object at {}: {}", object_path, detail);
                return Err(CoreError::NotFound(object_path.to_string()));
            }
            Err(e) => {
                record_origin("error");
                error!("Origin fetch failed for {}: {}", object_path, e);
                return Err(CoreError::Proxy(e));
            }
        };

        let Some(content_type) = object.content_type else {
            debug!("Object {} has no valid content type", object_path);
            return Err(CoreError::MissingContentType(object_path.to_string()));
        };

        if is_directory(&content_type) {
            debug!("Object {} is a directory marker", object_path);
            return Err(CoreError::NotFound(object_path.to_string()));
        }

        let envelope = Envelope::new(&key, content_type, object.etag, object.body);
        let outcome = self.cache.populate(&key, &envelope).await;
        debug!("Populated {} -> {:?}", key, outcome);

        Ok(envelope)
    }
}

/// Compare the media type only, ignoring parameters such as `charset`
fn is_directory(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(str::trim)
        .is_some_and(|essence| essence.eq_ignore_ascii_case(DIRECTORY_CONTENT_TYPE))
}

fn record_origin(outcome: &'static str) {
    metrics::counter!("blobgate_origin_fetches_total", "outcome" => outcome).increment(1);
}
