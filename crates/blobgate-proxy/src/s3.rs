//! S3 origin client
//!
//! Uses the `object_store` crate to read objects from an S3 bucket (or any
//! S3-compatible service such as MinIO). Credentials are picked up from the
//! standard AWS environment variables.

use async_trait::async_trait;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::{Attribute, ObjectStore};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::ProxyError;
use crate::origin::{OriginFetcher, OriginObject};

/// S3 origin configuration
#[derive(Debug, Clone)]
pub struct S3OriginConfig {
    /// S3 bucket name
    pub bucket: String,
    /// S3 region (e.g., "us-east-1")
    pub region: String,
    /// S3 endpoint URL (for MinIO or other S3-compatible services)
    pub endpoint: Option<String>,
    /// Prefix prepended to every object key (optional)
    pub prefix: Option<String>,
    /// Allow HTTP (not HTTPS) connections
    pub allow_http: bool,
}

impl Default for S3OriginConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: "us-east-1".to_string(),
            endpoint: None,
            prefix: None,
            allow_http: false,
        }
    }
}

/// Read-only S3 origin
pub struct S3Origin {
    store: Arc<dyn ObjectStore>,
    prefix: String,
}

impl S3Origin {
    /// Create a new S3 origin client
    pub fn new(config: S3OriginConfig) -> Result<Self, ProxyError> {
        if config.bucket.is_empty() {
            return Err(ProxyError::Configuration(
                "an origin bucket is required".to_string(),
            ));
        }

        let mut builder = AmazonS3Builder::from_env()
            .with_bucket_name(&config.bucket)
            .with_region(&config.region);

        // Set endpoint for MinIO or other S3-compatible services
        if let Some(endpoint) = &config.endpoint {
            builder = builder.with_endpoint(endpoint);
        }

        if config.allow_http {
            builder = builder.with_allow_http(true);
        }

        let store = builder.build().map_err(|e| {
            ProxyError::Configuration(format!("Failed to create S3 client: {}", e))
        })?;

        let prefix = config
            .prefix
            .unwrap_or_default()
            .trim_matches('/')
            .to_string();

        info!(
            "Initialized S3 origin: bucket={}, region={}, endpoint={:?}, prefix={}",
            config.bucket, config.region, config.endpoint, prefix
        );

        Ok(Self::from_store(Arc::new(store), prefix))
    }

    /// Wrap an already built object store
    pub fn from_store(store: Arc<dyn ObjectStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    /// Map a percent-encoded request path onto an object key.
    ///
    /// Object keys cannot end in a delimiter, so a path with a trailing `/`
    /// never names an object.
    fn object_key(&self, object_path: &str) -> Result<ObjectPath, ProxyError> {
        let trimmed = object_path.trim_start_matches('/');
        if trimmed.is_empty() || trimmed.ends_with('/') {
            return Err(ProxyError::NotFound(object_path.to_string()));
        }

        let url_path = if self.prefix.is_empty() {
            trimmed.to_string()
        } else {
            format!("{}/{}", self.prefix, trimmed)
        };

        ObjectPath::from_url_path(&url_path)
            .map_err(|e| ProxyError::NotFound(format!("{}: {}", object_path, e)))
    }
}

#[async_trait]
impl OriginFetcher for S3Origin {
    async fn fetch(&self, object_path: &str) -> Result<OriginObject, ProxyError> {
        let path = self.object_key(object_path)?;
        debug!("Fetching object from S3: {:?}", path);

        let result = self.store.get(&path).await.map_err(|e| match e {
            object_store::Error::NotFound { .. } => ProxyError::NotFound(path.to_string()),
            _ => ProxyError::Store(e),
        })?;

        let content_type = result
            .attributes
            .get(&Attribute::ContentType)
            .map(|value| value.as_ref().to_string());
        let etag = result.meta.e_tag.clone();

        let body = result
            .bytes()
            .await
            .map_err(|e| ProxyError::InvalidResponse(format!("Failed to read body: {}", e)))?;

        debug!(
            "Fetched {} ({} bytes, content type {:?})",
            path,
            body.len(),
            content_type
        );

        Ok(OriginObject {
            content_type,
            etag,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use object_store::memory::InMemory;
    use object_store::{Attributes, PutOptions, PutPayload};

    fn origin(prefix: &str) -> (Arc<InMemory>, S3Origin) {
        let store = Arc::new(InMemory::new());
        let origin = S3Origin::from_store(store.clone(), prefix);
        (store, origin)
    }

    #[test]
    fn test_object_key_strips_leading_slash() {
        let (_, origin) = origin("");
        assert_eq!(
            origin.object_key("/images/cat.png").unwrap().as_ref(),
            "images/cat.png"
        );
    }

    #[test]
    fn test_trailing_slash_is_not_found() {
        let (_, origin) = origin("");
        assert!(matches!(
            origin.object_key("/dir/"),
            Err(ProxyError::NotFound(_))
        ));
        assert!(matches!(
            origin.object_key("/a.txt/"),
            Err(ProxyError::NotFound(_))
        ));
    }

    #[test]
    fn test_object_key_decodes_percent_encoding() {
        let (_, origin) = origin("");
        assert_eq!(
            origin.object_key("/my%20file.txt").unwrap().as_ref(),
            "my file.txt"
        );
    }

    #[test]
    fn test_object_key_with_prefix() {
        let (_, origin) = origin("public");
        assert_eq!(
            origin.object_key("/a/b.txt").unwrap().as_ref(),
            "public/a/b.txt"
        );
    }

    #[test]
    fn test_root_path_is_not_found() {
        let (_, origin) = origin("");
        assert!(matches!(
            origin.object_key("/"),
            Err(ProxyError::NotFound(_))
        ));
    }

    #[test]
    fn test_missing_bucket_is_rejected() {
        assert!(matches!(
            S3Origin::new(S3OriginConfig::default()),
            Err(ProxyError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_reads_body_and_metadata() {
        let (store, origin) = origin("");

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, "image/png".into());
        store
            .put_opts(
                &ObjectPath::from("images/cat.png"),
                PutPayload::from(Bytes::from_static(&[0xFF, 0xD8, 0xFF])),
                PutOptions {
                    attributes,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let object = origin.fetch("/images/cat.png").await.unwrap();
        assert_eq!(object.content_type.as_deref(), Some("image/png"));
        assert!(object.etag.is_some());
        assert_eq!(object.body, Bytes::from_static(&[0xFF, 0xD8, 0xFF]));
    }

    #[tokio::test]
    async fn test_fetch_without_content_type() {
        let (store, origin) = origin("");
        store
            .put(&ObjectPath::from("plain"), PutPayload::from_static(b"data"))
            .await
            .unwrap();

        let object = origin.fetch("/plain").await.unwrap();
        assert!(object.content_type.is_none());
    }

    #[tokio::test]
    async fn test_directory_path_does_not_serve_plain_object() {
        let (store, origin) = origin("");
        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, "text/plain".into());
        store
            .put_opts(
                &ObjectPath::from("dir"),
                PutPayload::from_static(b"file named dir"),
                PutOptions {
                    attributes,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(matches!(
            origin.fetch("/dir/").await,
            Err(ProxyError::NotFound(_))
        ));
        assert_eq!(
            origin.fetch("/dir").await.unwrap().body,
            Bytes::from_static(b"file named dir")
        );
    }

    #[tokio::test]
    async fn test_fetch_missing_object() {
        let (_, origin) = origin("");
        assert!(matches!(
            origin.fetch("/missing.txt").await,
            Err(ProxyError::NotFound(_))
        ));
    }
}
