//! Cached object envelope
//!
//! An [`Envelope`] is what both cache tiers store: the object body together
//! with the metadata needed to answer a request without going back to the
//! origin. It is written as CBOR, which keeps field names and types in the
//! payload so entries written by an older layout fail to decode instead of
//! being misread.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::io::Cursor;

use crate::error::DecodeError;
use crate::key::CacheKey;

/// Object body plus metadata, as stored in a cache tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    key: Bytes,
    content_type: String,
    etag: String,
    body: Bytes,
}

impl Envelope {
    /// Build an envelope from a fetched object; a missing etag is stored empty
    pub fn new(
        key: &CacheKey,
        content_type: impl Into<String>,
        etag: Option<String>,
        body: Bytes,
    ) -> Self {
        Self {
            key: Bytes::copy_from_slice(key.as_bytes()),
            content_type: content_type.into(),
            etag: etag.unwrap_or_default(),
            body,
        }
    }

    /// Key the envelope was stored under
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Entity tag, `None` when the origin did not provide one
    pub fn etag(&self) -> Option<&str> {
        if self.etag.is_empty() {
            None
        } else {
            Some(&self.etag)
        }
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Serialize for storage in a tier
    pub fn encode(&self) -> Bytes {
        let mut buf = Vec::with_capacity(self.body.len() + self.content_type.len() + 128);
        ciborium::into_writer(self, &mut buf)
            .expect("envelope fields are always representable in CBOR");
        Bytes::from(buf)
    }

    /// Deserialize a tier payload, rejecting anything that is not exactly one envelope
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let mut cursor = Cursor::new(data);
        let envelope: Envelope = ciborium::from_reader(&mut cursor)
            .map_err(|e| DecodeError::Malformed(e.to_string()))?;

        let consumed = cursor.position() as usize;
        if consumed != data.len() {
            return Err(DecodeError::TrailingBytes(data.len() - consumed));
        }

        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Envelope {
        Envelope::new(
            &CacheKey::derive("/images/cat.png"),
            "image/png",
            Some("\"abc123\"".to_string()),
            Bytes::from_static(&[0xFF, 0xD8, 0xFF, 0xE0]),
        )
    }

    #[test]
    fn test_round_trip() {
        let envelope = sample();
        let decoded = Envelope::decode(&envelope.encode()).unwrap();

        assert_eq!(decoded, envelope);
        assert_eq!(decoded.content_type(), "image/png");
        assert_eq!(decoded.etag(), Some("\"abc123\""));
        assert_eq!(decoded.body().as_ref(), &[0xFF, 0xD8, 0xFF, 0xE0]);
        assert_eq!(decoded.key(), CacheKey::derive("/images/cat.png").as_bytes());
    }

    #[test]
    fn test_missing_etag_round_trips_as_absent() {
        let envelope = Envelope::new(
            &CacheKey::derive("/a.txt"),
            "text/plain",
            None,
            Bytes::new(),
        );
        let decoded = Envelope::decode(&envelope.encode()).unwrap();

        assert_eq!(decoded.etag(), None);
        assert!(decoded.body().is_empty());
    }

    #[test]
    fn test_body_is_stored_as_a_byte_string() {
        let envelope = Envelope::new(
            &CacheKey::derive("/big"),
            "application/octet-stream",
            None,
            Bytes::from(vec![7u8; 4096]),
        );
        // A byte string costs one byte per byte, an integer array would not
        assert!(envelope.encode().len() < 4096 + 256);
    }

    #[test]
    fn test_empty_input_fails() {
        assert!(matches!(
            Envelope::decode(&[]),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn test_garbage_fails() {
        assert!(Envelope::decode(b"definitely not an envelope").is_err());
    }

    #[test]
    fn test_truncated_input_fails() {
        let encoded = sample().encode();
        assert!(Envelope::decode(&encoded[..encoded.len() - 2]).is_err());
    }

    #[test]
    fn test_trailing_bytes_fail() {
        let mut encoded = sample().encode().to_vec();
        encoded.extend_from_slice(&[0x00, 0x01]);
        assert!(matches!(
            Envelope::decode(&encoded),
            Err(DecodeError::TrailingBytes(2))
        ));
    }

    #[test]
    fn test_foreign_cbor_document_fails() {
        #[derive(Serialize)]
        struct Other {
            name: String,
            size: u64,
        }

        let mut buf = Vec::new();
        ciborium::into_writer(
            &Other {
                name: "cat.png".to_string(),
                size: 3,
            },
            &mut buf,
        )
        .unwrap();

        assert!(matches!(
            Envelope::decode(&buf),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn test_mistyped_field_fails() {
        #[derive(Serialize)]
        struct Mistyped {
            key: Bytes,
            content_type: u32,
            etag: String,
            body: Bytes,
        }

        let mut buf = Vec::new();
        ciborium::into_writer(
            &Mistyped {
                key: Bytes::new(),
                content_type: 7,
                etag: String::new(),
                body: Bytes::new(),
            },
            &mut buf,
        )
        .unwrap();

        assert!(Envelope::decode(&buf).is_err());
    }
}
