//! In-memory stand-ins for the tiers and the origin

use async_trait::async_trait;
use blobgate_proxy::{OriginFetcher, OriginObject, ProxyError};
use blobgate_storage::{ByteStream, DiskTier, MemoryTier, StorageError};
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

fn broken() -> StorageError {
    StorageError::Io(std::io::Error::other("tier unavailable"))
}

#[derive(Default)]
pub struct FakeMemory {
    pub entries: Mutex<HashMap<Vec<u8>, Bytes>>,
    pub gets: Mutex<Vec<Vec<u8>>>,
    pub sets: Mutex<Vec<(Vec<u8>, Bytes, Option<Duration>)>>,
    pub reject_writes: bool,
    pub fail_reads: bool,
}

impl FakeMemory {
    pub fn rejecting() -> Self {
        Self {
            reject_writes: true,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_reads: true,
            reject_writes: true,
            ..Default::default()
        }
    }

    pub fn insert(&self, key: &[u8], value: Bytes) {
        self.entries.lock().insert(key.to_vec(), value);
    }

    pub fn get_count(&self) -> usize {
        self.gets.lock().len()
    }
}

#[async_trait]
impl MemoryTier for FakeMemory {
    async fn get(&self, key: &[u8]) -> Result<Option<Bytes>, StorageError> {
        self.gets.lock().push(key.to_vec());
        if self.fail_reads {
            return Err(broken());
        }
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn set(
        &self,
        key: &[u8],
        value: Bytes,
        ttl: Option<Duration>,
    ) -> Result<(), StorageError> {
        self.sets.lock().push((key.to_vec(), value.clone(), ttl));
        if self.reject_writes {
            return Err(StorageError::Rejected("too large".to_string()));
        }
        self.entries.lock().insert(key.to_vec(), value);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeDisk {
    pub entries: Mutex<HashMap<String, Bytes>>,
    pub gets: Mutex<Vec<String>>,
    pub puts: Mutex<Vec<(String, Bytes)>>,
    pub reject_writes: bool,
    pub fail_reads: bool,
}

impl FakeDisk {
    pub fn rejecting() -> Self {
        Self {
            reject_writes: true,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_reads: true,
            ..Default::default()
        }
    }

    pub fn insert(&self, key: &str, value: Bytes) {
        self.entries.lock().insert(key.to_string(), value);
    }

    pub fn get_count(&self) -> usize {
        self.gets.lock().len()
    }
}

#[async_trait]
impl DiskTier for FakeDisk {
    async fn get(&self, key: &str) -> Result<Option<ByteStream>, StorageError> {
        self.gets.lock().push(key.to_string());
        if self.fail_reads {
            return Err(broken());
        }
        let Some(value) = self.entries.lock().get(key).cloned() else {
            return Ok(None);
        };

        // Hand the payload back in two chunks like a file reader would
        let split = value.len() / 2;
        let chunks: Vec<Result<Bytes, StorageError>> =
            vec![Ok(value.slice(..split)), Ok(value.slice(split..))];
        let stream: ByteStream = Box::pin(futures::stream::iter(chunks));
        Ok(Some(stream))
    }

    async fn put(&self, key: &str, value: Bytes) -> Result<(), StorageError> {
        self.puts.lock().push((key.to_string(), value.clone()));
        if self.reject_writes {
            return Err(StorageError::Rejected("too many items".to_string()));
        }
        self.entries.lock().insert(key.to_string(), value);
        Ok(())
    }
}

pub enum FakeResponse {
    Object(OriginObject),
    NotFound,
    Failure(String),
}

#[derive(Default)]
pub struct FakeOrigin {
    pub responses: Mutex<HashMap<String, FakeResponse>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeOrigin {
    pub fn with(path: &str, response: FakeResponse) -> Self {
        let origin = Self::default();
        origin.responses.lock().insert(path.to_string(), response);
        origin
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl OriginFetcher for FakeOrigin {
    async fn fetch(&self, object_path: &str) -> Result<OriginObject, ProxyError> {
        self.calls.lock().push(object_path.to_string());
        match self.responses.lock().get(object_path) {
            Some(FakeResponse::Object(object)) => Ok(object.clone()),
            Some(FakeResponse::Failure(message)) => {
                Err(ProxyError::InvalidResponse(message.clone()))
            }
            Some(FakeResponse::NotFound) | None => {
                Err(ProxyError::NotFound(object_path.to_string()))
            }
        }
    }
}
