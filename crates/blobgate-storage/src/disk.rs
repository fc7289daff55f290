//! Local disk cache tier
//!
//! Stores one file per entry under `<base_path>/objects/<key>`. The tier is
//! bounded by a per-item size ceiling and an item count; once the count is
//! exceeded the least recently used entries are removed. The recency index
//! is rebuilt from file modification times on startup, so a restarted
//! process keeps what the previous one cached.

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;
use tokio::fs::{self, File};
use tokio::io::BufReader;
use tracing::{debug, info, warn};

use crate::error::StorageError;
use crate::tier::{ByteStream, DiskTier};

const MAX_KEY_LEN: usize = 255;

/// Disk cache configuration
#[derive(Debug, Clone)]
pub struct DiskCacheConfig {
    /// Folder holding the cache files
    pub path: PathBuf,
    /// Largest entry the tier accepts, in bytes
    pub max_item_size: u64,
    /// Maximum number of entries kept on disk
    pub max_items: u64,
}

/// Least-recently-used ordering of the keys on disk
#[derive(Default)]
struct RecencyIndex {
    ticks: HashMap<String, u64>,
    order: BTreeMap<u64, String>,
    clock: u64,
}

impl RecencyIndex {
    fn len(&self) -> usize {
        self.ticks.len()
    }

    /// Mark a key as most recently used, inserting it if unknown
    fn touch(&mut self, key: &str) {
        self.clock += 1;
        if let Some(old) = self.ticks.insert(key.to_string(), self.clock) {
            self.order.remove(&old);
        }
        self.order.insert(self.clock, key.to_string());
    }

    /// Mark a key as used only if it is already tracked
    fn refresh(&mut self, key: &str) {
        if self.ticks.contains_key(key) {
            self.touch(key);
        }
    }

    fn remove(&mut self, key: &str) {
        if let Some(tick) = self.ticks.remove(key) {
            self.order.remove(&tick);
        }
    }

    /// Drop least recently used keys until at most `max` remain
    fn evict_to(&mut self, max: usize) -> Vec<String> {
        let mut evicted = Vec::new();
        while self.ticks.len() > max {
            let Some((_, key)) = self.order.pop_first() else {
                break;
            };
            self.ticks.remove(&key);
            evicted.push(key);
        }
        evicted
    }
}

/// Bounded local disk tier
pub struct DiskCache {
    objects_path: PathBuf,
    config: DiskCacheConfig,
    index: Mutex<RecencyIndex>,
    temp_counter: AtomicU64,
}

impl DiskCache {
    /// Open (or create) a disk tier, indexing any entries already present
    pub async fn new(config: DiskCacheConfig) -> Result<Self, StorageError> {
        if config.max_item_size == 0 {
            return Err(StorageError::Configuration(
                "disk cache item size must be greater than zero".to_string(),
            ));
        }

        let objects_path = config.path.join("objects");
        fs::create_dir_all(&objects_path).await?;

        let mut found = scan_entries(&objects_path).await?;
        found.sort();

        let mut index = RecencyIndex::default();
        for (_, key) in &found {
            index.touch(key);
        }
        let evicted = index.evict_to(config.max_items as usize);

        info!(
            "Initialized disk cache at {:?} ({} entries, max {} items of {} bytes)",
            objects_path,
            index.len(),
            config.max_items,
            config.max_item_size
        );

        let cache = Self {
            objects_path,
            config,
            index: Mutex::new(index),
            temp_counter: AtomicU64::new(0),
        };
        cache.remove_files(evicted).await;

        Ok(cache)
    }

    /// Number of entries currently tracked
    pub fn item_count(&self) -> usize {
        self.index.lock().len()
    }

    /// Get the file path for a key
    fn entry_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.objects_path.join(key))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        let n = self.temp_counter.fetch_add(1, Ordering::Relaxed);
        self.objects_path.join(format!("{}.{}.tmp", key, n))
    }

    async fn remove_files(&self, keys: Vec<String>) {
        for key in keys {
            debug!("Evicting disk cache entry: {}", key);
            match fs::remove_file(self.objects_path.join(&key)).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove evicted entry {}: {}", key, e),
            }
        }
    }
}

/// Keys become file names, so only a conservative character set is allowed
fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() || key.len() > MAX_KEY_LEN {
        return Err(StorageError::InvalidKey(format!(
            "key length must be between 1 and {}",
            MAX_KEY_LEN
        )));
    }
    if !key
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Collect `(modified, key)` for every entry file, removing leftover temp files
async fn scan_entries(dir: &Path) -> Result<Vec<(SystemTime, String)>, StorageError> {
    let mut entries = Vec::new();
    let mut read_dir = fs::read_dir(dir).await?;

    while let Some(entry) = read_dir.next_entry().await? {
        let name = entry.file_name().to_string_lossy().to_string();

        if name.ends_with(".tmp") {
            debug!("Removing stale temp file {:?}", entry.path());
            if let Err(e) = fs::remove_file(entry.path()).await {
                warn!("Failed to remove stale temp file {:?}: {}", entry.path(), e);
            }
            continue;
        }

        if validate_key(&name).is_err() {
            continue;
        }

        let metadata = entry.metadata().await?;
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        entries.push((modified, name));
    }

    Ok(entries)
}

#[async_trait]
impl DiskTier for DiskCache {
    async fn get(&self, key: &str) -> Result<Option<ByteStream>, StorageError> {
        let path = self.entry_path(key)?;
        debug!("Reading disk cache entry from {:?}", path);

        let file = match File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.index.lock().remove(key);
                return Ok(None);
            }
            Err(e) => return Err(StorageError::Io(e)),
        };

        self.index.lock().refresh(key);

        let reader = BufReader::new(file);
        let stream = tokio_util::io::ReaderStream::new(reader);

        let stream: ByteStream = Box::pin(stream.map(|result| result.map_err(StorageError::Io)));
        Ok(Some(stream))
    }

    async fn put(&self, key: &str, value: Bytes) -> Result<(), StorageError> {
        let path = self.entry_path(key)?;

        let size = value.len() as u64;
        if size > self.config.max_item_size {
            return Err(StorageError::Rejected(format!(
                "entry of {} bytes exceeds the {} byte disk item ceiling",
                size, self.config.max_item_size
            )));
        }
        if self.config.max_items == 0 {
            return Err(StorageError::Rejected(
                "disk cache holds no items".to_string(),
            ));
        }

        debug!("Writing disk cache entry to {:?}", path);

        // Write atomically using a temp file
        let temp_path = self.temp_path(key);
        if let Err(e) = fs::write(&temp_path, &value).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(StorageError::Io(e));
        }
        if let Err(e) = fs::rename(&temp_path, &path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(StorageError::Io(e));
        }

        let evicted = {
            let mut index = self.index.lock();
            index.touch(key);
            index.evict_to(self.config.max_items as usize)
        };
        self.remove_files(evicted).await;

        Ok(())
    }
}
