//! Configuration loading and management
//!
//! Values are layered: command line flags and environment variables win over
//! the TOML file, which wins over the built-in defaults.

use anyhow::{Context, Result, bail};
use clap::builder::BoolishValueParser;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::size::parse_size;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub origin: OriginConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Route answered by the health check instead of the object handler
    #[serde(default = "default_health_route")]
    pub health_route: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            health_route: default_health_route(),
        }
    }
}

/// Origin bucket configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OriginConfig {
    #[serde(default)]
    pub bucket: String,
    #[serde(default = "default_region")]
    pub region: String,
    /// S3 endpoint URL (for MinIO or other S3-compatible services)
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Prefix prepended to every object key
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub allow_http: bool,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: default_region(),
            endpoint: None,
            prefix: None,
            allow_http: false,
        }
    }
}

/// Cache configuration
///
/// Sizes are human readable strings, see [`parse_size`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_memory_size")]
    pub memory_size: String,
    #[serde(default = "default_disk_item_size")]
    pub disk_item_size: String,
    #[serde(default = "default_disk_item_count")]
    pub disk_item_count: u64,
    #[serde(default = "default_disk_path")]
    pub disk_path: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            memory_size: default_memory_size(),
            disk_item_size: default_disk_item_size(),
            disk_item_count: default_disk_item_count(),
            disk_path: default_disk_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Forces the `debug` level unless `RUST_LOG` is set
    #[serde(default)]
    pub debug: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            debug: false,
        }
    }
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
        }
    }
}

/// Byte limits resolved from the cache size strings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheLimits {
    pub memory_bytes: u64,
    pub disk_item_bytes: u64,
    pub disk_items: u64,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    80
}

fn default_health_route() -> String {
    "/health".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_memory_size() -> String {
    "300 MB".to_string()
}

fn default_disk_item_size() -> String {
    "50 MB".to_string()
}

fn default_disk_item_count() -> u64 {
    20
}

fn default_disk_path() -> PathBuf {
    PathBuf::from("/tmp")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

/// Settings that can be given on the command line or through the environment
#[derive(clap::Args, Debug, Clone, Default)]
pub struct Overrides {
    /// Debug mode
    #[arg(
        long,
        env = "DEBUG",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub debug: Option<bool>,

    /// HTTP route of the health check, including the leading slash
    #[arg(long, env = "HEARTBEAT_ROUTE")]
    pub heartbeat_route: Option<String>,

    /// S3 bucket name
    #[arg(long, env = "S3_BUCKET")]
    pub s3_bucket: Option<String>,

    /// S3 region
    #[arg(long, env = "S3_REGION")]
    pub s3_region: Option<String>,

    /// S3 endpoint URL, for S3-compatible services
    #[arg(long, env = "S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// Memory cache size in human format, ex "300 MB"
    #[arg(long, env = "RAM_CACHE_SIZE")]
    pub ram_cache_size: Option<String>,

    /// Largest object kept in the disk cache, ex "50 MB"
    #[arg(long, env = "DISK_CACHE_OBJECT_SIZE")]
    pub disk_cache_item_size: Option<String>,

    /// Maximum number of objects kept in the disk cache
    #[arg(long, env = "DISK_CACHE_OBJECT_NUMBER")]
    pub disk_cache_item_number: Option<u64>,

    /// Disk cache folder
    #[arg(long, env = "DISK_CACHE_PATH")]
    pub disk_cache_path: Option<PathBuf>,

    /// Bind address
    #[arg(long, env = "BLOBGATE_BIND")]
    pub bind: Option<String>,

    /// Port
    #[arg(short, long, env = "BLOBGATE_PORT")]
    pub port: Option<u16>,
}

/// Where a loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// The file did not exist
    Defaults(PathBuf),
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "Loaded configuration from {:?}", path),
            ConfigSource::Defaults(path) => {
                write!(f, "Config file not found at {:?}, using defaults", path)
            }
        }
    }
}

impl Config {
    /// Load configuration from a file, using defaults when it does not exist.
    ///
    /// Runs before logging is set up, so the caller reports the source.
    pub fn load(path: impl AsRef<Path>) -> Result<(Self, ConfigSource)> {
        let config_path = path.as_ref();

        if !config_path.exists() {
            return Ok((
                Self::default(),
                ConfigSource::Defaults(config_path.to_path_buf()),
            ));
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;

        Ok((config, ConfigSource::File(config_path.to_path_buf())))
    }

    /// Apply command line and environment overrides
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(debug) = overrides.debug {
            self.logging.debug = debug;
        }
        if let Some(route) = overrides.heartbeat_route {
            self.server.health_route = route;
        }
        if let Some(bucket) = overrides.s3_bucket {
            self.origin.bucket = bucket;
        }
        if let Some(region) = overrides.s3_region {
            self.origin.region = region;
        }
        if let Some(endpoint) = overrides.s3_endpoint {
            self.origin.endpoint = Some(endpoint);
        }
        if let Some(size) = overrides.ram_cache_size {
            self.cache.memory_size = size;
        }
        if let Some(size) = overrides.disk_cache_item_size {
            self.cache.disk_item_size = size;
        }
        if let Some(count) = overrides.disk_cache_item_number {
            self.cache.disk_item_count = count;
        }
        if let Some(path) = overrides.disk_cache_path {
            self.cache.disk_path = path;
        }
        if let Some(bind) = overrides.bind {
            self.server.bind_address = bind;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
    }

    /// Check the settings that would otherwise fail at the first request
    pub fn validate(&mut self) -> Result<CacheLimits> {
        if self.origin.bucket.trim().is_empty() {
            bail!("An origin bucket is required (--s3-bucket or S3_BUCKET)");
        }

        self.server.health_route = normalize_route(&self.server.health_route);
        if self.metrics.enabled && self.server.health_route == blobgate_api::METRICS_ROUTE {
            bail!(
                "Health route {} collides with the metrics endpoint",
                self.server.health_route
            );
        }

        self.cache_limits()
    }

    /// Resolve the cache size strings to byte counts
    pub fn cache_limits(&self) -> Result<CacheLimits> {
        let memory_bytes = parse_size(&self.cache.memory_size)
            .with_context(|| "Invalid memory cache size")?;
        let disk_item_bytes = parse_size(&self.cache.disk_item_size)
            .with_context(|| "Invalid disk cache item size")?;

        Ok(CacheLimits {
            memory_bytes,
            disk_item_bytes,
            disk_items: self.cache.disk_item_count,
        })
    }
}

fn normalize_route(route: &str) -> String {
    let route = route.trim();
    if route.starts_with('/') {
        route.to_string()
    } else {
        format!("/{}", route)
    }
}
