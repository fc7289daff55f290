//! Blobgate - Read-only HTTP gateway for S3 buckets with memory and disk caching

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;
mod size;

use blobgate_api::{AppState, create_router};
use blobgate_core::{Gateway, TieredCache};
use blobgate_proxy::{S3Origin, S3OriginConfig};
use blobgate_storage::{DiskCache, DiskCacheConfig, MemoryCache};
use config::{Config, LoggingConfig, Overrides};
use size::format_size;

/// Blobgate - exposes the content of an S3 bucket over HTTP, read-only,
/// with a memory cache in front of a disk cache
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "BLOBGATE_CONFIG", default_value = "config/default.toml")]
    config: String,

    #[command(flatten)]
    overrides: Overrides,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (mut config, source) = Config::load(&args.config)?;
    config.apply(args.overrides);

    init_logging(&config.logging);
    info!("{}", source);

    let limits = config.validate()?;

    let metrics_handle = if config.metrics.enabled {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        Some(Arc::new(handle))
    } else {
        None
    };

    info!(
        "Starting Blobgate v{} with a {} RAM cache, {} max disk object size, {} max disk objects, disk cache path {:?}",
        env!("CARGO_PKG_VERSION"),
        format_size(limits.memory_bytes),
        format_size(limits.disk_item_bytes),
        limits.disk_items,
        config.cache.disk_path,
    );

    let memory = Arc::new(MemoryCache::new(limits.memory_bytes));
    let disk = Arc::new(
        DiskCache::new(DiskCacheConfig {
            path: config.cache.disk_path.clone(),
            max_item_size: limits.disk_item_bytes,
            max_items: limits.disk_items,
        })
        .await
        .with_context(|| format!("Failed to open disk cache at {:?}", config.cache.disk_path))?,
    );

    let origin = Arc::new(S3Origin::new(S3OriginConfig {
        bucket: config.origin.bucket.clone(),
        region: config.origin.region.clone(),
        endpoint: config.origin.endpoint.clone(),
        prefix: config.origin.prefix.clone(),
        allow_http: config.origin.allow_http,
    })?);

    let cache = Arc::new(TieredCache::new(memory, disk));
    let gateway = Arc::new(Gateway::new(cache, origin));
    let state = AppState::new(gateway);

    let app = create_router(state, &config.server.health_route, metrics_handle)
        .layer(TraceLayer::new_for_http().make_span_with(blobgate_api::trace::make_span));

    let addr: SocketAddr = format!("{}:{}", config.server.bind_address, config.server.port)
        .parse()
        .with_context(|| "Invalid bind address")?;

    info!("Listening on {}", addr);
    info!("Origin bucket: {}", config.origin.bucket);
    info!("Health route: {}", config.server.health_route);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Initialize logging
///
/// `RUST_LOG` wins; otherwise the debug flag forces `debug`, else the
/// configured level applies.
fn init_logging(logging: &LoggingConfig) {
    let level = if logging.debug {
        "debug"
    } else {
        logging.level.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (pretty, json) = if logging.format.eq_ignore_ascii_case("json") {
        (None, Some(fmt::layer().json()))
    } else {
        (Some(fmt::layer()), None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(pretty)
        .with(json)
        .init();
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
