//! Album Store (spindle-as) - Main entry point
//!
//! Wires the review ingestion pipeline together: SQLite album store,
//! in-process review queue, bounded publish channel pool, producer, and
//! the consumer worker pool, fronted by the HTTP API.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spindle_as::broker::{ChannelPool, ReviewQueue};
use spindle_as::config::Config;
use spindle_as::db::{self, SqliteStore};
use spindle_as::review::{ConsumerPool, ReviewProducer};
use spindle_as::{build_router, AppState};

/// Command-line arguments for spindle-as
#[derive(Parser, Debug)]
#[command(name = "spindle-as")]
#[command(about = "Album Store service for Spindle")]
#[command(version)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "SPINDLE_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "SPINDLE_PORT")]
    port: Option<u16>,

    /// Database URL (overrides the config file)
    #[arg(short, long, env = "SPINDLE_DATABASE_URL")]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spindle_as=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!(
        "Starting Spindle Album Store v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration and apply CLI/env overrides
    let mut config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(url) = args.database_url {
        config.database.url = url;
    }

    // Album store
    let pool = db::connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;
    db::init_schema(&pool)
        .await
        .context("Failed to initialize database schema")?;
    let store = Arc::new(SqliteStore::new(pool));
    info!("Connected to database at {}", config.database.url);

    // Review pipeline: broker, publish channel pool, producer, consumers
    let broker = ReviewQueue::new(config.queue.depth);
    let channel_pool = Arc::new(ChannelPool::new(
        &broker,
        config.pool.capacity,
        config.pool.acquire_timeout(),
    ));
    let producer = Arc::new(ReviewProducer::new(
        Arc::clone(&channel_pool),
        config.queue.name.clone(),
    ));
    let consumers = ConsumerPool::spawn(
        &broker,
        &config.queue.name,
        store.clone(),
        config.consumer.options(),
    )
    .context("Failed to start consumer pool")?;

    let state = AppState::new(store, producer, consumers.stats(), channel_pool);
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("spindle-as listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Stop accepting, then let the workers drain what is already queued
    broker.shutdown();
    consumers.drain().await;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
