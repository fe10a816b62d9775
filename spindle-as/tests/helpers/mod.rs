//! Shared fixtures for integration tests
#![allow(dead_code)]

use spindle_as::broker::{ChannelPool, ReviewQueue};
use spindle_as::db::{self, AlbumStore, SqliteStore};
use spindle_as::review::{ConsumerOptions, ConsumerPool, IngestStats, ReviewProducer};
use spindle_as::{build_router, AppState};
use spindle_common::{Album, NewAlbum};
use std::sync::Arc;
use std::time::Duration;

pub const QUEUE: &str = "reviews";

/// A fully wired pipeline over an in-memory store
pub struct TestPipeline {
    pub broker: Arc<ReviewQueue>,
    pub store: Arc<SqliteStore>,
    pub channel_pool: Arc<ChannelPool>,
    pub producer: Arc<ReviewProducer>,
    pub consumers: ConsumerPool,
    pub stats: Arc<IngestStats>,
}

/// In-memory SQLite is per-connection; a single-connection pool keeps every
/// query on the same database.
pub async fn memory_store() -> Arc<SqliteStore> {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    db::init_schema(&pool).await.expect("schema");
    Arc::new(SqliteStore::new(pool))
}

/// Wire broker, pool, producer, and consumers the way main does
pub async fn start_pipeline(workers: usize, pool_capacity: usize) -> TestPipeline {
    let broker = ReviewQueue::new(64);
    let store = memory_store().await;
    let channel_pool = Arc::new(ChannelPool::new(
        &broker,
        pool_capacity,
        Duration::from_millis(500),
    ));
    let producer = Arc::new(ReviewProducer::new(Arc::clone(&channel_pool), QUEUE));
    let consumers = ConsumerPool::spawn(
        &broker,
        QUEUE,
        store.clone(),
        ConsumerOptions {
            workers,
            store_retry_attempts: 3,
            store_retry_backoff: Duration::from_millis(5),
        },
    )
    .expect("consumer pool");
    let stats = consumers.stats();

    TestPipeline {
        broker,
        store,
        channel_pool,
        producer,
        consumers,
        stats,
    }
}

impl TestPipeline {
    pub fn router(&self) -> axum::Router {
        let state = AppState::new(
            self.store.clone(),
            Arc::clone(&self.producer),
            Arc::clone(&self.stats),
            Arc::clone(&self.channel_pool),
        );
        build_router(state)
    }

    pub async fn register(&self, artist: &str, title: &str) -> Album {
        self.store
            .insert(NewAlbum {
                artist: artist.to_string(),
                title: title.to_string(),
                year: "1971".to_string(),
                image: "cover.jpg".to_string(),
            })
            .await
            .expect("album registered")
    }

    /// Wait until `n` messages reached a terminal outcome (any counter)
    pub async fn wait_for_processed(&self, n: u64) {
        for _ in 0..300 {
            let s = self.stats.snapshot();
            if s.applied + s.malformed + s.unknown_album + s.store_errors >= n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("pipeline did not process {} messages in time", n);
    }
}
