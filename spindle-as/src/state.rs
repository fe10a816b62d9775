//! Shared application state
//!
//! One `AppState` is cloned into every HTTP handler. All members are Arcs;
//! the handlers share the same store, producer, pool, and counters as the
//! consumer workers.

use crate::broker::ChannelPool;
use crate::db::AlbumStore;
use crate::review::{IngestStats, ReviewProducer};
use std::sync::Arc;

/// State shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Album store (registration path and reads)
    pub store: Arc<dyn AlbumStore>,
    /// Producer half of the review pipeline
    pub producer: Arc<ReviewProducer>,
    /// Ingest counters maintained by the consumer workers
    pub stats: Arc<IngestStats>,
    /// Publish channel pool, exposed for diagnostics
    pub channel_pool: Arc<ChannelPool>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn AlbumStore>,
        producer: Arc<ReviewProducer>,
        stats: Arc<IngestStats>,
        channel_pool: Arc<ChannelPool>,
    ) -> Self {
        Self {
            store,
            producer,
            stats,
            channel_pool,
        }
    }
}
