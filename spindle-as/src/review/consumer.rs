//! Consumer worker pool
//!
//! N long-lived workers, each holding its own competing subscription on the
//! review queue. Every error is local to a single message: malformed
//! payloads and unknown albums are counted, logged, and dropped; store
//! failures are retried with backoff and dropped only after the attempts
//! are spent. One bad message never stops a worker.

use crate::broker::{ReviewQueue, Subscription};
use crate::db::AlbumStore;
use serde::Serialize;
use spindle_common::{ReviewMessage, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Worker pool tuning
#[derive(Debug, Clone)]
pub struct ConsumerOptions {
    /// Number of competing workers
    pub workers: usize,
    /// Store attempts per message before the message is dropped
    pub store_retry_attempts: u32,
    /// Base delay between store retries (grows linearly per attempt)
    pub store_retry_backoff: Duration,
}

impl Default for ConsumerOptions {
    fn default() -> Self {
        Self {
            workers: 10,
            store_retry_attempts: 3,
            store_retry_backoff: Duration::from_millis(50),
        }
    }
}

/// Ingest counters, shared with the HTTP layer for `/stats`.
///
/// Dropped messages are a deliberate local outcome, but they must be
/// observable so systemic problems (a misbehaving producer, a wedged store)
/// show up in operations rather than vanishing.
#[derive(Debug, Default)]
pub struct IngestStats {
    pub applied: AtomicU64,
    pub malformed: AtomicU64,
    pub unknown_album: AtomicU64,
    pub store_errors: AtomicU64,
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatsSnapshot {
    pub applied: u64,
    pub malformed: u64,
    pub unknown_album: u64,
    pub store_errors: u64,
}

impl IngestStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            applied: self.applied.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
            unknown_album: self.unknown_album.load(Ordering::Relaxed),
            store_errors: self.store_errors.load(Ordering::Relaxed),
        }
    }
}

/// Pool of review workers
pub struct ConsumerPool {
    workers: Vec<JoinHandle<()>>,
    cancel: CancellationToken,
    stats: Arc<IngestStats>,
}

impl ConsumerPool {
    /// Subscribe `options.workers` workers to `queue` and start them.
    pub fn spawn(
        broker: &Arc<ReviewQueue>,
        queue: &str,
        store: Arc<dyn AlbumStore>,
        options: ConsumerOptions,
    ) -> Result<Self> {
        let cancel = CancellationToken::new();
        let stats = Arc::new(IngestStats::default());

        let mut workers = Vec::with_capacity(options.workers);
        for worker_id in 0..options.workers {
            let subscription = broker.subscribe(queue)?;
            let store = Arc::clone(&store);
            let stats = Arc::clone(&stats);
            let cancel = cancel.clone();
            let options = options.clone();
            workers.push(tokio::spawn(async move {
                worker_loop(worker_id, subscription, store, stats, options, cancel).await;
            }));
        }

        info!(workers = options.workers, queue, "consumer pool started");

        Ok(Self {
            workers,
            cancel,
            stats,
        })
    }

    /// Counters shared with the workers
    pub fn stats(&self) -> Arc<IngestStats> {
        Arc::clone(&self.stats)
    }

    /// Stop all workers promptly and wait for them to exit. Buffered
    /// deliveries may be left unprocessed.
    pub async fn shutdown(self) {
        info!("shutting down consumer pool");
        self.cancel.cancel();
        for worker in self.workers {
            let _ = worker.await;
        }
        info!("consumer pool shut down");
    }

    /// Wait for the workers to finish on their own. Use after shutting the
    /// broker down: workers drain what is already queued, then exit at
    /// end-of-stream.
    pub async fn drain(self) {
        for worker in self.workers {
            let _ = worker.await;
        }
        info!("consumer pool drained");
    }
}

/// Worker main loop: pull deliveries until cancellation or end-of-stream
async fn worker_loop(
    worker_id: usize,
    subscription: Subscription,
    store: Arc<dyn AlbumStore>,
    stats: Arc<IngestStats>,
    options: ConsumerOptions,
    cancel: CancellationToken,
) {
    debug!(worker_id, queue = subscription.queue(), "review worker started");

    loop {
        let delivery = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(worker_id, "review worker cancelled");
                break;
            }
            delivery = subscription.next() => match delivery {
                Some(delivery) => delivery,
                None => {
                    debug!(worker_id, "review queue closed");
                    break;
                }
            },
        };

        process_delivery(worker_id, &delivery.payload, &store, &stats, &options).await;
    }

    debug!(worker_id, "review worker stopped");
}

/// Apply one delivery. Terminal outcome is always "processing complete":
/// either the counter moved or the message was dropped with a counted
/// reason.
async fn process_delivery(
    worker_id: usize,
    payload: &str,
    store: &Arc<dyn AlbumStore>,
    stats: &Arc<IngestStats>,
    options: &ConsumerOptions,
) {
    let message = match ReviewMessage::parse(payload) {
        Ok(message) => message,
        Err(_) => {
            stats.malformed.fetch_add(1, Ordering::Relaxed);
            warn!(worker_id, payload, "dropping malformed review message");
            return;
        }
    };

    let mut attempt = 0u32;
    loop {
        match store.apply_verdict(message.album_id, message.verdict).await {
            Ok(true) => {
                stats.applied.fetch_add(1, Ordering::Relaxed);
                debug!(
                    worker_id,
                    album_id = %message.album_id,
                    verdict = %message.verdict,
                    "review applied"
                );
                return;
            }
            Ok(false) => {
                stats.unknown_album.fetch_add(1, Ordering::Relaxed);
                warn!(
                    worker_id,
                    album_id = %message.album_id,
                    "dropping review for unknown album"
                );
                return;
            }
            Err(e) => {
                attempt += 1;
                if attempt >= options.store_retry_attempts {
                    stats.store_errors.fetch_add(1, Ordering::Relaxed);
                    error!(
                        worker_id,
                        album_id = %message.album_id,
                        attempts = attempt,
                        error = %e,
                        "dropping review after store failures"
                    );
                    return;
                }
                warn!(
                    worker_id,
                    album_id = %message.album_id,
                    attempt,
                    error = %e,
                    "store unavailable, retrying"
                );
                tokio::time::sleep(options.store_retry_backoff * attempt).await;
            }
        }
    }
}
