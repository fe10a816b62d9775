//! Publish-channel pool
//!
//! A fixed population of publish channels loaned out one at a time.
//! `acquire` waits (bounded) for a free channel; the returned guard gives
//! the channel back when dropped, on every exit path. The pool is the only
//! producer-side backpressure mechanism: no more than `capacity` publishes
//! can be in flight at once.

use super::{PublishChannel, ReviewQueue};
use spindle_common::{Error, Result};
use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tracing::info;

/// Fixed-size pool of reusable publish channels
pub struct ChannelPool {
    /// Idle channels cycle through this take/put queue
    slot_tx: mpsc::Sender<PublishChannel>,
    slot_rx: Arc<Mutex<mpsc::Receiver<PublishChannel>>>,
    capacity: usize,
    acquire_timeout: Duration,
    available: Arc<AtomicUsize>,
}

impl ChannelPool {
    /// Create `capacity` channels on `broker`. The population is fixed:
    /// channels are loaned and returned, never created or destroyed after
    /// this point.
    pub fn new(broker: &Arc<ReviewQueue>, capacity: usize, acquire_timeout: Duration) -> Self {
        let (slot_tx, slot_rx) = mpsc::channel(capacity.max(1));
        for id in 0..capacity {
            slot_tx
                .try_send(PublishChannel::new(Arc::clone(broker), id))
                .expect("pool slots sized to capacity");
        }
        info!(capacity, "publish channel pool initialized");
        Self {
            slot_tx,
            slot_rx: Arc::new(Mutex::new(slot_rx)),
            capacity,
            acquire_timeout,
            available: Arc::new(AtomicUsize::new(capacity)),
        }
    }

    /// Borrow a channel, waiting up to the configured timeout for one to
    /// free up. An exhausted wait is `Error::PoolExhausted` so the caller
    /// degrades with a backpressure report instead of hanging.
    pub async fn acquire(&self) -> Result<PooledChannel> {
        let take = async {
            let mut rx = self.slot_rx.lock().await;
            rx.recv().await
        };
        match tokio::time::timeout(self.acquire_timeout, take).await {
            Ok(Some(channel)) => {
                self.available.fetch_sub(1, Ordering::AcqRel);
                Ok(PooledChannel {
                    channel: Some(channel),
                    slot_tx: self.slot_tx.clone(),
                    available: Arc::clone(&self.available),
                })
            }
            // All slot senders live as long as the pool, so this only
            // happens if the pool itself is gone mid-acquire.
            Ok(None) => Err(Error::QueueClosed),
            Err(_) => Err(Error::PoolExhausted {
                waited_ms: self.acquire_timeout.as_millis() as u64,
            }),
        }
    }

    /// Channels currently idle in the pool
    pub fn available(&self) -> usize {
        self.available.load(Ordering::Acquire)
    }

    /// Fixed channel population
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// A borrowed publish channel. Dropping the guard returns the channel to
/// the pool, so release happens exactly once per acquire on success, error,
/// and unwind paths alike.
pub struct PooledChannel {
    channel: Option<PublishChannel>,
    slot_tx: mpsc::Sender<PublishChannel>,
    available: Arc<AtomicUsize>,
}

impl std::fmt::Debug for PooledChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledChannel")
            .field("present", &self.channel.is_some())
            .field("available", &self.available.load(Ordering::Relaxed))
            .finish()
    }
}

impl Deref for PooledChannel {
    type Target = PublishChannel;

    fn deref(&self) -> &PublishChannel {
        self.channel.as_ref().expect("channel present until drop")
    }
}

impl Drop for PooledChannel {
    fn drop(&mut self) {
        if let Some(channel) = self.channel.take() {
            // Count the slot free before handing it back: a waiter may
            // reacquire the instant the send lands, and its decrement must
            // not observe a stale count.
            self.available.fetch_add(1, Ordering::AcqRel);
            // The slot queue is sized to the population, so this only
            // fails if the pool itself is already gone.
            if self.slot_tx.try_send(channel).is_err() {
                self.available.fetch_sub(1, Ordering::AcqRel);
            }
        }
    }
}
