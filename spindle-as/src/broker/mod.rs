//! In-process review queue
//!
//! Named queues with bounded depth, persistent-flagged deliveries, and
//! competing-consumer subscriptions. Each queue is a bounded mpsc channel
//! whose receiver is shared across all subscriptions, so every delivery
//! reaches exactly one of them. Publishing to a full queue awaits
//! (broker-side backpressure); once the broker is shut down, publishers
//! and subscribers get `Error::QueueClosed` instead of blocking forever.

pub mod pool;

use spindle_common::{Error, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::{debug, info};

pub use pool::{ChannelPool, PooledChannel};

/// A message handed to exactly one subscriber
#[derive(Debug, Clone)]
pub struct Delivery {
    /// UTF-8 envelope text
    pub payload: String,
    /// Marked to survive a broker restart. Metadata only for the
    /// in-process queue; carried so the contract is visible on the wire.
    pub persistent: bool,
}

/// Per-queue channel endpoints
struct QueueSlot {
    tx: mpsc::Sender<Delivery>,
    rx: Arc<tokio::sync::Mutex<mpsc::Receiver<Delivery>>>,
}

/// The broker: a flat namespace of bounded queues
pub struct ReviewQueue {
    depth: usize,
    queues: Mutex<HashMap<String, QueueSlot>>,
    closed: AtomicBool,
}

impl ReviewQueue {
    /// Create a broker whose queues hold at most `depth` undelivered messages
    pub fn new(depth: usize) -> Arc<Self> {
        Arc::new(Self {
            depth,
            queues: Mutex::new(HashMap::new()),
            closed: AtomicBool::new(false),
        })
    }

    /// Declare `name` if it does not exist yet and return its sender
    fn sender(&self, name: &str) -> Result<mpsc::Sender<Delivery>> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::QueueClosed);
        }
        let mut queues = self.queues.lock().expect("queue registry poisoned");
        let slot = queues.entry(name.to_string()).or_insert_with(|| {
            debug!(queue = name, depth = self.depth, "declaring queue");
            let (tx, rx) = mpsc::channel(self.depth);
            QueueSlot {
                tx,
                rx: Arc::new(tokio::sync::Mutex::new(rx)),
            }
        });
        Ok(slot.tx.clone())
    }

    /// Open a competing-consumer subscription on `name`.
    ///
    /// All subscriptions on the same queue share one receiver; the broker
    /// hands each delivery to whichever subscriber asks first.
    pub fn subscribe(&self, name: &str) -> Result<Subscription> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::QueueClosed);
        }
        // Declaring via sender() keeps publish/subscribe order-independent
        self.sender(name)?;
        let queues = self.queues.lock().expect("queue registry poisoned");
        let slot = queues.get(name).expect("queue declared above");
        Ok(Subscription {
            queue: name.to_string(),
            rx: Arc::clone(&slot.rx),
        })
    }

    /// Close every queue. In-flight deliveries drain; subsequent publishes
    /// fail with `QueueClosed` and subscriptions see end-of-stream.
    pub fn shutdown(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let mut queues = self.queues.lock().expect("queue registry poisoned");
        let drained: Vec<String> = queues.keys().cloned().collect();
        queues.clear();
        info!(queues = ?drained, "review queue shut down");
    }
}

/// Reusable publish capability drawn from the channel pool.
///
/// Channels are homogeneous; any channel can publish to any queue on its
/// broker.
#[derive(Clone)]
pub struct PublishChannel {
    broker: Arc<ReviewQueue>,
    id: usize,
}

impl PublishChannel {
    pub fn new(broker: Arc<ReviewQueue>, id: usize) -> Self {
        Self { broker, id }
    }

    /// Enqueue `payload` on `queue`, waiting if the queue is full.
    pub async fn publish(&self, queue: &str, payload: &str, persistent: bool) -> Result<()> {
        let tx = self.broker.sender(queue)?;
        tx.send(Delivery {
            payload: payload.to_string(),
            persistent,
        })
        .await
        // The closed check above passed, so a failed send means the queue
        // went away mid-publish.
        .map_err(|_| Error::Publish(format!("queue {:?} closed during publish", queue)))?;
        debug!(channel = self.id, queue, payload, "published review");
        Ok(())
    }

    /// Channel identifier, for logs
    pub fn id(&self) -> usize {
        self.id
    }
}

/// One consumer's view of a queue.
///
/// Deliveries are acknowledged implicitly at hand-off: once `next` returns a
/// message it belongs to this subscriber alone and will not be redelivered.
pub struct Subscription {
    queue: String,
    rx: Arc<tokio::sync::Mutex<mpsc::Receiver<Delivery>>>,
}

impl Subscription {
    /// Wait for the next delivery. Returns `None` once the broker is shut
    /// down and the queue has drained.
    pub async fn next(&self) -> Option<Delivery> {
        self.rx.lock().await.recv().await
    }

    /// Queue this subscription competes on
    pub fn queue(&self) -> &str {
        &self.queue
    }
}
