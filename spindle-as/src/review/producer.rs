//! Review producer
//!
//! Validates a verdict, serializes the envelope, and publishes it through
//! a pooled channel. Exactly one message is enqueued per successful call.

use crate::broker::ChannelPool;
use spindle_common::{Error, ReviewMessage, Result, Verdict};
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

/// Producer half of the review pipeline
pub struct ReviewProducer {
    pool: Arc<ChannelPool>,
    queue: String,
}

impl ReviewProducer {
    pub fn new(pool: Arc<ChannelPool>, queue: impl Into<String>) -> Self {
        Self {
            pool,
            queue: queue.into(),
        }
    }

    /// Enqueue one review.
    ///
    /// Both tokens are validated before the pool is touched, so a bad
    /// request consumes no channel. The borrowed channel is returned on
    /// every path, including publish failure, by the guard's drop. Publish
    /// failures are reported to the caller rather than swallowed.
    pub async fn submit(&self, album_id: &str, verdict: &str) -> Result<()> {
        let verdict = Verdict::parse(verdict)?;
        let album_id = Uuid::parse_str(album_id)
            .map_err(|_| Error::InvalidAlbumId(album_id.to_string()))?;

        let payload = ReviewMessage::new(album_id, verdict).encode();

        let channel = self.pool.acquire().await?;
        match channel.publish(&self.queue, &payload, true).await {
            Ok(()) => {
                debug!(%album_id, %verdict, channel = channel.id(), "review enqueued");
                Ok(())
            }
            Err(e) => {
                error!(%album_id, %verdict, error = %e, "review publish failed");
                Err(e)
            }
        }
    }

    /// Queue reviews are published on
    pub fn queue(&self) -> &str {
        &self.queue
    }
}
