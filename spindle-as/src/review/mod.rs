//! Review ingestion pipeline
//!
//! Producer side: validate, encode, publish through a pooled channel.
//! Consumer side: a pool of workers draining the queue and applying
//! verdicts to the album store.

mod consumer;
mod producer;

pub use consumer::{ConsumerOptions, ConsumerPool, IngestStats, StatsSnapshot};
pub use producer::ReviewProducer;
