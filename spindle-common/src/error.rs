//! Common error types for Spindle

use thiserror::Error;

/// Common result type for Spindle operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared across the producer and consumer sides
#[derive(Error, Debug)]
pub enum Error {
    /// Verdict token outside the allowed set; rejected before any resource is touched
    #[error("Invalid verdict: {0:?} (expected \"like\" or \"dislike\")")]
    InvalidVerdict(String),

    /// Album identifier is not a valid UUID
    #[error("Invalid album id: {0:?}")]
    InvalidAlbumId(String),

    /// Bounded wait for a publish channel elapsed with the pool exhausted
    #[error("Publish channel pool exhausted (waited {waited_ms}ms)")]
    PoolExhausted { waited_ms: u64 },

    /// The review queue has been shut down; publish/subscribe cannot proceed
    #[error("Review queue is closed")]
    QueueClosed,

    /// The queue rejected or could not accept a message
    #[error("Publish failed: {0}")]
    Publish(String),

    /// A delivered envelope could not be parsed; dropped, never retried
    #[error("Malformed review message: {0:?}")]
    MalformedMessage(String),

    /// Requested album does not exist
    #[error("Album not found: {0}")]
    AlbumNotFound(uuid::Uuid),

    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
