//! Service configuration
//!
//! Loaded from an optional TOML file; every section falls back to defaults
//! mirroring the original deployment constants (pool of 10 channels, 10
//! workers, queue "reviews"). CLI/env overrides are applied in `main`.

use crate::review::ConsumerOptions;
use serde::Deserialize;
use spindle_common::{Error, Result};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub queue: QueueConfig,
    pub pool: PoolConfig,
    pub consumer: ConsumerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5780,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// sqlx connection URL; `mode=rwc` creates the file on first run
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://spindle.db?mode=rwc".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Logical queue name shared by the producer and all consumers
    pub name: String,
    /// Maximum undelivered messages before publishers wait
    pub depth: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            name: "reviews".to_string(),
            depth: 256,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Fixed publish channel population
    pub capacity: usize,
    /// Bounded wait for a free channel before reporting backpressure
    pub acquire_timeout_ms: u64,
}

impl PoolConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity: 10,
            acquire_timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConsumerConfig {
    pub workers: usize,
    pub store_retry_attempts: u32,
    pub store_retry_backoff_ms: u64,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            workers: 10,
            store_retry_attempts: 3,
            store_retry_backoff_ms: 50,
        }
    }
}

impl ConsumerConfig {
    pub fn options(&self) -> ConsumerOptions {
        ConsumerOptions {
            workers: self.workers,
            store_retry_attempts: self.store_retry_attempts,
            store_retry_backoff: Duration::from_millis(self.store_retry_backoff_ms),
        }
    }
}

impl Config {
    /// Load from `path`, or defaults when no file is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config: Config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!("cannot read {}: {}", path.display(), e))
                })?;
                toml::from_str(&text)
                    .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?
            }
            None => Config::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.pool.capacity == 0 {
            return Err(Error::Config("pool.capacity must be at least 1".into()));
        }
        if self.consumer.workers == 0 {
            return Err(Error::Config("consumer.workers must be at least 1".into()));
        }
        if self.queue.depth == 0 {
            return Err(Error::Config("queue.depth must be at least 1".into()));
        }
        Ok(())
    }
}
