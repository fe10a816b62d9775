//! spindle-as library - Album Store service
//!
//! An album registry with an asynchronous review ingestion pipeline:
//! reviews are accepted over HTTP, enqueued through a bounded pool of
//! publish channels, and applied to the SQLite store by a pool of
//! consumer workers.

pub mod api;
pub mod broker;
pub mod config;
pub mod db;
pub mod review;
pub mod server;
pub mod state;

pub use server::build_router;
pub use state::AppState;
