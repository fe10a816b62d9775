//! HTTP API for the album store

mod handlers;

pub use handlers::{
    create_album, get_album, health, stats, submit_review, HealthResponse, StatsResponse,
    StatusResponse,
};
