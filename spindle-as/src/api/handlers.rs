//! HTTP request handlers
//!
//! Thin layer over the core: handlers validate, call into the pipeline or
//! the store, and map errors to status codes. A review submission is
//! acknowledged with 202 as soon as it is enqueued; the caller is told the
//! verdict is queued, not that the counter has moved.

use crate::review::StatsSnapshot;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use spindle_common::{Album, Error, NewAlbum};
use tracing::error;
use uuid::Uuid;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub pool_capacity: usize,
    pub pool_available: usize,
    pub ingest: StatsSnapshot,
}

type ApiError = (StatusCode, Json<StatusResponse>);

fn error_response(e: Error) -> ApiError {
    let status = match &e {
        Error::InvalidVerdict(_) | Error::InvalidAlbumId(_) | Error::MalformedMessage(_) => {
            StatusCode::BAD_REQUEST
        }
        Error::AlbumNotFound(_) => StatusCode::NOT_FOUND,
        Error::PoolExhausted { .. } => StatusCode::SERVICE_UNAVAILABLE,
        Error::QueueClosed | Error::Publish(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(StatusResponse {
            status: format!("error: {}", e),
        }),
    )
}

// ============================================================================
// Album Endpoints
// ============================================================================

/// POST /albums - Register a new album
pub async fn create_album(
    State(state): State<AppState>,
    Json(new_album): Json<NewAlbum>,
) -> Result<(StatusCode, Json<Album>), ApiError> {
    match state.store.insert(new_album).await {
        Ok(album) => Ok((StatusCode::CREATED, Json(album))),
        Err(e) => {
            error!(error = %e, "album registration failed");
            Err(error_response(e))
        }
    }
}

/// GET /albums/:album_id - Fetch an album with its review counters
pub async fn get_album(
    State(state): State<AppState>,
    Path(album_id): Path<String>,
) -> Result<Json<Album>, ApiError> {
    let album_id = Uuid::parse_str(&album_id)
        .map_err(|_| error_response(Error::InvalidAlbumId(album_id.clone())))?;

    match state.store.get(album_id).await {
        Ok(Some(album)) => Ok(Json(album)),
        Ok(None) => Err(error_response(Error::AlbumNotFound(album_id))),
        Err(e) => {
            error!(%album_id, error = %e, "album fetch failed");
            Err(error_response(e))
        }
    }
}

// ============================================================================
// Review Endpoint
// ============================================================================

/// POST /albums/:album_id/review/:verdict - Enqueue a review
///
/// 202 means "queued", applied later by the consumer pool. Invalid input is
/// rejected synchronously; pool exhaustion reports backpressure as 503.
pub async fn submit_review(
    State(state): State<AppState>,
    Path((album_id, verdict)): Path<(String, String)>,
) -> Result<(StatusCode, Json<StatusResponse>), ApiError> {
    match state.producer.submit(&album_id, &verdict).await {
        Ok(()) => Ok((
            StatusCode::ACCEPTED,
            Json(StatusResponse {
                status: "accepted".to_string(),
            }),
        )),
        Err(e) => Err(error_response(e)),
    }
}

// ============================================================================
// Health / Stats Endpoints
// ============================================================================

/// GET /health - Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "album_store".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /stats - Pipeline counters and pool occupancy
pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        pool_capacity: state.channel_pool.capacity(),
        pool_available: state.channel_pool.available(),
        ingest: state.stats.snapshot(),
    })
}
