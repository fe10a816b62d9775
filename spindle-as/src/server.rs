//! Application router

use crate::api;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/albums", post(api::create_album))
        .route("/albums/:album_id", get(api::get_album))
        .route("/albums/:album_id/review/:verdict", post(api::submit_review))
        .route("/health", get(api::health))
        .route("/stats", get(api::stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
