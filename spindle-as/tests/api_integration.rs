//! Integration tests for the Album Store HTTP API
//!
//! Exercises the router in-process with `tower::ServiceExt::oneshot`:
//! album registration and fetch, review submission (accepted-on-enqueue
//! semantics), and the health/stats endpoints.

mod helpers;

use axum::http::StatusCode;
use helpers::start_pipeline;
use serde_json::{json, Value};
use uuid::Uuid;

/// Helper to make an in-process request to the router
async fn make_request(
    app: &axum::Router,
    method: &str,
    path: &str,
    body: Option<Value>,
) -> (StatusCode, Option<Value>) {
    use axum::body::Body;
    use http::{Method, Request};
    use tower::ServiceExt;

    let method = match method {
        "GET" => Method::GET,
        "POST" => Method::POST,
        _ => panic!("Unsupported method"),
    };

    let mut request = Request::builder().method(method).uri(path);
    if body.is_some() {
        request = request.header("content-type", "application/json");
    }

    let request = if let Some(json_body) = body {
        request.body(Body::from(json_body.to_string())).unwrap()
    } else {
        request.body(Body::empty()).unwrap()
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json_body = if bytes.is_empty() {
        None
    } else {
        Some(serde_json::from_slice(&bytes).unwrap())
    };

    (status, json_body)
}

fn sample_album() -> Value {
    json!({
        "artist": "Joni Mitchell",
        "title": "Blue",
        "year": "1971",
        "image": "blue.jpg"
    })
}

#[tokio::test]
async fn register_album_returns_created_with_id_and_zero_counters() {
    let pipeline = start_pipeline(1, 2).await;
    let app = pipeline.router();

    let (status, body) = make_request(&app, "POST", "/albums", Some(sample_album())).await;
    assert_eq!(status, StatusCode::CREATED);

    let body = body.unwrap();
    assert_eq!(body["artist"], "Joni Mitchell");
    assert_eq!(body["like_count"], 0);
    assert_eq!(body["dislike_count"], 0);
    Uuid::parse_str(body["album_id"].as_str().unwrap()).expect("generated album id");
}

#[tokio::test]
async fn fetch_album_round_trips() {
    let pipeline = start_pipeline(1, 2).await;
    let app = pipeline.router();

    let (_, created) = make_request(&app, "POST", "/albums", Some(sample_album())).await;
    let album_id = created.unwrap()["album_id"].as_str().unwrap().to_string();

    let (status, body) = make_request(&app, "GET", &format!("/albums/{}", album_id), None).await;
    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    assert_eq!(body["album_id"], album_id.as_str());
    assert_eq!(body["title"], "Blue");
}

#[tokio::test]
async fn fetch_unknown_album_is_404() {
    let pipeline = start_pipeline(1, 2).await;
    let app = pipeline.router();

    let (status, _) =
        make_request(&app, "GET", &format!("/albums/{}", Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn fetch_with_malformed_id_is_400() {
    let pipeline = start_pipeline(1, 2).await;
    let app = pipeline.router();

    let (status, _) = make_request(&app, "GET", "/albums/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn review_is_accepted_then_applied_asynchronously() {
    let pipeline = start_pipeline(2, 4).await;
    let app = pipeline.router();
    let album = pipeline.register("Joni Mitchell", "Hejira").await;

    let (status, body) = make_request(
        &app,
        "POST",
        &format!("/albums/{}/review/like", album.album_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body.unwrap()["status"], "accepted");

    // 202 means queued; the counter moves once a worker applies it
    pipeline.wait_for_processed(1).await;
    let (_, body) = make_request(
        &app,
        "GET",
        &format!("/albums/{}", album.album_id),
        None,
    )
    .await;
    assert_eq!(body.unwrap()["like_count"], 1);
}

#[tokio::test]
async fn invalid_verdict_is_rejected_synchronously() {
    let pipeline = start_pipeline(1, 2).await;
    let app = pipeline.router();
    let album = pipeline.register("Joni Mitchell", "Court and Spark").await;

    let (status, body) = make_request(
        &app,
        "POST",
        &format!("/albums/{}/review/adore", album.album_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let status_text = body.unwrap()["status"].as_str().unwrap().to_string();
    assert!(status_text.contains("Invalid verdict"));

    // Nothing reached the pipeline
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    let snapshot = pipeline.stats.snapshot();
    assert_eq!(snapshot.applied + snapshot.malformed + snapshot.unknown_album, 0);
}

#[tokio::test]
async fn review_with_malformed_album_id_is_400() {
    let pipeline = start_pipeline(1, 2).await;
    let app = pipeline.router();

    let (status, _) = make_request(&app, "POST", "/albums/xyz/review/like", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn review_for_unknown_album_is_accepted_then_dropped() {
    let pipeline = start_pipeline(1, 2).await;
    let app = pipeline.router();

    // The submit path does not check existence; the consumer drops it
    let (status, _) = make_request(
        &app,
        "POST",
        &format!("/albums/{}/review/dislike", Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    pipeline.wait_for_processed(1).await;
    assert_eq!(pipeline.stats.snapshot().unknown_album, 1);
}

#[tokio::test]
async fn health_reports_module_and_version() {
    let pipeline = start_pipeline(1, 2).await;
    let app = pipeline.router();

    let (status, body) = make_request(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["module"], "album_store");
}

#[tokio::test]
async fn stats_reports_pool_occupancy_and_ingest_counters() {
    let pipeline = start_pipeline(2, 4).await;
    let app = pipeline.router();
    let album = pipeline.register("Joni Mitchell", "Ladies of the Canyon").await;

    let (_, _) = make_request(
        &app,
        "POST",
        &format!("/albums/{}/review/like", album.album_id),
        None,
    )
    .await;
    pipeline.wait_for_processed(1).await;

    let (status, body) = make_request(&app, "GET", "/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    assert_eq!(body["pool_capacity"], 4);
    assert_eq!(body["pool_available"], 4);
    assert_eq!(body["ingest"]["applied"], 1);
}
