//! Router-level tests exercising the HTTP surface without a network.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

use vsplice_api::{create_router, ApiConfig, AppState};

fn test_state() -> AppState {
    let scratch = std::env::temp_dir().join("vsplice-api-test");
    std::env::set_var("S3_ENDPOINT_URL", "http://127.0.0.1:9000");
    std::env::set_var("S3_ACCESS_KEY_ID", "test-key");
    std::env::set_var("S3_SECRET_ACCESS_KEY", "test-secret");
    std::env::set_var("S3_BUCKET_NAME", "test-bucket");
    std::env::set_var("STAGING_DIR", scratch.join("uploads"));
    std::env::set_var("TEMP_DIR", scratch.join("temp"));

    AppState::new(ApiConfig::default()).expect("state should build without network access")
}

#[tokio::test]
async fn health_route_responds_ok() {
    let app = create_router(test_state(), None);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn process_rejects_invalid_request_body() {
    let app = create_router(test_state(), None);

    let body = serde_json::json!({
        "request_id": "req-1",
        "video_urls": [],
        "insert_video_filename": "promo.mp4",
        "webhook_url": "https://example.com/hook"
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/process")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn process_requires_staged_insert() {
    let app = create_router(test_state(), None);

    let body = serde_json::json!({
        "request_id": "req-2",
        "video_urls": ["https://example.com/a.mp4"],
        "insert_video_filename": "never-staged.mp4",
        "webhook_url": "https://example.com/hook"
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/process")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
