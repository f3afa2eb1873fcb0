use axum::http::StatusCode;
use axum_test::TestServer;
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use uuid::Uuid;

use relay_dispatch::domain::retry::RetryPolicy;
use relay_dispatch::infra::http::ReqwestTransport;
use relay_dispatch::router::build_router;
use relay_dispatch::state::AppState;
use relay_testing::auth::MockAuth;

/// Router over a disconnected database. Only requests rejected before any
/// storage access are exercised here.
fn server() -> TestServer {
    let state = AppState {
        db: DatabaseConnection::Disconnected,
        transport: ReqwestTransport::new().unwrap(),
        policy: RetryPolicy::default(),
    };
    TestServer::new(build_router(state)).unwrap()
}

#[tokio::test]
async fn healthz_returns_200() {
    let response = server().get("/healthz").await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn logs_require_identity() {
    let response = server().get("/webhooks/logs").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn retry_is_admin_only() {
    let server = server();
    let mut request = server.post("/webhooks/logs/retry");
    for (name, value) in MockAuth::agent(Uuid::new_v4()).header_pairs() {
        request = request.add_header(name, value);
    }
    let response = request.await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["kind"], "FORBIDDEN");
}

#[tokio::test]
async fn create_subscription_rejects_non_http_url() {
    let server = server();
    let mut request = server
        .post("/webhooks/subscriptions")
        .json(&json!({ "url": "ftp://hooks.example.com/relay", "events": ["*"] }));
    for (name, value) in MockAuth::admin(Uuid::new_v4()).header_pairs() {
        request = request.add_header(name, value);
    }
    let response = request.await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["kind"], "INVALID_SUBSCRIPTION");
}

#[tokio::test]
async fn create_subscription_rejects_empty_events() {
    let server = server();
    let mut request = server
        .post("/webhooks/subscriptions")
        .json(&json!({ "url": "https://hooks.example.com/relay", "events": [] }));
    for (name, value) in MockAuth::agent(Uuid::new_v4()).header_pairs() {
        request = request.add_header(name, value);
    }
    let response = request.await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["message"], "invalid subscription: events must not be empty");
}

#[tokio::test]
async fn delete_subscription_requires_uuid() {
    let server = server();
    let mut request = server.delete("/webhooks/subscriptions/not-a-uuid");
    for (name, value) in MockAuth::agent(Uuid::new_v4()).header_pairs() {
        request = request.add_header(name, value);
    }
    let response = request.await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}
