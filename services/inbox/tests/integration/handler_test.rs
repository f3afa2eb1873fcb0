use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};

use relay_inbox::domain::signature::{SIGNATURE_HEADER, sign};
use relay_inbox::infra::grpc::GrpcEventPublisher;
use relay_inbox::realtime::RoomHub;
use relay_inbox::router::build_router;
use relay_inbox::state::{AppState, MetaSettings};

const VERIFY_TOKEN: &str = "meta-verify-token";
const APP_SECRET: &str = "meta-app-secret";

/// Router over a disconnected database. Only routes that answer before
/// touching storage are exercised here.
fn server(app_secret: Option<&str>) -> TestServer {
    let state = AppState {
        db: DatabaseConnection::Disconnected,
        hub: RoomHub::new(),
        publisher: GrpcEventPublisher::lazy("http://127.0.0.1:1").unwrap(),
        meta: Arc::new(MetaSettings {
            verify_token: VERIFY_TOKEN.to_owned(),
            app_secret: app_secret.map(str::to_owned),
        }),
    };
    TestServer::new(build_router(state)).unwrap()
}

fn signature(body: &[u8]) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static(SIGNATURE_HEADER),
        HeaderValue::from_str(&sign(APP_SECRET, body).unwrap()).unwrap(),
    )
}

fn account_update_only() -> Bytes {
    let body = json!({
        "object": "whatsapp_business_account",
        "entry": [{
            "id": "123456789012345",
            "changes": [{ "field": "account_update", "value": { "event": "VERIFIED_ACCOUNT" } }]
        }]
    });
    Bytes::from(serde_json::to_vec(&body).unwrap())
}

#[tokio::test]
async fn healthz_returns_200() {
    let response = server(None).get("/healthz").await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn verify_webhook_echoes_challenge() {
    let response = server(None)
        .get("/webhooks/meta")
        .add_query_param("hub.mode", "subscribe")
        .add_query_param("hub.verify_token", VERIFY_TOKEN)
        .add_query_param("hub.challenge", "1158201444")
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "1158201444");
}

#[tokio::test]
async fn verify_webhook_rejects_wrong_token() {
    let response = server(None)
        .get("/webhooks/meta")
        .add_query_param("hub.mode", "subscribe")
        .add_query_param("hub.verify_token", "guess")
        .add_query_param("hub.challenge", "1158201444")
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["kind"], "VERIFICATION_FAILED");
}

#[tokio::test]
async fn receive_webhook_rejects_missing_signature() {
    let response = server(Some(APP_SECRET))
        .post("/webhooks/meta")
        .bytes(account_update_only())
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn receive_webhook_rejects_signature_from_other_secret() {
    let body = account_update_only();
    let response = server(Some(APP_SECRET))
        .post("/webhooks/meta")
        .add_header(
            HeaderName::from_static(SIGNATURE_HEADER),
            HeaderValue::from_str(&sign("another-secret", &body).unwrap()).unwrap(),
        )
        .bytes(body)
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["kind"], "INVALID_SIGNATURE");
}

#[tokio::test]
async fn receive_webhook_acknowledges_signed_skipped_change() {
    let body = account_update_only();
    let (name, value) = signature(&body);
    let response = server(Some(APP_SECRET))
        .post("/webhooks/meta")
        .add_header(name, value)
        .bytes(body)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let report: Value = response.json();
    assert_eq!(report["malformed"], false);
    assert_eq!(report["skipped"], 1);
    assert_eq!(report["recorded"], 0);
}

#[tokio::test]
async fn receive_webhook_acknowledges_malformed_payload() {
    let body = Bytes::from_static(b"{\"object\":\"page\",\"entry\":[]}");
    let (name, value) = signature(&body);
    let response = server(Some(APP_SECRET))
        .post("/webhooks/meta")
        .add_header(name, value)
        .bytes(body)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let report: Value = response.json();
    assert_eq!(report["malformed"], true);
}

#[tokio::test]
async fn receive_webhook_skips_signature_check_without_secret() {
    let response = server(None)
        .post("/webhooks/meta")
        .bytes(account_update_only())
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn conversations_require_identity() {
    let response = server(None).get("/conversations").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn mark_read_requires_identity() {
    let response = server(None)
        .post("/conversations/0190f1a2-0000-7000-8000-000000000001/read")
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}
