use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use relay_core::health::{healthz, readyz};
use relay_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    conversation::{list_conversations, list_messages, mark_read},
    realtime::realtime,
    webhook::{receive_webhook, verify_webhook},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Meta webhook
        .route("/webhooks/meta", get(verify_webhook).post(receive_webhook))
        // Realtime
        .route("/realtime", get(realtime))
        // Re-sync
        .route("/conversations", get(list_conversations))
        .route("/conversations/{id}/messages", get(list_messages))
        .route("/conversations/{id}/read", post(mark_read))
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
