use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

use relay_core::health::{healthz, readyz};
use relay_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    log::{list_logs, retry_failed},
    subscription::{create_subscription, delete_subscription, list_subscriptions},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Subscriptions
        .route(
            "/webhooks/subscriptions",
            post(create_subscription).get(list_subscriptions),
        )
        .route("/webhooks/subscriptions/{id}", delete(delete_subscription))
        // Delivery logs
        .route("/webhooks/logs", get(list_logs))
        .route("/webhooks/logs/retry", post(retry_failed))
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
