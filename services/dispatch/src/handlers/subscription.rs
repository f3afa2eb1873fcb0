use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use relay_auth_types::identity::IdentityHeaders;
use relay_domain::id::SubscriptionId;

use crate::domain::types::Subscription;
use crate::error::DispatchServiceError;
use crate::state::AppState;
use crate::usecase::subscription::{
    CreateSubscriptionUseCase, DeleteSubscriptionUseCase, ListSubscriptionsUseCase,
};

// ── POST /webhooks/subscriptions ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateSubscriptionRequest {
    pub url: String,
    pub events: Vec<String>,
}

pub async fn create_subscription(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<CreateSubscriptionRequest>,
) -> Result<(StatusCode, Json<Subscription>), DispatchServiceError> {
    let uc = CreateSubscriptionUseCase {
        repo: state.subscription_repo(),
    };
    let subscription = uc
        .execute(identity.account_id.0, &body.url, &body.events)
        .await?;
    Ok((StatusCode::CREATED, Json(subscription)))
}

// ── GET /webhooks/subscriptions ──────────────────────────────────────────────

pub async fn list_subscriptions(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<Vec<Subscription>>, DispatchServiceError> {
    let uc = ListSubscriptionsUseCase {
        repo: state.subscription_repo(),
    };
    Ok(Json(uc.execute(identity.account_id.0).await?))
}

// ── DELETE /webhooks/subscriptions/{id} ──────────────────────────────────────

pub async fn delete_subscription(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, DispatchServiceError> {
    let uc = DeleteSubscriptionUseCase {
        repo: state.subscription_repo(),
    };
    uc.execute(identity.account_id.0, SubscriptionId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
