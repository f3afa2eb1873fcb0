use axum::{
    Json,
    extract::{Query, State},
};

use relay_auth_types::identity::IdentityHeaders;
use relay_domain::pagination::PageRequest;

use crate::domain::types::{SweepSummary, WebhookLog};
use crate::error::DispatchServiceError;
use crate::state::AppState;
use crate::usecase::subscription::ListLogsUseCase;

// ── GET /webhooks/logs ───────────────────────────────────────────────────────

pub async fn list_logs(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Vec<WebhookLog>>, DispatchServiceError> {
    let uc = ListLogsUseCase {
        repo: state.log_repo(),
    };
    Ok(Json(uc.execute(identity.account_id.0, page).await?))
}

// ── POST /webhooks/logs/retry ────────────────────────────────────────────────

/// Sweep the caller's failed deliveries now. Admin only.
pub async fn retry_failed(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<SweepSummary>, DispatchServiceError> {
    if !identity.is_admin() {
        return Err(DispatchServiceError::Forbidden);
    }
    let summary = state
        .sweep_usecase()
        .execute(Some(identity.account_id.0))
        .await?;
    Ok(Json(summary))
}
