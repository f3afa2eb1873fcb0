use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    http::HeaderMap,
};
use serde::Deserialize;

use crate::domain::signature::{SIGNATURE_HEADER, verify_signature};
use crate::error::InboxServiceError;
use crate::state::AppState;
use crate::usecase::ingest::IngestReport;

// ── GET /webhooks/meta ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// Meta subscription handshake: echo `hub.challenge` when the token matches.
pub async fn verify_webhook(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> Result<String, InboxServiceError> {
    match (query.mode.as_deref(), query.verify_token, query.challenge) {
        (Some("subscribe"), Some(token), Some(challenge))
            if token == state.meta.verify_token =>
        {
            tracing::info!("webhook verification accepted");
            Ok(challenge)
        }
        (mode, _, _) => {
            tracing::warn!(mode = mode.unwrap_or_default(), "webhook verification rejected");
            Err(InboxServiceError::VerificationFailed)
        }
    }
}

// ── POST /webhooks/meta ──────────────────────────────────────────────────────

/// Receive a webhook delivery. Anything past the signature check is
/// acknowledged with 200 so Meta does not redeliver.
pub async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<IngestReport>, InboxServiceError> {
    if let Some(secret) = state.meta.app_secret.as_deref() {
        let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
        if !verify_signature(secret, signature, &body) {
            tracing::warn!(bytes = body.len(), "webhook signature mismatch");
            return Err(InboxServiceError::InvalidSignature);
        }
    }

    let report = state.ingest_usecase().execute(&body).await;
    Ok(Json(report))
}
