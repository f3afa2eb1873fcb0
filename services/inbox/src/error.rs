use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use relay_core::error::error_response;

use crate::domain::webhook::MalformedWebhookPayload;

/// Inbox service error variants.
///
/// The resolution and recording variants never reach a Meta webhook response:
/// ingestion logs and counts them, then acknowledges with 200.
#[derive(Debug, thiserror::Error)]
pub enum InboxServiceError {
    #[error("account not found")]
    AccountNotFound,
    #[error("phone number not configured")]
    PhoneNotConfigured,
    #[error("conversation resolution failed")]
    ConversationResolutionFailed(#[source] anyhow::Error),
    #[error("message scope does not match conversation")]
    ScopeMismatch,
    #[error(transparent)]
    MalformedWebhookPayload(#[from] MalformedWebhookPayload),
    #[error("invalid webhook signature")]
    InvalidSignature,
    #[error("webhook verification failed")]
    VerificationFailed,
    #[error("conversation not found")]
    ConversationNotFound,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl InboxServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AccountNotFound => "ACCOUNT_NOT_FOUND",
            Self::PhoneNotConfigured => "PHONE_NOT_CONFIGURED",
            Self::ConversationResolutionFailed(_) => "CONVERSATION_RESOLUTION_FAILED",
            Self::ScopeMismatch => "SCOPE_MISMATCH",
            Self::MalformedWebhookPayload(_) => "MALFORMED_WEBHOOK_PAYLOAD",
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::VerificationFailed => "VERIFICATION_FAILED",
            Self::ConversationNotFound => "CONVERSATION_NOT_FOUND",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for InboxServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::AccountNotFound | Self::PhoneNotConfigured | Self::ConversationNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::ScopeMismatch | Self::MalformedWebhookPayload(_) => StatusCode::BAD_REQUEST,
            Self::InvalidSignature => StatusCode::UNAUTHORIZED,
            Self::VerificationFailed => StatusCode::FORBIDDEN,
            Self::ConversationResolutionFailed(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let internal = match &self {
            Self::ConversationResolutionFailed(e) | Self::Internal(e) => Some(e),
            _ => None,
        };
        error_response(status, self.kind(), self.to_string(), internal)
    }
}
