use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use relay_core::error::error_response;

/// Dispatch service error variants.
///
/// Delivery failures are not errors: they are carried in `DeliveryResult`.
#[derive(Debug, thiserror::Error)]
pub enum DispatchServiceError {
    #[error("subscription not found")]
    SubscriptionNotFound,
    #[error("invalid subscription: {0}")]
    InvalidSubscription(String),
    #[error("invalid event: {0}")]
    InvalidEvent(String),
    #[error("forbidden")]
    Forbidden,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl DispatchServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SubscriptionNotFound => "SUBSCRIPTION_NOT_FOUND",
            Self::InvalidSubscription(_) => "INVALID_SUBSCRIPTION",
            Self::InvalidEvent(_) => "INVALID_EVENT",
            Self::Forbidden => "FORBIDDEN",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for DispatchServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::SubscriptionNotFound => StatusCode::NOT_FOUND,
            Self::InvalidSubscription(_) | Self::InvalidEvent(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let internal = match &self {
            Self::Internal(e) => Some(e),
            _ => None,
        };
        error_response(status, self.kind(), self.to_string(), internal)
    }
}

impl From<DispatchServiceError> for tonic::Status {
    fn from(e: DispatchServiceError) -> Self {
        match e {
            DispatchServiceError::SubscriptionNotFound => Self::not_found(e.to_string()),
            DispatchServiceError::InvalidSubscription(_) | DispatchServiceError::InvalidEvent(_) => {
                Self::invalid_argument(e.to_string())
            }
            DispatchServiceError::Forbidden => Self::permission_denied(e.to_string()),
            DispatchServiceError::Internal(ref source) => {
                tracing::error!(error = ?source, kind = e.kind(), "internal error");
                Self::internal(e.to_string())
            }
        }
    }
}
