#![allow(async_fn_in_trait)]

use std::time::Duration;

use uuid::Uuid;

use relay_domain::id::SubscriptionId;
use relay_domain::pagination::PageRequest;

use crate::domain::types::{
    AttemptRecord, Delivery, NewSubscription, RetryClaim, Subscription, WebhookLog,
};
use crate::error::DispatchServiceError;

/// Repository for tenant webhook subscriptions.
pub trait SubscriptionRepository: Send + Sync {
    async fn create(&self, new: NewSubscription) -> Result<Subscription, DispatchServiceError>;

    /// Active subscriptions of the account, newest first.
    async fn list_active(&self, account_id: Uuid)
    -> Result<Vec<Subscription>, DispatchServiceError>;

    /// Returns `false` when the account has no such active subscription.
    async fn deactivate(
        &self,
        account_id: Uuid,
        id: SubscriptionId,
    ) -> Result<bool, DispatchServiceError>;
}

/// Repository for delivery audit rows.
pub trait WebhookLogRepository: Send + Sync {
    /// Insert a `pending` row with zero attempts.
    async fn create(&self, delivery: &Delivery) -> Result<WebhookLog, DispatchServiceError>;

    async fn record_attempt(
        &self,
        id: Uuid,
        record: &AttemptRecord,
    ) -> Result<(), DispatchServiceError>;

    /// Atomically move up to `limit` rows matching `claim` to `pending` and
    /// return them. Matches `failed` rows and `pending` rows whose run stopped
    /// writing before `stalled_before`. A row is handed to one caller only.
    async fn claim_retryable(
        &self,
        claim: &RetryClaim,
    ) -> Result<Vec<WebhookLog>, DispatchServiceError>;

    /// Logs of the account, newest first.
    async fn list_by_account(
        &self,
        account_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<WebhookLog>, DispatchServiceError>;
}

/// Why a send produced no HTTP status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("{0}")]
    Network(String),
}

/// Sends one webhook POST and reports the subscriber's status code.
pub trait WebhookTransport: Send + Sync {
    async fn send(&self, delivery: &Delivery, timeout: Duration) -> Result<u16, TransportError>;
}
