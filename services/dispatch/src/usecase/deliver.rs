use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::{WebhookLogRepository, WebhookTransport};
use crate::domain::retry::{ResponseClass, RetryPolicy, classify_status};
use crate::domain::types::{
    AttemptRecord, Delivery, DeliveryError, DeliveryOutcome, DeliveryResult, DeliveryStatus,
    FailureKind, WebhookLog,
};

/// Delivers one webhook with retries and keeps its log row current.
///
/// Attempt `n` (1-based) is preceded by a sleep of
/// `initial_delay * 2^(n - 2) + jitter` for every `n > 1` sent in the same run.
/// The run stops at the first 2xx, at 401/403/410, or once the log holds
/// `max_retries` attempts. Log write failures are reported and do not stop
/// the run.
pub struct DeliverWebhookUseCase<L, T>
where
    L: WebhookLogRepository,
    T: WebhookTransport,
{
    pub logs: L,
    pub transport: T,
    pub policy: RetryPolicy,
}

impl<L, T> DeliverWebhookUseCase<L, T>
where
    L: WebhookLogRepository,
    T: WebhookTransport,
{
    /// Log a new delivery and send it until it settles.
    pub async fn execute(&self, delivery: Delivery) -> DeliveryResult {
        let log_id = match self.logs.create(&delivery).await {
            Ok(log) => Some(log.id),
            Err(e) => {
                tracing::error!(
                    account_id = %delivery.account_id,
                    url = %delivery.url,
                    error = ?e,
                    "webhook log insert failed; delivering without audit row"
                );
                None
            }
        };
        self.run(log_id, &delivery, 0).await
    }

    /// Continue a logged delivery from the attempts it already used.
    pub async fn resume(&self, log: &WebhookLog) -> DeliveryResult {
        self.run(Some(log.id), &log.delivery(), log.attempts).await
    }

    async fn run(
        &self,
        log_id: Option<Uuid>,
        delivery: &Delivery,
        prior_attempts: u32,
    ) -> DeliveryResult {
        let mut attempts = prior_attempts;
        let mut last_status: Option<u16> = None;
        let mut last_error: Option<DeliveryError> = None;

        loop {
            if !self.policy.allows_another_attempt(attempts) {
                let error = DeliveryError::Exhausted {
                    attempts,
                    last: last_error
                        .map(|e| e.to_string())
                        .unwrap_or_else(|| "retry limit reached".to_owned()),
                };
                tracing::warn!(
                    account_id = %delivery.account_id,
                    url = %delivery.url,
                    event_type = %delivery.event_type,
                    attempts,
                    error = %error,
                    "webhook delivery exhausted"
                );
                self.record(
                    log_id,
                    AttemptRecord {
                        attempts,
                        status: DeliveryStatus::Failed,
                        failure_kind: Some(FailureKind::Exhausted),
                        status_code: last_status,
                        error: Some(error.to_string()),
                        at: Utc::now(),
                    },
                )
                .await;
                return DeliveryResult {
                    success: false,
                    attempts,
                    status_code: last_status,
                    error: Some(error),
                    outcome: DeliveryOutcome::ExhaustedFailure,
                };
            }

            if attempts > prior_attempts {
                let delay = self.policy.delay_before_retry(attempts - 1);
                tracing::debug!(
                    url = %delivery.url,
                    attempt = attempts + 1,
                    delay_ms = delay.as_millis() as u64,
                    "webhook retry scheduled"
                );
                tokio::time::sleep(delay).await;
            }

            attempts += 1;
            let error = match self.transport.send(delivery, self.policy.timeout).await {
                Ok(status) => match classify_status(status) {
                    ResponseClass::Success => {
                        tracing::info!(
                            account_id = %delivery.account_id,
                            url = %delivery.url,
                            event_type = %delivery.event_type,
                            status,
                            attempts,
                            "webhook delivered"
                        );
                        let now = Utc::now();
                        self.record(
                            log_id,
                            AttemptRecord {
                                attempts,
                                status: DeliveryStatus::Delivered,
                                failure_kind: None,
                                status_code: Some(status),
                                error: None,
                                at: now,
                            },
                        )
                        .await;
                        return DeliveryResult {
                            success: true,
                            attempts,
                            status_code: Some(status),
                            error: None,
                            outcome: DeliveryOutcome::Delivered,
                        };
                    }
                    ResponseClass::Permanent => {
                        let error = DeliveryError::Permanent(status);
                        tracing::warn!(
                            account_id = %delivery.account_id,
                            url = %delivery.url,
                            status,
                            attempts,
                            "webhook rejected; not retrying"
                        );
                        self.record(
                            log_id,
                            AttemptRecord {
                                attempts,
                                status: DeliveryStatus::Failed,
                                failure_kind: Some(FailureKind::Permanent),
                                status_code: Some(status),
                                error: Some(error.to_string()),
                                at: Utc::now(),
                            },
                        )
                        .await;
                        return DeliveryResult {
                            success: false,
                            attempts,
                            status_code: Some(status),
                            error: Some(error),
                            outcome: DeliveryOutcome::PermanentFailure,
                        };
                    }
                    ResponseClass::Retryable => {
                        last_status = Some(status);
                        DeliveryError::Transient(format!("HTTP {status}"))
                    }
                },
                Err(e) => {
                    last_status = None;
                    DeliveryError::Transient(e.to_string())
                }
            };

            tracing::debug!(
                url = %delivery.url,
                attempts,
                error = %error,
                "webhook attempt failed"
            );
            if self.policy.allows_another_attempt(attempts) {
                self.record(
                    log_id,
                    AttemptRecord {
                        attempts,
                        status: DeliveryStatus::Pending,
                        failure_kind: Some(FailureKind::Transient),
                        status_code: last_status,
                        error: Some(error.to_string()),
                        at: Utc::now(),
                    },
                )
                .await;
            }
            last_error = Some(error);
        }
    }

    async fn record(&self, log_id: Option<Uuid>, record: AttemptRecord) {
        let Some(id) = log_id else {
            return;
        };
        if let Err(e) = self.logs.record_attempt(id, &record).await {
            tracing::error!(
                log_id = %id,
                attempts = record.attempts,
                status = %record.status,
                error = ?e,
                "webhook log update failed"
            );
        }
    }
}
