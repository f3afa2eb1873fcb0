use chrono::{DateTime, Duration, TimeDelta, Utc};
use futures::future::join_all;
use uuid::Uuid;

use crate::domain::repository::{WebhookLogRepository, WebhookTransport};
use crate::domain::types::{RetryClaim, SweepSummary};
use crate::error::DispatchServiceError;
use crate::usecase::deliver::DeliverWebhookUseCase;

/// Failed deliveries older than this are left alone.
pub const RETRY_WINDOW_HOURS: i64 = 24;
/// Rows claimed per sweep.
pub const SWEEP_BATCH: u64 = 100;

/// Re-attempts failed deliveries that are still inside the retry window and
/// below the attempt ceiling. Attempts keep counting on the same log row.
pub struct RetryFailedWebhooksUseCase<L, T>
where
    L: WebhookLogRepository,
    T: WebhookTransport,
{
    pub logs: L,
    pub deliver: DeliverWebhookUseCase<L, T>,
}

impl<L, T> RetryFailedWebhooksUseCase<L, T>
where
    L: WebhookLogRepository,
    T: WebhookTransport,
{
    /// `account_id = None` sweeps every account. Besides failed rows this takes
    /// over `pending` rows whose run went quiet for longer than the policy lease.
    pub async fn execute(
        &self,
        account_id: Option<Uuid>,
    ) -> Result<SweepSummary, DispatchServiceError> {
        let now = Utc::now();
        let policy = self.deliver.policy;
        let lease = TimeDelta::from_std(policy.lease()).unwrap_or(TimeDelta::MAX);
        let claim = RetryClaim {
            account_id,
            created_after: now - Duration::hours(RETRY_WINDOW_HOURS),
            stalled_before: now.checked_sub_signed(lease).unwrap_or(DateTime::<Utc>::MIN_UTC),
            max_attempts: policy.max_retries,
            limit: SWEEP_BATCH,
        };
        let claimed = self.logs.claim_retryable(&claim).await?;
        if claimed.is_empty() {
            tracing::debug!("no failed webhooks to retry");
            return Ok(SweepSummary::default());
        }

        let results = join_all(claimed.iter().map(|log| self.deliver.resume(log))).await;
        let picked = claimed.len() as u32;
        let delivered = results.iter().filter(|r| r.success).count() as u32;
        let summary = SweepSummary {
            picked,
            delivered,
            failed: picked - delivered,
        };
        tracing::info!(
            picked = summary.picked,
            delivered = summary.delivered,
            failed = summary.failed,
            "failed webhooks retried"
        );
        Ok(summary)
    }
}
