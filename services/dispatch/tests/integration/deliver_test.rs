use std::time::Duration;

use tokio::time::Instant;
use uuid::Uuid;

use relay_dispatch::domain::repository::TransportError;
use relay_dispatch::domain::retry::{MAX_JITTER, RetryPolicy};
use relay_dispatch::domain::types::{
    DeliveryError, DeliveryOutcome, DeliveryStatus, FailureKind,
};

use crate::helpers::{HOOK_URL, MemoryLogStore, ScriptedTransport, deliver_uc, delivery};

const TIMEOUT: TransportError = TransportError::Timeout(Duration::from_secs(10));

#[tokio::test(start_paused = true)]
async fn should_deliver_on_first_2xx_without_waiting() {
    let logs = MemoryLogStore::default();
    let transport = ScriptedTransport::always(Ok(204));
    let start = Instant::now();

    let result = deliver_uc(&logs, &transport)
        .execute(delivery(Uuid::new_v4()))
        .await;

    assert!(result.success);
    assert_eq!(result.attempts, 1);
    assert_eq!(result.status_code, Some(204));
    assert_eq!(result.outcome, DeliveryOutcome::Delivered);
    assert_eq!(result.error, None);
    assert_eq!(start.elapsed(), Duration::ZERO);

    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].url, HOOK_URL);
    assert_eq!(calls[0].timeout, Duration::from_secs(10));

    let log = &logs.logs()[0];
    assert_eq!(log.status, DeliveryStatus::Delivered);
    assert_eq!(log.attempts, 1);
    assert_eq!(log.last_status_code, Some(204));
    assert!(log.delivered_at.is_some());
}

#[tokio::test(start_paused = true)]
async fn should_stop_after_one_attempt_when_endpoint_is_gone() {
    let logs = MemoryLogStore::default();
    let transport = ScriptedTransport::always(Ok(410));

    let result = deliver_uc(&logs, &transport)
        .execute(delivery(Uuid::new_v4()))
        .await;

    assert!(!result.success);
    assert_eq!(result.attempts, 1);
    assert_eq!(result.outcome, DeliveryOutcome::PermanentFailure);
    assert_eq!(result.error, Some(DeliveryError::Permanent(410)));
    assert_eq!(transport.calls().len(), 1);

    let log = &logs.logs()[0];
    assert_eq!(log.status, DeliveryStatus::Failed);
    assert_eq!(log.failure_kind, Some(FailureKind::Permanent));
    assert_eq!(log.attempts, 1);
    assert_eq!(log.last_status_code, Some(410));
}

#[tokio::test(start_paused = true)]
async fn should_not_retry_auth_failures() {
    for status in [401, 403] {
        let logs = MemoryLogStore::default();
        let transport = ScriptedTransport::always(Ok(status));

        let result = deliver_uc(&logs, &transport)
            .execute(delivery(Uuid::new_v4()))
            .await;

        assert_eq!(result.outcome, DeliveryOutcome::PermanentFailure, "{status}");
        assert_eq!(result.attempts, 1, "{status}");
    }
}

#[tokio::test(start_paused = true)]
async fn should_exhaust_after_max_retries_on_timeouts() {
    let logs = MemoryLogStore::default();
    let transport = ScriptedTransport::always(Err(TIMEOUT));
    let policy = RetryPolicy::default();

    let result = deliver_uc(&logs, &transport)
        .execute(delivery(Uuid::new_v4()))
        .await;

    assert!(!result.success);
    assert_eq!(result.attempts, policy.max_retries);
    assert_eq!(result.outcome, DeliveryOutcome::ExhaustedFailure);
    assert_eq!(result.status_code, None);
    assert_eq!(
        result.error,
        Some(DeliveryError::Exhausted {
            attempts: 5,
            last: "timed out after 10s".to_owned(),
        })
    );
    assert_eq!(transport.calls().len(), policy.max_retries as usize);

    let log = &logs.logs()[0];
    assert_eq!(log.attempts, policy.max_retries);
    assert_eq!(log.status, DeliveryStatus::Failed);
    assert_eq!(log.failure_kind, Some(FailureKind::Exhausted));
}

#[tokio::test(start_paused = true)]
async fn should_double_backoff_between_attempts_with_bounded_jitter() {
    let logs = MemoryLogStore::default();
    let transport = ScriptedTransport::always(Ok(503));
    let policy = RetryPolicy::default();

    deliver_uc(&logs, &transport)
        .execute(delivery(Uuid::new_v4()))
        .await;

    let calls = transport.calls();
    assert_eq!(calls.len(), 5);
    for (retry, pair) in calls.windows(2).enumerate() {
        let gap = pair[1].at - pair[0].at;
        let base = policy.backoff(retry as u32);
        assert!(gap >= base, "retry {retry}: {gap:?} < {base:?}");
        assert!(gap <= base + MAX_JITTER, "retry {retry}: {gap:?} too long");
    }
}

#[tokio::test(start_paused = true)]
async fn should_recover_after_transient_failures() {
    let logs = MemoryLogStore::default();
    let transport = ScriptedTransport::sequence(
        vec![
            Ok(503),
            Err(TransportError::Network("connection reset".to_owned())),
        ],
        Ok(200),
    );

    let result = deliver_uc(&logs, &transport)
        .execute(delivery(Uuid::new_v4()))
        .await;

    assert!(result.success);
    assert_eq!(result.attempts, 3);

    let history = logs.history();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].status, DeliveryStatus::Pending);
    assert_eq!(history[0].failure_kind, Some(FailureKind::Transient));
    assert_eq!(history[0].status_code, Some(503));
    assert_eq!(history[0].error.as_deref(), Some("HTTP 503"));
    assert_eq!(history[1].status_code, None);
    assert_eq!(history[1].error.as_deref(), Some("connection reset"));
    assert_eq!(history[2].status, DeliveryStatus::Delivered);
    assert_eq!(history[2].attempts, 3);
}

#[tokio::test(start_paused = true)]
async fn should_deliver_even_when_log_writes_fail() {
    let logs = MemoryLogStore::failing();
    let transport = ScriptedTransport::sequence(vec![Ok(500)], Ok(200));

    let result = deliver_uc(&logs, &transport)
        .execute(delivery(Uuid::new_v4()))
        .await;

    assert!(result.success);
    assert_eq!(result.attempts, 2);
    assert!(logs.logs().is_empty());
}

#[tokio::test(start_paused = true)]
async fn should_respect_configured_ceiling() {
    let logs = MemoryLogStore::default();
    let transport = ScriptedTransport::always(Ok(500));
    let uc = relay_dispatch::usecase::deliver::DeliverWebhookUseCase {
        logs: logs.clone(),
        transport: transport.clone(),
        policy: RetryPolicy {
            max_retries: 2,
            initial_delay: Duration::from_millis(10),
            ..RetryPolicy::default()
        },
    };

    let result = uc.execute(delivery(Uuid::new_v4())).await;

    assert_eq!(result.attempts, 2);
    assert_eq!(result.status_code, Some(500));
    assert_eq!(transport.calls().len(), 2);
    assert_eq!(
        result.error.map(|e| e.to_string()).as_deref(),
        Some("gave up after 2 attempts: HTTP 500")
    );
}
