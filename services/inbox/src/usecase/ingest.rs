use std::time::Duration;

use serde::Serialize;
use serde_json::{Value, json};
use uuid::Uuid;

use relay_domain::event::EventType;
use relay_domain::id::ConversationId;

use crate::domain::repository::{
    AccountRepository, Broadcaster, ConversationRepository, EventPublisher, MessageRepository,
    PhoneNumberRepository,
};
use crate::domain::types::{MessageDirection, NewMessage, Recorded};
use crate::domain::webhook::{InboundMessageEvent, StatusEvent, WebhookEvent, parse_webhook};
use crate::error::InboxServiceError;
use crate::realtime::{MESSAGE_STATUS, NEW_MESSAGE};
use crate::usecase::record::RecordMessageUseCase;
use crate::usecase::resolve::{ResolveEntitiesUseCase, ResolveInput};
use crate::usecase::status::{ApplyStatusUseCase, StatusOutcome};

/// Total time the acknowledgement may wait on dispatch after the batch is recorded.
pub const PUBLISH_BUDGET: Duration = Duration::from_secs(3);

/// Processing summary returned to Meta with the 200 acknowledgement.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    pub malformed: bool,
    pub recorded: u32,
    pub duplicates: u32,
    pub statuses: u32,
    pub skipped: u32,
    pub errors: u32,
}

/// Event queued for dispatch once the whole body has been recorded.
struct Outbound {
    account_id: Uuid,
    event_type: EventType,
    payload: Value,
}

/// Drives one webhook body through resolution, recording and fan-out.
///
/// Every event is processed on its own: a failure is logged and counted and
/// the remaining events still run. Nothing here returns an error to the caller.
/// Dispatch events go out after the batch, bounded by [`PUBLISH_BUDGET`].
pub struct IngestWebhookUseCase<A, P, C, M, B, E>
where
    A: AccountRepository,
    P: PhoneNumberRepository,
    C: ConversationRepository,
    M: MessageRepository,
    B: Broadcaster,
    E: EventPublisher,
{
    pub resolver: ResolveEntitiesUseCase<A, P, C>,
    pub recorder: RecordMessageUseCase<M>,
    pub statuses: ApplyStatusUseCase<M>,
    pub broadcaster: B,
    pub publisher: E,
}

impl<A, P, C, M, B, E> IngestWebhookUseCase<A, P, C, M, B, E>
where
    A: AccountRepository,
    P: PhoneNumberRepository,
    C: ConversationRepository,
    M: MessageRepository,
    B: Broadcaster,
    E: EventPublisher,
{
    pub async fn execute(&self, body: &[u8]) -> IngestReport {
        let mut report = IngestReport::default();
        let mut outbound = Vec::new();

        let events = match parse_webhook(body) {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!(error = %e, bytes = body.len(), "malformed webhook payload");
                report.malformed = true;
                return report;
            }
        };

        for event in events {
            match event {
                WebhookEvent::Message(message) => match self.ingest_message(&message, &mut outbound).await {
                    Ok(Recorded::Created { .. }) => report.recorded += 1,
                    Ok(Recorded::Duplicate(_)) => report.duplicates += 1,
                    Err(e) => {
                        log_failure(&e, &message.waba_id, &message.phone_number_id);
                        report.errors += 1;
                    }
                },
                WebhookEvent::Status(status) => match self.ingest_status(&status, &mut outbound).await {
                    Ok(StatusOutcome::Applied(_)) => report.statuses += 1,
                    Ok(StatusOutcome::Stale(_) | StatusOutcome::Unknown) => report.skipped += 1,
                    Err(e) => {
                        log_failure(&e, &status.waba_id, &status.phone_number_id);
                        report.errors += 1;
                    }
                },
                WebhookEvent::Unsupported { waba_id, field } => {
                    tracing::info!(%waba_id, %field, "webhook change skipped");
                    report.skipped += 1;
                }
            }
        }

        tracing::info!(
            recorded = report.recorded,
            duplicates = report.duplicates,
            statuses = report.statuses,
            skipped = report.skipped,
            errors = report.errors,
            "webhook processed"
        );
        self.publish_all(outbound).await;
        report
    }

    async fn ingest_message(
        &self,
        event: &InboundMessageEvent,
        outbound: &mut Vec<Outbound>,
    ) -> Result<Recorded, InboxServiceError> {
        let resolution = self
            .resolver
            .execute(ResolveInput {
                waba_id: &event.waba_id,
                phone_number_id: &event.phone_number_id,
                customer_number: &event.customer_number,
                customer_name: event.customer_name.as_deref(),
                at: event.timestamp,
            })
            .await?;

        let recorded = self
            .recorder
            .execute(
                &resolution.conversation,
                NewMessage {
                    account_id: resolution.account.id,
                    phone_number_id: resolution.phone.phone_number_id.clone(),
                    direction: MessageDirection::Inbound,
                    message_type: event.message_type.clone(),
                    content: event.content.clone(),
                    external_id: event.external_id.clone(),
                    timestamp: event.timestamp,
                },
            )
            .await?;

        if let Recorded::Created {
            message,
            conversation,
        } = &recorded
        {
            let payload = json!({ "message": message, "conversation": conversation });
            let delivered =
                self.broadcaster
                    .broadcast(ConversationId(conversation.id), NEW_MESSAGE, &payload);
            tracing::debug!(
                conversation_id = %conversation.id,
                message_id = %message.id,
                delivered,
                "new message broadcast"
            );

            if resolution.created {
                outbound.push(Outbound {
                    account_id: conversation.account_id,
                    event_type: EventType::ConversationCreated,
                    payload: json!({ "conversation": conversation }),
                });
            }
            outbound.push(Outbound {
                account_id: conversation.account_id,
                event_type: EventType::MessageReceived,
                payload,
            });
        }
        Ok(recorded)
    }

    async fn ingest_status(
        &self,
        event: &StatusEvent,
        outbound: &mut Vec<Outbound>,
    ) -> Result<StatusOutcome, InboxServiceError> {
        let (account, phone) = self
            .resolver
            .resolve_phone(&event.waba_id, &event.phone_number_id)
            .await?;
        let outcome = self
            .statuses
            .execute(account.id, &phone.phone_number_id, event)
            .await?;

        if let StatusOutcome::Applied(message) = &outcome {
            let payload = json!({ "message": message });
            self.broadcaster.broadcast(
                ConversationId(message.conversation_id),
                MESSAGE_STATUS,
                &payload,
            );
            outbound.push(Outbound {
                account_id: account.id,
                event_type: EventType::MessageStatus,
                payload,
            });
        }
        Ok(outcome)
    }

    /// Hand queued events to the dispatcher in order. Whatever is still queued
    /// when the budget runs out is dropped so Meta gets its 200 in time.
    async fn publish_all(&self, outbound: Vec<Outbound>) {
        if outbound.is_empty() {
            return;
        }
        let total = outbound.len();
        let mut sent = 0usize;
        let publish = async {
            for event in &outbound {
                self.publish(event.account_id, event.event_type, &event.payload)
                    .await;
                sent += 1;
            }
        };
        if tokio::time::timeout(PUBLISH_BUDGET, publish).await.is_err() {
            tracing::warn!(
                total,
                dropped = total - sent,
                budget_ms = PUBLISH_BUDGET.as_millis() as u64,
                "dispatch too slow; remaining events dropped"
            );
        }
    }

    /// Failures only cost the subscriber delivery.
    async fn publish(&self, account_id: Uuid, event_type: EventType, payload: &Value) {
        match self.publisher.publish(account_id, event_type, payload).await {
            Ok(deliveries) => {
                tracing::debug!(%account_id, %event_type, deliveries, "event published");
            }
            Err(e) => {
                tracing::warn!(%account_id, %event_type, error = ?e, "event publish failed");
            }
        }
    }
}

fn log_failure(error: &InboxServiceError, waba_id: &str, phone_number_id: &str) {
    match error {
        InboxServiceError::AccountNotFound | InboxServiceError::PhoneNotConfigured => {
            tracing::warn!(
                kind = error.kind(),
                %waba_id,
                %phone_number_id,
                "webhook event not routable"
            );
        }
        InboxServiceError::ConversationResolutionFailed(source)
        | InboxServiceError::Internal(source) => {
            tracing::error!(
                kind = error.kind(),
                %waba_id,
                %phone_number_id,
                error = ?source,
                "webhook event failed"
            );
        }
        other => {
            tracing::error!(
                kind = other.kind(),
                %waba_id,
                %phone_number_id,
                "webhook event failed"
            );
        }
    }
}
