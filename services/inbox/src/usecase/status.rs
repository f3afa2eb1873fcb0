use uuid::Uuid;

use crate::domain::repository::MessageRepository;
use crate::domain::types::{Message, MessageDirection};
use crate::domain::webhook::StatusEvent;
use crate::error::InboxServiceError;

#[derive(Debug, Clone)]
pub enum StatusOutcome {
    /// The message moved forward; carries the updated record.
    Applied(Message),
    /// The message already holds this status or a later one.
    Stale(Message),
    /// No message with this external id in the account and phone number.
    Unknown,
}

/// Applies a delivery receipt to an outbound message.
pub struct ApplyStatusUseCase<M>
where
    M: MessageRepository,
{
    pub messages: M,
}

impl<M> ApplyStatusUseCase<M>
where
    M: MessageRepository,
{
    pub async fn execute(
        &self,
        account_id: Uuid,
        phone_number_id: &str,
        event: &StatusEvent,
    ) -> Result<StatusOutcome, InboxServiceError> {
        let Some(message) = self
            .messages
            .find_by_external_id(account_id, phone_number_id, &event.external_id)
            .await?
        else {
            tracing::debug!(
                %account_id,
                external_id = %event.external_id,
                "status for unknown message"
            );
            return Ok(StatusOutcome::Unknown);
        };

        if message.direction == MessageDirection::Inbound
            || !message.status.can_advance_to(event.status)
        {
            tracing::debug!(
                message_id = %message.id,
                current = %message.status,
                received = %event.status,
                "stale status ignored"
            );
            return Ok(StatusOutcome::Stale(message));
        }

        // The store re-checks the transition, so a concurrent receipt can still lose here.
        match self
            .messages
            .advance_status(message.id, event.status, event.error.as_deref())
            .await?
        {
            Some(updated) => Ok(StatusOutcome::Applied(updated)),
            None => Ok(StatusOutcome::Stale(message)),
        }
    }
}
