use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::MessageRepository;
use crate::domain::types::{
    Conversation, Message, MessageDirection, MessageStatus, NewMessage, Recorded,
};
use crate::error::InboxServiceError;

/// Persists a message into an already resolved conversation.
pub struct RecordMessageUseCase<M>
where
    M: MessageRepository,
{
    pub messages: M,
}

impl<M> RecordMessageUseCase<M>
where
    M: MessageRepository,
{
    pub async fn execute(
        &self,
        conversation: &Conversation,
        input: NewMessage,
    ) -> Result<Recorded, InboxServiceError> {
        if input.account_id != conversation.account_id
            || input.phone_number_id != conversation.phone_number_id
        {
            tracing::error!(
                conversation_id = %conversation.id,
                conversation_account_id = %conversation.account_id,
                message_account_id = %input.account_id,
                conversation_phone = %conversation.phone_number_id,
                message_phone = %input.phone_number_id,
                "message scope does not match conversation"
            );
            return Err(InboxServiceError::ScopeMismatch);
        }

        let (status, unread_increment) = match input.direction {
            MessageDirection::Inbound => (MessageStatus::Received, 1),
            MessageDirection::Outbound => (MessageStatus::Sent, 0),
        };
        let now = Utc::now();
        let message = Message {
            id: Uuid::now_v7(),
            seq: 0,
            conversation_id: conversation.id,
            account_id: conversation.account_id,
            workspace_id: conversation.workspace_id,
            phone_number_id: conversation.phone_number_id.clone(),
            direction: input.direction,
            message_type: input.message_type,
            content: input.content,
            external_id: input.external_id,
            status,
            error: None,
            timestamp: input.timestamp,
            created_at: now,
            updated_at: now,
        };

        let recorded = self.messages.insert_dedup(&message, unread_increment).await?;
        if let Recorded::Duplicate(existing) = &recorded {
            tracing::debug!(
                conversation_id = %conversation.id,
                external_id = %existing.external_id,
                "duplicate message ignored"
            );
        }
        Ok(recorded)
    }
}
