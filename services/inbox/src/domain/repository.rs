#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use relay_domain::event::EventType;
use relay_domain::id::ConversationId;
use relay_domain::pagination::PageRequest;

use crate::domain::types::{
    Account, Conversation, ConversationKey, Message, MessageStatus, PhoneNumber, Recorded,
    UpsertedConversation,
};
use crate::error::InboxServiceError;

/// Repository for tenant accounts.
pub trait AccountRepository: Send + Sync {
    /// Active account owning the WABA, if any.
    async fn find_active_by_waba_id(
        &self,
        waba_id: &str,
    ) -> Result<Option<Account>, InboxServiceError>;
}

/// Repository for connected phone numbers.
pub trait PhoneNumberRepository: Send + Sync {
    /// The active phone number `phone_number_id` of `account_id`. Never returns
    /// another phone of the same account.
    async fn find_active(
        &self,
        account_id: Uuid,
        phone_number_id: &str,
    ) -> Result<Option<PhoneNumber>, InboxServiceError>;
}

/// Repository for conversations.
pub trait ConversationRepository: Send + Sync {
    /// Atomically create or touch the conversation identified by `key`.
    ///
    /// An existing row gets `status = open`, `last_message_at` moved forward to
    /// `at` and `customer_name` refreshed when one is given.
    async fn upsert(
        &self,
        key: &ConversationKey,
        customer_name: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<UpsertedConversation, InboxServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Conversation>, InboxServiceError>;

    /// Conversations of an account, most recent activity first.
    async fn list_by_account(
        &self,
        account_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Conversation>, InboxServiceError>;

    /// Reset `unread_count`. Returns the updated conversation.
    async fn mark_read(&self, id: Uuid) -> Result<Option<Conversation>, InboxServiceError>;
}

/// Repository for messages.
pub trait MessageRepository: Send + Sync {
    /// Insert `message` unless `(conversation_id, external_id)` already exists.
    ///
    /// A new row bumps the conversation's `unread_count` by `unread_increment`
    /// and its `last_message_at` in the same transaction. An existing row is
    /// returned untouched as [`Recorded::Duplicate`].
    async fn insert_dedup(
        &self,
        message: &Message,
        unread_increment: i32,
    ) -> Result<Recorded, InboxServiceError>;

    async fn find_by_external_id(
        &self,
        account_id: Uuid,
        phone_number_id: &str,
        external_id: &str,
    ) -> Result<Option<Message>, InboxServiceError>;

    /// Set `status` only if the stored status is one it may follow.
    /// Returns the updated message, or `None` when the receipt is stale.
    async fn advance_status(
        &self,
        id: Uuid,
        status: MessageStatus,
        error: Option<&str>,
    ) -> Result<Option<Message>, InboxServiceError>;

    /// Messages of a conversation ordered by `timestamp`, then `seq`.
    async fn list_by_conversation(
        &self,
        conversation_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Message>, InboxServiceError>;
}

/// Port for handing events to the dispatch service.
pub trait EventPublisher: Send + Sync {
    /// Returns the number of deliveries the dispatcher launched.
    async fn publish(
        &self,
        account_id: Uuid,
        event_type: EventType,
        payload: &Value,
    ) -> Result<u32, InboxServiceError>;
}

/// Fan-out of realtime events to the members of a conversation room.
pub trait Broadcaster: Send + Sync {
    /// Send `event` to every client currently in the conversation's room.
    /// Returns how many clients it was handed to.
    fn broadcast(&self, conversation_id: ConversationId, event: &str, payload: &Value) -> usize;
}
