use uuid::Uuid;

use relay_domain::pagination::PageRequest;

use crate::domain::repository::{ConversationRepository, MessageRepository};
use crate::domain::types::{Conversation, Message};
use crate::error::InboxServiceError;

/// Load a conversation of `account_id`. Another account's conversation is
/// reported as not found so ids do not leak across tenants.
async fn find_scoped<C: ConversationRepository>(
    repo: &C,
    account_id: Uuid,
    id: Uuid,
) -> Result<Conversation, InboxServiceError> {
    repo.find_by_id(id)
        .await?
        .filter(|c| c.account_id == account_id)
        .ok_or(InboxServiceError::ConversationNotFound)
}

pub struct ListConversationsUseCase<C: ConversationRepository> {
    pub repo: C,
}

impl<C: ConversationRepository> ListConversationsUseCase<C> {
    pub async fn execute(
        &self,
        account_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Conversation>, InboxServiceError> {
        self.repo.list_by_account(account_id, page.clamped()).await
    }
}

pub struct GetConversationUseCase<C: ConversationRepository> {
    pub repo: C,
}

impl<C: ConversationRepository> GetConversationUseCase<C> {
    pub async fn execute(
        &self,
        account_id: Uuid,
        id: Uuid,
    ) -> Result<Conversation, InboxServiceError> {
        find_scoped(&self.repo, account_id, id).await
    }
}

pub struct ListMessagesUseCase<C, M>
where
    C: ConversationRepository,
    M: MessageRepository,
{
    pub conversations: C,
    pub messages: M,
}

impl<C, M> ListMessagesUseCase<C, M>
where
    C: ConversationRepository,
    M: MessageRepository,
{
    pub async fn execute(
        &self,
        account_id: Uuid,
        conversation_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Message>, InboxServiceError> {
        let conversation = find_scoped(&self.conversations, account_id, conversation_id).await?;
        self.messages
            .list_by_conversation(conversation.id, page.clamped())
            .await
    }
}

pub struct MarkReadUseCase<C: ConversationRepository> {
    pub repo: C,
}

impl<C: ConversationRepository> MarkReadUseCase<C> {
    pub async fn execute(
        &self,
        account_id: Uuid,
        id: Uuid,
    ) -> Result<Conversation, InboxServiceError> {
        let conversation = find_scoped(&self.repo, account_id, id).await?;
        self.repo
            .mark_read(conversation.id)
            .await?
            .ok_or(InboxServiceError::ConversationNotFound)
    }
}
