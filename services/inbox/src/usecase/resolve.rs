use chrono::{DateTime, Utc};

use crate::domain::repository::{AccountRepository, ConversationRepository, PhoneNumberRepository};
use crate::domain::types::{Account, Conversation, ConversationKey, PhoneNumber};
use crate::error::InboxServiceError;

pub struct ResolveInput<'a> {
    pub waba_id: &'a str,
    pub phone_number_id: &'a str,
    pub customer_number: &'a str,
    pub customer_name: Option<&'a str>,
    /// Timestamp of the message that triggered resolution.
    pub at: DateTime<Utc>,
}

/// The entities an inbound message belongs to.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub account: Account,
    pub phone: PhoneNumber,
    pub conversation: Conversation,
    /// Whether the conversation was created by this resolution.
    pub created: bool,
}

/// Maps `(waba_id, phone_number_id, customer_number)` to the owning account,
/// phone number and conversation.
pub struct ResolveEntitiesUseCase<A, P, C>
where
    A: AccountRepository,
    P: PhoneNumberRepository,
    C: ConversationRepository,
{
    pub accounts: A,
    pub phones: P,
    pub conversations: C,
}

impl<A, P, C> ResolveEntitiesUseCase<A, P, C>
where
    A: AccountRepository,
    P: PhoneNumberRepository,
    C: ConversationRepository,
{
    pub async fn execute(&self, input: ResolveInput<'_>) -> Result<Resolution, InboxServiceError> {
        let (account, phone) = self
            .resolve_phone(input.waba_id, input.phone_number_id)
            .await?;

        // The workspace comes from the phone number, never from the account default.
        let key = ConversationKey {
            account_id: account.id,
            workspace_id: phone.workspace_id,
            phone_number_id: phone.phone_number_id.clone(),
            customer_number: input.customer_number.to_owned(),
        };
        let upserted = self
            .conversations
            .upsert(&key, input.customer_name, input.at)
            .await
            .map_err(|e| match e {
                InboxServiceError::Internal(source) => {
                    InboxServiceError::ConversationResolutionFailed(source)
                }
                other => other,
            })?;

        if upserted.created {
            tracing::info!(
                account_id = %account.id,
                conversation_id = %upserted.conversation.id,
                phone_number_id = %phone.phone_number_id,
                "conversation created"
            );
        }

        Ok(Resolution {
            account,
            phone,
            conversation: upserted.conversation,
            created: upserted.created,
        })
    }

    /// Account and active phone number, without touching conversations.
    pub async fn resolve_phone(
        &self,
        waba_id: &str,
        phone_number_id: &str,
    ) -> Result<(Account, PhoneNumber), InboxServiceError> {
        let account = self
            .accounts
            .find_active_by_waba_id(waba_id)
            .await?
            .ok_or(InboxServiceError::AccountNotFound)?;

        let phone = self
            .phones
            .find_active(account.id, phone_number_id)
            .await?
            .ok_or(InboxServiceError::PhoneNotConfigured)?;

        Ok((account, phone))
    }
}
