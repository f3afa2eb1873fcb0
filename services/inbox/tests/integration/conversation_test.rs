use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use relay_domain::pagination::PageRequest;
use relay_inbox::domain::types::{Conversation, MessageDirection, NewMessage};
use relay_inbox::error::InboxServiceError;
use relay_inbox::usecase::conversation::{
    GetConversationUseCase, ListConversationsUseCase, ListMessagesUseCase, MarkReadUseCase,
};
use relay_inbox::usecase::record::RecordMessageUseCase;
use relay_inbox::usecase::resolve::ResolveInput;

use crate::helpers::{
    CUSTOMER, MemoryStore, PHONE_NUMBER_ID, WABA_ID, resolver, seeded_store, test_account,
    test_phone,
};

const OTHER_WABA: &str = "555555555555555";
const OTHER_PHONE: &str = "300000000000003";

async fn open(store: &MemoryStore, waba_id: &str, phone_number_id: &str, customer: &str) -> Conversation {
    resolver(store)
        .execute(ResolveInput {
            waba_id,
            phone_number_id,
            customer_number: customer,
            customer_name: None,
            at: Utc::now(),
        })
        .await
        .unwrap()
        .conversation
}

/// Seeded store plus a second tenant that has one conversation of its own.
async fn two_tenants() -> (MemoryStore, Uuid, Conversation, Conversation) {
    let (store, account, _) = seeded_store();
    let other = test_account(OTHER_WABA);
    store.add_phone(test_phone(&other, OTHER_PHONE));
    store.add_account(other);

    let mine = open(&store, WABA_ID, PHONE_NUMBER_ID, CUSTOMER).await;
    let theirs = open(&store, OTHER_WABA, OTHER_PHONE, CUSTOMER).await;
    (store, account.id, mine, theirs)
}

#[tokio::test]
async fn should_list_only_own_conversations() {
    let (store, account_id, mine, _) = two_tenants().await;
    open(&store, WABA_ID, PHONE_NUMBER_ID, "5521912345678").await;

    let listed = ListConversationsUseCase { repo: store.clone() }
        .execute(account_id, PageRequest::default())
        .await
        .unwrap();

    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|c| c.account_id == account_id));
    assert!(listed.iter().any(|c| c.id == mine.id));
}

#[tokio::test]
async fn should_hide_conversation_of_another_account() {
    let (store, account_id, _, theirs) = two_tenants().await;

    let result = GetConversationUseCase { repo: store.clone() }
        .execute(account_id, theirs.id)
        .await;

    assert!(matches!(result, Err(InboxServiceError::ConversationNotFound)));
}

#[tokio::test]
async fn should_list_messages_in_timestamp_order() {
    let (store, account_id, mine, _) = two_tenants().await;
    let recorder = RecordMessageUseCase {
        messages: store.clone(),
    };
    let base = Utc::now();
    for (external_id, offset) in [("wamid.C", 30), ("wamid.A", 10), ("wamid.B", 20)] {
        recorder
            .execute(
                &mine,
                NewMessage {
                    account_id: mine.account_id,
                    phone_number_id: mine.phone_number_id.clone(),
                    direction: MessageDirection::Inbound,
                    message_type: "text".to_owned(),
                    content: json!({ "body": external_id }),
                    external_id: external_id.to_owned(),
                    timestamp: base + Duration::seconds(offset),
                },
            )
            .await
            .unwrap();
    }

    let messages = ListMessagesUseCase {
        conversations: store.clone(),
        messages: store.clone(),
    }
    .execute(account_id, mine.id, PageRequest::default())
    .await
    .unwrap();

    let ids: Vec<_> = messages.iter().map(|m| m.external_id.as_str()).collect();
    assert_eq!(ids, ["wamid.A", "wamid.B", "wamid.C"]);
}

#[tokio::test]
async fn should_refuse_messages_of_another_account() {
    let (store, account_id, _, theirs) = two_tenants().await;

    let result = ListMessagesUseCase {
        conversations: store.clone(),
        messages: store.clone(),
    }
    .execute(account_id, theirs.id, PageRequest::default())
    .await;

    assert!(matches!(result, Err(InboxServiceError::ConversationNotFound)));
}

#[tokio::test]
async fn should_reset_unread_count() {
    let (store, account_id, mine, _) = two_tenants().await;
    RecordMessageUseCase {
        messages: store.clone(),
    }
    .execute(
        &mine,
        NewMessage {
            account_id: mine.account_id,
            phone_number_id: mine.phone_number_id.clone(),
            direction: MessageDirection::Inbound,
            message_type: "text".to_owned(),
            content: json!({ "body": "oi" }),
            external_id: "wamid.U".to_owned(),
            timestamp: Utc::now(),
        },
    )
    .await
    .unwrap();

    let read = MarkReadUseCase { repo: store.clone() }
        .execute(account_id, mine.id)
        .await
        .unwrap();

    assert_eq!(read.unread_count, 0);
    assert!(store.conversations().iter().all(|c| c.unread_count == 0));
}
