use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use relay_inbox::domain::types::{
    Conversation, MessageDirection, MessageStatus, NewMessage, Recorded,
};
use relay_inbox::error::InboxServiceError;
use relay_inbox::usecase::record::RecordMessageUseCase;
use relay_inbox::usecase::resolve::ResolveInput;

use crate::helpers::{CUSTOMER, MemoryStore, PHONE_NUMBER_ID, WABA_ID, resolver, seeded_store};

async fn open_conversation(store: &MemoryStore) -> Conversation {
    resolver(store)
        .execute(ResolveInput {
            waba_id: WABA_ID,
            phone_number_id: PHONE_NUMBER_ID,
            customer_number: CUSTOMER,
            customer_name: None,
            at: Utc::now(),
        })
        .await
        .unwrap()
        .conversation
}

fn inbound(conversation: &Conversation, external_id: &str) -> NewMessage {
    NewMessage {
        account_id: conversation.account_id,
        phone_number_id: conversation.phone_number_id.clone(),
        direction: MessageDirection::Inbound,
        message_type: "text".to_owned(),
        content: json!({ "body": "Olá" }),
        external_id: external_id.to_owned(),
        timestamp: Utc::now(),
    }
}

#[tokio::test]
async fn should_store_inbound_message_and_bump_unread() {
    let (store, _, _) = seeded_store();
    let conversation = open_conversation(&store).await;
    let uc = RecordMessageUseCase {
        messages: store.clone(),
    };

    let recorded = uc
        .execute(&conversation, inbound(&conversation, "wamid.1"))
        .await
        .unwrap();

    let Recorded::Created {
        message,
        conversation: updated,
    } = recorded
    else {
        panic!("expected a new message");
    };
    assert_eq!(message.conversation_id, conversation.id);
    assert_eq!(message.account_id, conversation.account_id);
    assert_eq!(message.workspace_id, conversation.workspace_id);
    assert_eq!(message.phone_number_id, PHONE_NUMBER_ID);
    assert_eq!(message.status, MessageStatus::Received);
    assert!(message.seq > 0);
    assert_eq!(updated.unread_count, 1);
}

#[tokio::test]
async fn should_dedupe_same_external_id() {
    let (store, _, _) = seeded_store();
    let conversation = open_conversation(&store).await;
    let uc = RecordMessageUseCase {
        messages: store.clone(),
    };

    let first = uc
        .execute(&conversation, inbound(&conversation, "wamid.dup"))
        .await
        .unwrap();
    let second = uc
        .execute(&conversation, inbound(&conversation, "wamid.dup"))
        .await
        .unwrap();

    assert!(matches!(first, Recorded::Created { .. }));
    let Recorded::Duplicate(existing) = second else {
        panic!("expected duplicate");
    };
    assert_eq!(existing.id, first.message().id);
    assert_eq!(store.messages().len(), 1);
    assert_eq!(store.conversations()[0].unread_count, 1);
}

#[tokio::test]
async fn should_not_count_outbound_as_unread() {
    let (store, _, _) = seeded_store();
    let conversation = open_conversation(&store).await;
    let uc = RecordMessageUseCase {
        messages: store.clone(),
    };

    let recorded = uc
        .execute(
            &conversation,
            NewMessage {
                direction: MessageDirection::Outbound,
                ..inbound(&conversation, "wamid.out")
            },
        )
        .await
        .unwrap();

    let Recorded::Created {
        message,
        conversation: updated,
    } = recorded
    else {
        panic!("expected a new message");
    };
    assert_eq!(message.status, MessageStatus::Sent);
    assert_eq!(updated.unread_count, 0);
}

#[tokio::test]
async fn should_reject_message_from_another_account() {
    let (store, _, _) = seeded_store();
    let conversation = open_conversation(&store).await;
    let uc = RecordMessageUseCase {
        messages: store.clone(),
    };

    let result = uc
        .execute(
            &conversation,
            NewMessage {
                account_id: Uuid::new_v4(),
                ..inbound(&conversation, "wamid.x")
            },
        )
        .await;

    assert!(
        matches!(result, Err(InboxServiceError::ScopeMismatch)),
        "expected ScopeMismatch, got {result:?}"
    );
    assert!(store.messages().is_empty());
}

#[tokio::test]
async fn should_reject_message_from_another_phone() {
    let (store, _, _) = seeded_store();
    let conversation = open_conversation(&store).await;
    let uc = RecordMessageUseCase {
        messages: store.clone(),
    };

    let result = uc
        .execute(
            &conversation,
            NewMessage {
                phone_number_id: "200000000000001".to_owned(),
                ..inbound(&conversation, "wamid.y")
            },
        )
        .await;

    assert!(matches!(result, Err(InboxServiceError::ScopeMismatch)));
    assert!(store.messages().is_empty());
}
