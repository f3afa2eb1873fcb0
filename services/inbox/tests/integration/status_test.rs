use chrono::Utc;

use relay_inbox::domain::types::{Conversation, MessageStatus};
use relay_inbox::domain::webhook::StatusEvent;
use relay_inbox::usecase::resolve::ResolveInput;
use relay_inbox::usecase::status::{ApplyStatusUseCase, StatusOutcome};

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

fn receipt(external_id: &str, status: MessageStatus) -> StatusEvent {
    StatusEvent {
        waba_id: WABA_ID.to_owned(),
        phone_number_id: PHONE_NUMBER_ID.to_owned(),
        external_id: external_id.to_owned(),
        status,
        recipient_id: CUSTOMER.to_owned(),
        error: None,
        timestamp: Utc::now(),
    }
}

#[tokio::test]
async fn should_move_outbound_message_forward() {
    let (store, account, _) = seeded_store();
    let conversation = open_conversation(&store).await;
    store.add_outbound(&conversation, "wamid.OUT", MessageStatus::Sent);
    let uc = ApplyStatusUseCase {
        messages: store.clone(),
    };

    let delivered = uc
        .execute(
            account.id,
            PHONE_NUMBER_ID,
            &receipt("wamid.OUT", MessageStatus::Delivered),
        )
        .await
        .unwrap();
    let read = uc
        .execute(
            account.id,
            PHONE_NUMBER_ID,
            &receipt("wamid.OUT", MessageStatus::Read),
        )
        .await
        .unwrap();

    assert!(matches!(delivered, StatusOutcome::Applied(ref m) if m.status == MessageStatus::Delivered));
    assert!(matches!(read, StatusOutcome::Applied(ref m) if m.status == MessageStatus::Read));
}

#[tokio::test]
async fn should_ignore_receipt_arriving_after_a_later_one() {
    let (store, account, _) = seeded_store();
    let conversation = open_conversation(&store).await;
    store.add_outbound(&conversation, "wamid.OUT", MessageStatus::Read);
    let uc = ApplyStatusUseCase {
        messages: store.clone(),
    };

    let outcome = uc
        .execute(
            account.id,
            PHONE_NUMBER_ID,
            &receipt("wamid.OUT", MessageStatus::Delivered),
        )
        .await
        .unwrap();

    assert!(matches!(outcome, StatusOutcome::Stale(_)));
    assert_eq!(store.messages()[0].status, MessageStatus::Read);
}

#[tokio::test]
async fn should_record_failure_reason() {
    let (store, account, _) = seeded_store();
    let conversation = open_conversation(&store).await;
    store.add_outbound(&conversation, "wamid.OUT", MessageStatus::Sent);
    let uc = ApplyStatusUseCase {
        messages: store.clone(),
    };

    let outcome = uc
        .execute(
            account.id,
            PHONE_NUMBER_ID,
            &StatusEvent {
                error: Some("131047: Re-engagement message".to_owned()),
                ..receipt("wamid.OUT", MessageStatus::Failed)
            },
        )
        .await
        .unwrap();

    let StatusOutcome::Applied(message) = outcome else {
        panic!("expected failed status to apply");
    };
    assert_eq!(message.status, MessageStatus::Failed);
    assert_eq!(message.error.as_deref(), Some("131047: Re-engagement message"));
}

#[tokio::test]
async fn should_report_unknown_message() {
    let (store, account, _) = seeded_store();
    let uc = ApplyStatusUseCase {
        messages: store.clone(),
    };

    let outcome = uc
        .execute(
            account.id,
            PHONE_NUMBER_ID,
            &receipt("wamid.NOPE", MessageStatus::Delivered),
        )
        .await
        .unwrap();

    assert!(matches!(outcome, StatusOutcome::Unknown));
}

#[tokio::test]
async fn should_not_touch_message_of_another_phone() {
    let (store, account, _) = seeded_store();
    let conversation = open_conversation(&store).await;
    store.add_outbound(&conversation, "wamid.OUT", MessageStatus::Sent);
    let uc = ApplyStatusUseCase {
        messages: store.clone(),
    };

    let outcome = uc
        .execute(
            account.id,
            "200000000000001",
            &receipt("wamid.OUT", MessageStatus::Delivered),
        )
        .await
        .unwrap();

    assert!(matches!(outcome, StatusOutcome::Unknown));
    assert_eq!(store.messages()[0].status, MessageStatus::Sent);
}
