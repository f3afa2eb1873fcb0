use std::time::Duration;

use chrono::Utc;
use serde_json::json;

use relay_domain::event::EventType;
use relay_inbox::domain::types::MessageStatus;
use relay_inbox::realtime::{MESSAGE_STATUS, NEW_MESSAGE};
use relay_inbox::usecase::ingest::PUBLISH_BUDGET;
use relay_inbox::usecase::resolve::ResolveInput;
use relay_testing::fixture::Fixture;

use crate::helpers::{
    CUSTOMER, MockPublisher, PHONE_NUMBER_ID, RecordingBroadcaster, WABA_ID, ingest, resolver,
    seeded_store,
};

const INBOUND_TEXT: &str = "fixtures/meta/inbound_text.json";
const MIXED_BATCH: &str = "fixtures/meta/mixed_batch.json";

#[tokio::test]
async fn should_record_redelivered_webhook_once() {
    let (store, account, _) = seeded_store();
    let broadcaster = RecordingBroadcaster::default();
    let publisher = MockPublisher::default();
    let uc = ingest(&store, &broadcaster, &publisher);
    let body = Fixture::raw(INBOUND_TEXT);

    let first = uc.execute(body.as_bytes()).await;
    let second = uc.execute(body.as_bytes()).await;

    assert_eq!(first.recorded, 1);
    assert_eq!(first.errors, 0);
    assert_eq!(second.recorded, 0);
    assert_eq!(second.duplicates, 1);

    let conversations = store.conversations();
    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations[0].account_id, account.id);
    assert_eq!(conversations[0].customer_number, CUSTOMER);
    assert_eq!(conversations[0].customer_name.as_deref(), Some("Maria Souza"));
    assert_eq!(conversations[0].unread_count, 1);

    let messages = store.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].message_type, "text");
    assert_eq!(messages[0].content["body"], "Olá, meu pedido chegou?");

    let sent = broadcaster.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].event, NEW_MESSAGE);
    assert_eq!(sent[0].conversation_id.0, conversations[0].id);
    assert_eq!(sent[0].payload["message"]["externalId"], messages[0].external_id);

    assert_eq!(
        publisher.event_types(),
        vec![EventType::ConversationCreated, EventType::MessageReceived]
    );
}

#[tokio::test]
async fn should_route_every_event_of_a_mixed_batch() {
    let (store, _, _) = seeded_store();
    let existing = resolver(&store)
        .execute(ResolveInput {
            waba_id: WABA_ID,
            phone_number_id: PHONE_NUMBER_ID,
            customer_number: CUSTOMER,
            customer_name: None,
            at: Utc::now(),
        })
        .await
        .unwrap()
        .conversation;
    store.add_outbound(&existing, "wamid.OUTBOUND0002", MessageStatus::Sent);
    let broadcaster = RecordingBroadcaster::default();
    let publisher = MockPublisher::default();

    let report = ingest(&store, &broadcaster, &publisher)
        .execute(Fixture::raw(MIXED_BATCH).as_bytes())
        .await;

    assert!(!report.malformed);
    assert_eq!(report.recorded, 2);
    assert_eq!(report.statuses, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.errors, 0);

    let conversations = store.conversations();
    assert_eq!(conversations.len(), 2);
    assert!(conversations.iter().any(|c| c.id == existing.id));

    let failed = store
        .messages()
        .into_iter()
        .find(|m| m.external_id == "wamid.OUTBOUND0002")
        .unwrap();
    assert_eq!(failed.status, MessageStatus::Failed);
    assert_eq!(failed.error.as_deref(), Some("131047: Re-engagement message"));

    let events: Vec<_> = broadcaster.sent().into_iter().map(|b| b.event).collect();
    assert_eq!(events.iter().filter(|e| *e == NEW_MESSAGE).count(), 2);
    assert_eq!(events.iter().filter(|e| *e == MESSAGE_STATUS).count(), 1);

    let published = publisher.event_types();
    let created = published
        .iter()
        .filter(|t| **t == EventType::ConversationCreated)
        .count();
    assert_eq!(created, 1, "only the new customer opens a conversation");
    assert!(published.contains(&EventType::MessageStatus));
}

#[tokio::test]
async fn should_flag_malformed_payload_without_writing() {
    let (store, _, _) = seeded_store();
    let broadcaster = RecordingBroadcaster::default();
    let publisher = MockPublisher::default();

    let report = ingest(&store, &broadcaster, &publisher)
        .execute(b"{\"object\":\"whatsapp_business_account\",\"entry\":")
        .await;

    assert!(report.malformed);
    assert_eq!(report.recorded, 0);
    assert!(store.conversations().is_empty());
    assert!(broadcaster.sent().is_empty());
}

#[tokio::test]
async fn should_count_events_for_unknown_account_as_errors() {
    let (store, _, _) = seeded_store();
    let broadcaster = RecordingBroadcaster::default();
    let publisher = MockPublisher::default();
    let body = Fixture::raw(INBOUND_TEXT).replace(WABA_ID, "999999999999999");

    let report = ingest(&store, &broadcaster, &publisher)
        .execute(body.as_bytes())
        .await;

    assert_eq!(report.errors, 1);
    assert_eq!(report.recorded, 0);
    assert!(store.conversations().is_empty());
    assert!(publisher.event_types().is_empty());
}

#[tokio::test]
async fn should_keep_processing_after_a_failed_event() {
    let (store, _, _) = seeded_store();
    let broadcaster = RecordingBroadcaster::default();
    let publisher = MockPublisher::default();
    let message = |phone_number_id: &str, id: &str| {
        json!({
            "field": "messages",
            "value": {
                "metadata": { "display_phone_number": "15550001111", "phone_number_id": phone_number_id },
                "messages": [{ "from": CUSTOMER, "id": id, "timestamp": "1718000000", "type": "text", "text": { "body": "oi" } }]
            }
        })
    };
    let body = json!({
        "object": "whatsapp_business_account",
        "entry": [{
            "id": WABA_ID,
            "changes": [message("200000000000001", "wamid.LOST"), message(PHONE_NUMBER_ID, "wamid.KEPT")]
        }]
    });

    let report = ingest(&store, &broadcaster, &publisher)
        .execute(&serde_json::to_vec(&body).unwrap())
        .await;

    assert_eq!(report.errors, 1);
    assert_eq!(report.recorded, 1);
    let messages = store.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].external_id, "wamid.KEPT");
}

#[tokio::test]
async fn should_record_message_when_dispatch_is_down() {
    let (store, _, _) = seeded_store();
    let broadcaster = RecordingBroadcaster::default();
    let publisher = MockPublisher::failing();

    let report = ingest(&store, &broadcaster, &publisher)
        .execute(Fixture::raw(INBOUND_TEXT).as_bytes())
        .await;

    assert_eq!(report.recorded, 1);
    assert_eq!(report.errors, 0);
    assert_eq!(store.messages().len(), 1);
    assert_eq!(broadcaster.sent().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn should_acknowledge_when_dispatch_hangs() {
    let (store, _, _) = seeded_store();
    let broadcaster = RecordingBroadcaster::default();
    let publisher = MockPublisher::stalled();
    let uc = ingest(&store, &broadcaster, &publisher);
    let started = tokio::time::Instant::now();

    let report = tokio::time::timeout(
        Duration::from_secs(3600),
        uc.execute(Fixture::raw(INBOUND_TEXT).as_bytes()),
    )
    .await
    .expect("webhook must be acknowledged while dispatch hangs");

    assert_eq!(report.recorded, 1);
    assert_eq!(report.errors, 0);
    assert!(started.elapsed() <= PUBLISH_BUDGET + Duration::from_millis(10));
    assert_eq!(store.messages().len(), 1);
    assert_eq!(broadcaster.sent().len(), 1);
}

#[tokio::test]
async fn should_skip_status_for_unknown_message() {
    let (store, _, _) = seeded_store();
    let broadcaster = RecordingBroadcaster::default();
    let publisher = MockPublisher::default();

    let report = ingest(&store, &broadcaster, &publisher)
        .execute(Fixture::raw("fixtures/meta/status_delivered.json").as_bytes())
        .await;

    assert_eq!(report.statuses, 0);
    assert_eq!(report.skipped, 1);
    assert!(broadcaster.sent().is_empty());
    assert!(publisher.event_types().is_empty());
}
