use chrono::Utc;
use uuid::Uuid;

use relay_dispatch::error::DispatchServiceError;
use relay_dispatch::usecase::subscription::{
    CreateSubscriptionUseCase, DeleteSubscriptionUseCase, ListLogsUseCase,
    ListSubscriptionsUseCase,
};
use relay_domain::id::SubscriptionId;
use relay_domain::pagination::PageRequest;

use crate::helpers::{MemoryLogStore, MemorySubscriptionStore};

fn events(list: &[&str]) -> Vec<String> {
    list.iter().map(|e| (*e).to_owned()).collect()
}

#[tokio::test]
async fn should_create_and_list_subscription() {
    let store = MemorySubscriptionStore::default();
    let account = Uuid::new_v4();

    let created = CreateSubscriptionUseCase { repo: store.clone() }
        .execute(
            account,
            "https://hooks.example.com/relay",
            &events(&["message.received", "conversation.created"]),
        )
        .await
        .unwrap();
    let listed = ListSubscriptionsUseCase { repo: store.clone() }
        .execute(account)
        .await
        .unwrap();

    assert!(created.is_active);
    assert_eq!(created.account_id, account);
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, created.id);
    assert_eq!(listed[0].events, events(&["message.received", "conversation.created"]));
}

#[tokio::test]
async fn should_reject_relative_url_without_storing() {
    let store = MemorySubscriptionStore::default();

    let result = CreateSubscriptionUseCase { repo: store.clone() }
        .execute(Uuid::new_v4(), "/relay", &events(&["*"]))
        .await;

    assert!(matches!(
        result,
        Err(DispatchServiceError::InvalidSubscription(_))
    ));
    assert!(store.all().is_empty());
}

#[tokio::test]
async fn should_reject_unknown_event_type() {
    let store = MemorySubscriptionStore::default();

    let result = CreateSubscriptionUseCase { repo: store.clone() }
        .execute(
            Uuid::new_v4(),
            "https://hooks.example.com/relay",
            &events(&["message.deleted"]),
        )
        .await;

    assert!(matches!(
        result,
        Err(DispatchServiceError::InvalidSubscription(_))
    ));
}

#[tokio::test]
async fn should_deactivate_own_subscription_once() {
    let store = MemorySubscriptionStore::default();
    let account = Uuid::new_v4();
    let id = store.add(account, "https://hooks.example.com/relay", &["*"], true);
    let uc = DeleteSubscriptionUseCase { repo: store.clone() };

    uc.execute(account, SubscriptionId(id)).await.unwrap();
    let again = uc.execute(account, SubscriptionId(id)).await;

    assert!(matches!(again, Err(DispatchServiceError::SubscriptionNotFound)));
    assert!(!store.all()[0].is_active);
}

#[tokio::test]
async fn should_not_delete_subscription_of_another_account() {
    let store = MemorySubscriptionStore::default();
    let id = store.add(Uuid::new_v4(), "https://hooks.example.com/relay", &["*"], true);

    let result = DeleteSubscriptionUseCase { repo: store.clone() }
        .execute(Uuid::new_v4(), SubscriptionId(id))
        .await;

    assert!(matches!(result, Err(DispatchServiceError::SubscriptionNotFound)));
    assert!(store.all()[0].is_active);
}

#[tokio::test]
async fn should_list_only_own_logs() {
    let logs = MemoryLogStore::default();
    let mine = Uuid::new_v4();
    logs.seed_failed(mine, 1, Utc::now());
    logs.seed_failed(mine, 2, Utc::now());
    logs.seed_failed(Uuid::new_v4(), 1, Utc::now());

    let listed = ListLogsUseCase { repo: logs.clone() }
        .execute(mine, PageRequest::default())
        .await
        .unwrap();

    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|l| l.account_id == mine));
}
