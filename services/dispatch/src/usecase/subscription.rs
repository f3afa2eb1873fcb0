use std::str::FromStr;

use reqwest::Url;
use uuid::Uuid;

use relay_domain::event::{ANY_EVENT, EventType};
use relay_domain::id::SubscriptionId;
use relay_domain::pagination::PageRequest;

use crate::domain::repository::{SubscriptionRepository, WebhookLogRepository};
use crate::domain::types::{NewSubscription, Subscription, WebhookLog};
use crate::error::DispatchServiceError;

/// Subscriber URLs must be absolute `http` or `https` URLs with a host.
pub fn validate_url(raw: &str) -> Result<String, DispatchServiceError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| DispatchServiceError::InvalidSubscription(format!("invalid url: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || !url.has_host() {
        return Err(DispatchServiceError::InvalidSubscription(
            "url must be an absolute http or https url".to_owned(),
        ));
    }
    Ok(url.into())
}

/// Non-empty list of known event types or `*`, deduplicated in input order.
pub fn validate_events(events: &[String]) -> Result<Vec<String>, DispatchServiceError> {
    if events.is_empty() {
        return Err(DispatchServiceError::InvalidSubscription(
            "events must not be empty".to_owned(),
        ));
    }
    let mut accepted: Vec<String> = Vec::with_capacity(events.len());
    for event in events {
        if event != ANY_EVENT {
            EventType::from_str(event)
                .map_err(|e| DispatchServiceError::InvalidSubscription(e.to_string()))?;
        }
        if !accepted.contains(event) {
            accepted.push(event.clone());
        }
    }
    Ok(accepted)
}

pub struct CreateSubscriptionUseCase<S: SubscriptionRepository> {
    pub repo: S,
}

impl<S: SubscriptionRepository> CreateSubscriptionUseCase<S> {
    pub async fn execute(
        &self,
        account_id: Uuid,
        url: &str,
        events: &[String],
    ) -> Result<Subscription, DispatchServiceError> {
        let new = NewSubscription {
            account_id,
            url: validate_url(url)?,
            events: validate_events(events)?,
        };
        let subscription = self.repo.create(new).await?;
        tracing::info!(
            %account_id,
            subscription_id = %subscription.id,
            url = %subscription.url,
            "webhook subscription created"
        );
        Ok(subscription)
    }
}

pub struct ListSubscriptionsUseCase<S: SubscriptionRepository> {
    pub repo: S,
}

impl<S: SubscriptionRepository> ListSubscriptionsUseCase<S> {
    pub async fn execute(&self, account_id: Uuid) -> Result<Vec<Subscription>, DispatchServiceError> {
        self.repo.list_active(account_id).await
    }
}

pub struct DeleteSubscriptionUseCase<S: SubscriptionRepository> {
    pub repo: S,
}

impl<S: SubscriptionRepository> DeleteSubscriptionUseCase<S> {
    pub async fn execute(
        &self,
        account_id: Uuid,
        id: SubscriptionId,
    ) -> Result<(), DispatchServiceError> {
        if !self.repo.deactivate(account_id, id).await? {
            return Err(DispatchServiceError::SubscriptionNotFound);
        }
        tracing::info!(%account_id, subscription_id = %id, "webhook subscription removed");
        Ok(())
    }
}

pub struct ListLogsUseCase<L: WebhookLogRepository> {
    pub repo: L,
}

impl<L: WebhookLogRepository> ListLogsUseCase<L> {
    pub async fn execute(
        &self,
        account_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<WebhookLog>, DispatchServiceError> {
        self.repo.list_by_account(account_id, page.clamped()).await
    }
}
