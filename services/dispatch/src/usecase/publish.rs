use serde_json::Value;
use uuid::Uuid;

use relay_domain::event::EventType;

use crate::domain::repository::SubscriptionRepository;
use crate::domain::types::Delivery;
use crate::error::DispatchServiceError;

/// Expands an account event into one delivery per listening subscription.
pub struct PublishEventUseCase<S: SubscriptionRepository> {
    pub repo: S,
}

impl<S: SubscriptionRepository> PublishEventUseCase<S> {
    pub async fn execute(
        &self,
        account_id: Uuid,
        event_type: EventType,
        payload: &Value,
    ) -> Result<Vec<Delivery>, DispatchServiceError> {
        let deliveries: Vec<Delivery> = self
            .repo
            .list_active(account_id)
            .await?
            .into_iter()
            .filter(|s| s.account_id == account_id && s.listens_to(event_type))
            .map(|s| Delivery {
                account_id,
                subscription_id: Some(s.id),
                url: s.url,
                event_type,
                payload: payload.clone(),
            })
            .collect();
        tracing::debug!(
            %account_id,
            %event_type,
            deliveries = deliveries.len(),
            "event matched subscriptions"
        );
        Ok(deliveries)
    }
}
