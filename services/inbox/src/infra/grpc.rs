use std::time::Duration;

use anyhow::Context as _;
use serde_json::Value;
use tonic::transport::{Channel, Endpoint};
use uuid::Uuid;

use relay_domain::event::EventType;
use relay_proto::dispatch::{PublishEventRequest, dispatch_service_client::DispatchServiceClient};

use crate::domain::repository::EventPublisher;
use crate::error::InboxServiceError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(1);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// gRPC client implementing `EventPublisher` via `relay.dispatch.DispatchService`.
#[derive(Clone)]
pub struct GrpcEventPublisher {
    client: DispatchServiceClient<Channel>,
}

impl GrpcEventPublisher {
    /// Create a client with lazy connection (connects on first RPC call), so
    /// the inbox starts even while dispatch is down. Connects and calls are
    /// time-bounded so an unreachable dispatch fails fast.
    pub fn lazy(url: &str) -> Result<Self, InboxServiceError> {
        let channel = Endpoint::from_shared(url.to_owned())
            .context("invalid dispatch gRPC url")?
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .connect_lazy();
        Ok(Self {
            client: DispatchServiceClient::new(channel),
        })
    }
}

impl EventPublisher for GrpcEventPublisher {
    async fn publish(
        &self,
        account_id: Uuid,
        event_type: EventType,
        payload: &Value,
    ) -> Result<u32, InboxServiceError> {
        let payload_json = serde_json::to_string(payload).context("encode event payload")?;
        let resp = self
            .client
            .clone()
            .publish_event(PublishEventRequest {
                account_id: account_id.to_string(),
                event_type: event_type.as_str().to_owned(),
                payload_json,
            })
            .await
            .context("gRPC PublishEvent")?;
        Ok(resp.into_inner().deliveries)
    }
}
