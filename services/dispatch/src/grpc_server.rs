use serde_json::Value;
use tonic::{Request, Response, Status};
use uuid::Uuid;

use relay_domain::event::EventType;
use relay_proto::dispatch::{
    Empty, PublishEventRequest, PublishEventResponse, RetryFailedResponse,
    dispatch_service_server::DispatchService,
};

use crate::error::DispatchServiceError;
use crate::state::AppState;
use crate::usecase::publish::PublishEventUseCase;

#[derive(Clone)]
pub struct DispatchGrpcServer {
    pub state: AppState,
}

#[tonic::async_trait]
impl DispatchService for DispatchGrpcServer {
    async fn publish_event(
        &self,
        request: Request<PublishEventRequest>,
    ) -> Result<Response<PublishEventResponse>, Status> {
        let req = request.into_inner();
        let account_id = req
            .account_id
            .parse::<Uuid>()
            .map_err(|_| Status::invalid_argument("invalid account_id"))?;
        let event_type = req
            .event_type
            .parse::<EventType>()
            .map_err(|e| DispatchServiceError::InvalidEvent(e.to_string()))?;
        let payload: Value = serde_json::from_str(&req.payload_json)
            .map_err(|e| DispatchServiceError::InvalidEvent(format!("payload_json: {e}")))?;

        let uc = PublishEventUseCase {
            repo: self.state.subscription_repo(),
        };
        let deliveries = uc.execute(account_id, event_type, &payload).await?;

        let launched = deliveries.len() as u32;
        for delivery in deliveries {
            let deliver = self.state.deliver_usecase();
            tokio::spawn(async move {
                deliver.execute(delivery).await;
            });
        }

        tracing::info!(%account_id, %event_type, deliveries = launched, "event published");
        Ok(Response::new(PublishEventResponse {
            deliveries: launched,
        }))
    }

    async fn retry_failed(
        &self,
        _request: Request<Empty>,
    ) -> Result<Response<RetryFailedResponse>, Status> {
        let summary = self.state.sweep_usecase().execute(None).await?;
        Ok(Response::new(RetryFailedResponse {
            picked: summary.picked,
            delivered: summary.delivered,
            failed: summary.failed,
        }))
    }
}
