use sea_orm::DatabaseConnection;

use crate::domain::retry::RetryPolicy;
use crate::infra::db::{DbSubscriptionRepository, DbWebhookLogRepository};
use crate::infra::http::ReqwestTransport;
use crate::usecase::deliver::DeliverWebhookUseCase;
use crate::usecase::sweep::RetryFailedWebhooksUseCase;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub transport: ReqwestTransport,
    pub policy: RetryPolicy,
}

pub type DbDeliverWebhookUseCase = DeliverWebhookUseCase<DbWebhookLogRepository, ReqwestTransport>;
pub type DbRetryFailedWebhooksUseCase =
    RetryFailedWebhooksUseCase<DbWebhookLogRepository, ReqwestTransport>;

impl AppState {
    pub fn subscription_repo(&self) -> DbSubscriptionRepository {
        DbSubscriptionRepository {
            db: self.db.clone(),
        }
    }

    pub fn log_repo(&self) -> DbWebhookLogRepository {
        DbWebhookLogRepository {
            db: self.db.clone(),
        }
    }

    pub fn deliver_usecase(&self) -> DbDeliverWebhookUseCase {
        DeliverWebhookUseCase {
            logs: self.log_repo(),
            transport: self.transport.clone(),
            policy: self.policy,
        }
    }

    pub fn sweep_usecase(&self) -> DbRetryFailedWebhooksUseCase {
        RetryFailedWebhooksUseCase {
            logs: self.log_repo(),
            deliver: self.deliver_usecase(),
        }
    }
}
