use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::infra::db::{
    DbAccountRepository, DbConversationRepository, DbMessageRepository, DbPhoneNumberRepository,
};
use crate::infra::grpc::GrpcEventPublisher;
use crate::realtime::RoomHub;
use crate::usecase::ingest::IngestWebhookUseCase;
use crate::usecase::record::RecordMessageUseCase;
use crate::usecase::resolve::ResolveEntitiesUseCase;
use crate::usecase::status::ApplyStatusUseCase;

/// Meta app settings used by the webhook endpoint.
#[derive(Debug, Clone)]
pub struct MetaSettings {
    /// Token echoed back during the `hub.challenge` handshake.
    pub verify_token: String,
    /// When set, `X-Hub-Signature-256` is required on every webhook POST.
    pub app_secret: Option<String>,
}

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub hub: RoomHub,
    pub publisher: GrpcEventPublisher,
    pub meta: Arc<MetaSettings>,
}

pub type DbIngestWebhookUseCase = IngestWebhookUseCase<
    DbAccountRepository,
    DbPhoneNumberRepository,
    DbConversationRepository,
    DbMessageRepository,
    RoomHub,
    GrpcEventPublisher,
>;

impl AppState {
    pub fn account_repo(&self) -> DbAccountRepository {
        DbAccountRepository {
            db: self.db.clone(),
        }
    }

    pub fn phone_repo(&self) -> DbPhoneNumberRepository {
        DbPhoneNumberRepository {
            db: self.db.clone(),
        }
    }

    pub fn conversation_repo(&self) -> DbConversationRepository {
        DbConversationRepository {
            db: self.db.clone(),
        }
    }

    pub fn message_repo(&self) -> DbMessageRepository {
        DbMessageRepository {
            db: self.db.clone(),
        }
    }

    pub fn ingest_usecase(&self) -> DbIngestWebhookUseCase {
        IngestWebhookUseCase {
            resolver: ResolveEntitiesUseCase {
                accounts: self.account_repo(),
                phones: self.phone_repo(),
                conversations: self.conversation_repo(),
            },
            recorder: RecordMessageUseCase {
                messages: self.message_repo(),
            },
            statuses: ApplyStatusUseCase {
                messages: self.message_repo(),
            },
            broadcaster: self.hub.clone(),
            publisher: self.publisher.clone(),
        }
    }
}
