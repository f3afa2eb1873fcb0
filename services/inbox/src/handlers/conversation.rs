use axum::{
    Json,
    extract::{Path, Query, State},
};
use uuid::Uuid;

use relay_auth_types::identity::IdentityHeaders;
use relay_domain::pagination::PageRequest;

use crate::domain::types::{Conversation, Message};
use crate::error::InboxServiceError;
use crate::state::AppState;
use crate::usecase::conversation::{ListConversationsUseCase, ListMessagesUseCase, MarkReadUseCase};

// ── GET /conversations ───────────────────────────────────────────────────────

pub async fn list_conversations(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Vec<Conversation>>, InboxServiceError> {
    let uc = ListConversationsUseCase {
        repo: state.conversation_repo(),
    };
    let conversations = uc.execute(identity.account_id.0, page).await?;
    Ok(Json(conversations))
}

// ── GET /conversations/{id}/messages ─────────────────────────────────────────

pub async fn list_messages(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(conversation_id): Path<Uuid>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Vec<Message>>, InboxServiceError> {
    let uc = ListMessagesUseCase {
        conversations: state.conversation_repo(),
        messages: state.message_repo(),
    };
    let messages = uc
        .execute(identity.account_id.0, conversation_id, page)
        .await?;
    Ok(Json(messages))
}

// ── POST /conversations/{id}/read ────────────────────────────────────────────

pub async fn mark_read(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(conversation_id): Path<Uuid>,
) -> Result<Json<Conversation>, InboxServiceError> {
    let uc = MarkReadUseCase {
        repo: state.conversation_repo(),
    };
    let conversation = uc.execute(identity.account_id.0, conversation_id).await?;
    Ok(Json(conversation))
}
