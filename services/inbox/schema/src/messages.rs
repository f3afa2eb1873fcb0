use sea_orm::entity::prelude::*;

/// A single inbound or outbound WhatsApp message.
/// `(conversation_id, external_id)` is unique so redelivered webhooks dedupe.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "messages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Write-time sequence (bigserial), tie-break for equal timestamps.
    pub seq: i64,
    pub conversation_id: Uuid,
    pub account_id: Uuid,
    pub workspace_id: Uuid,
    pub phone_number_id: String,
    /// `inbound` or `outbound`.
    pub direction: String,
    pub message_type: String,
    pub content: Json,
    /// Meta message id (`wamid.…`).
    pub external_id: String,
    /// `received`, `sent`, `delivered`, `read` or `failed`.
    pub status: String,
    pub error: Option<String>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::conversations::Entity",
        from = "Column::ConversationId",
        to = "super::conversations::Column::Id"
    )]
    Conversation,
}

impl Related<super::conversations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Conversation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
