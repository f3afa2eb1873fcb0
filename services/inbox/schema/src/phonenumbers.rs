use sea_orm::entity::prelude::*;

/// WhatsApp-registered phone number connected to an account.
/// Disconnecting flips `is_active`; rows are never hard-deleted.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "phonenumbers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Meta's phone number id (`metadata.phone_number_id` in webhooks).
    pub phone_number_id: String,
    pub waba_id: String,
    pub account_id: Uuid,
    pub workspace_id: Uuid,
    pub display_phone_number: Option<String>,
    pub is_active: bool,
    pub access_token_encrypted: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id"
    )]
    Account,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
