use sea_orm::entity::prelude::*;

/// Tenant endpoint receiving outbound webhooks.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "webhook_subscriptions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub account_id: Uuid,
    pub url: String,
    /// JSON array of event type strings; `"*"` matches every event.
    pub events: Json,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::webhooklogs::Entity")]
    Webhooklogs,
}

impl Related<super::webhooklogs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Webhooklogs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
