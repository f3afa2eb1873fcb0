use sea_orm::entity::prelude::*;

/// One outbound delivery and the outcome of its latest attempt.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "webhooklogs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub account_id: Uuid,
    pub subscription_id: Option<Uuid>,
    pub url: String,
    pub event_type: String,
    pub payload: Json,
    /// `pending`, `delivered` or `failed`.
    pub status: String,
    /// `transient`, `permanent` or `exhausted`.
    pub failure_kind: Option<String>,
    pub attempts: i32,
    pub last_status_code: Option<i32>,
    pub last_error: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub delivered_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::webhook_subscriptions::Entity",
        from = "Column::SubscriptionId",
        to = "super::webhook_subscriptions::Column::Id"
    )]
    Subscription,
}

impl Related<super::webhook_subscriptions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subscription.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
