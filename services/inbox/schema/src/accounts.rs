use sea_orm::entity::prelude::*;

/// A tenant. `waba_id` is filled by the OAuth flow and `business_id` by a
/// later Meta webhook, so either may be absent for a while after signup.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub waba_id: Option<String>,
    pub business_id: Option<String>,
    pub default_workspace_id: Uuid,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::phonenumbers::Entity")]
    PhoneNumbers,
    #[sea_orm(has_many = "super::conversations::Entity")]
    Conversations,
}

impl Related<super::phonenumbers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PhoneNumbers.def()
    }
}

impl Related<super::conversations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Conversations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
