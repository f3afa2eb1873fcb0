use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Messages::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Messages::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Messages::Seq)
                            .big_integer()
                            .not_null()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(Messages::ConversationId).uuid().not_null())
                    .col(ColumnDef::new(Messages::AccountId).uuid().not_null())
                    .col(ColumnDef::new(Messages::WorkspaceId).uuid().not_null())
                    .col(ColumnDef::new(Messages::PhoneNumberId).string().not_null())
                    .col(ColumnDef::new(Messages::Direction).string().not_null())
                    .col(ColumnDef::new(Messages::MessageType).string().not_null())
                    .col(ColumnDef::new(Messages::Content).json_binary().not_null())
                    .col(ColumnDef::new(Messages::ExternalId).string().not_null())
                    .col(ColumnDef::new(Messages::Status).string().not_null())
                    .col(ColumnDef::new(Messages::Error).string())
                    .col(
                        ColumnDef::new(Messages::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Messages::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Messages::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Messages::Table, Messages::ConversationId)
                            .to(Conversations::Table, Conversations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager.create_index(dedup_key_index()).await?;

        manager
            .create_index(
                Index::create()
                    .table(Messages::Table)
                    .col(Messages::AccountId)
                    .col(Messages::PhoneNumberId)
                    .col(Messages::ExternalId)
                    .name("idx_messages_account_phone_external_id")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Messages::Table)
                    .col(Messages::ConversationId)
                    .col(Messages::Timestamp)
                    .col(Messages::Seq)
                    .name("idx_messages_conversation_timeline")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Messages::Table).to_owned())
            .await
    }
}

/// Redelivered webhooks dedupe on this key.
pub fn dedup_key_index() -> IndexCreateStatement {
    Index::create()
        .table(Messages::Table)
        .col(Messages::ConversationId)
        .col(Messages::ExternalId)
        .name("uq_messages_conversation_external_id")
        .unique()
        .to_owned()
}

#[derive(Iden)]
enum Messages {
    Table,
    Id,
    Seq,
    ConversationId,
    AccountId,
    WorkspaceId,
    PhoneNumberId,
    Direction,
    MessageType,
    Content,
    ExternalId,
    Status,
    Error,
    Timestamp,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Conversations {
    Table,
    Id,
}
