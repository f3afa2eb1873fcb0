use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Conversations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Conversations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Conversations::AccountId).uuid().not_null())
                    .col(ColumnDef::new(Conversations::WorkspaceId).uuid().not_null())
                    .col(
                        ColumnDef::new(Conversations::PhoneNumberId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Conversations::CustomerNumber)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Conversations::CustomerName).string())
                    .col(
                        ColumnDef::new(Conversations::Status)
                            .string()
                            .not_null()
                            .default("open"),
                    )
                    .col(
                        ColumnDef::new(Conversations::LastMessageAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Conversations::UnreadCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Conversations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Conversations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Conversations::Table, Conversations::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager.create_index(isolation_key_index()).await?;

        manager
            .create_index(
                Index::create()
                    .table(Conversations::Table)
                    .col(Conversations::AccountId)
                    .col(Conversations::LastMessageAt)
                    .name("idx_conversations_account_last_message_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Conversations::Table).to_owned())
            .await
    }
}

/// Isolation key: the conversation upsert conflicts on exactly these columns.
pub fn isolation_key_index() -> IndexCreateStatement {
    Index::create()
        .table(Conversations::Table)
        .col(Conversations::AccountId)
        .col(Conversations::WorkspaceId)
        .col(Conversations::PhoneNumberId)
        .col(Conversations::CustomerNumber)
        .name("uq_conversations_isolation_key")
        .unique()
        .to_owned()
}

#[derive(Iden)]
enum Conversations {
    Table,
    Id,
    AccountId,
    WorkspaceId,
    PhoneNumberId,
    CustomerNumber,
    CustomerName,
    Status,
    LastMessageAt,
    UnreadCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
}
