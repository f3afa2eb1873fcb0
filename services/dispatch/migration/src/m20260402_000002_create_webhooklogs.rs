use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Webhooklogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Webhooklogs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Webhooklogs::AccountId).uuid().not_null())
                    .col(ColumnDef::new(Webhooklogs::SubscriptionId).uuid())
                    .col(ColumnDef::new(Webhooklogs::Url).string().not_null())
                    .col(ColumnDef::new(Webhooklogs::EventType).string().not_null())
                    .col(ColumnDef::new(Webhooklogs::Payload).json_binary().not_null())
                    .col(
                        ColumnDef::new(Webhooklogs::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Webhooklogs::FailureKind).string())
                    .col(
                        ColumnDef::new(Webhooklogs::Attempts)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Webhooklogs::LastStatusCode).integer())
                    .col(ColumnDef::new(Webhooklogs::LastError).text())
                    .col(
                        ColumnDef::new(Webhooklogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Webhooklogs::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Webhooklogs::DeliveredAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Webhooklogs::Table, Webhooklogs::SubscriptionId)
                            .to(WebhookSubscriptions::Table, WebhookSubscriptions::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Sweep scan: failed rows by age.
        manager
            .create_index(
                Index::create()
                    .table(Webhooklogs::Table)
                    .col(Webhooklogs::Status)
                    .col(Webhooklogs::CreatedAt)
                    .name("idx_webhooklogs_status_created_at")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Webhooklogs::Table)
                    .col(Webhooklogs::AccountId)
                    .col(Webhooklogs::CreatedAt)
                    .name("idx_webhooklogs_account_created_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Webhooklogs::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Webhooklogs {
    Table,
    Id,
    AccountId,
    SubscriptionId,
    Url,
    EventType,
    Payload,
    Status,
    FailureKind,
    Attempts,
    LastStatusCode,
    LastError,
    CreatedAt,
    UpdatedAt,
    DeliveredAt,
}

#[derive(Iden)]
enum WebhookSubscriptions {
    Table,
    Id,
}
