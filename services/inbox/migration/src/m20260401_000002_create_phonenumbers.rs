use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const ACTIVE_UNIQUE_INDEX: &str = "uq_phonenumbers_account_phone_active";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Phonenumbers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Phonenumbers::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Phonenumbers::PhoneNumberId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Phonenumbers::WabaId).string().not_null())
                    .col(ColumnDef::new(Phonenumbers::AccountId).uuid().not_null())
                    .col(ColumnDef::new(Phonenumbers::WorkspaceId).uuid().not_null())
                    .col(ColumnDef::new(Phonenumbers::DisplayPhoneNumber).string())
                    .col(
                        ColumnDef::new(Phonenumbers::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Phonenumbers::AccessTokenEncrypted)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Phonenumbers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Phonenumbers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Phonenumbers::Table, Phonenumbers::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Only one active configuration per (account, Meta phone id); deactivated
        // rows are kept for history. sea-query has no partial index builder.
        manager
            .get_connection()
            .execute_unprepared(&format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS {ACTIVE_UNIQUE_INDEX} \
                 ON phonenumbers (account_id, phone_number_id) WHERE is_active"
            ))
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name(ACTIVE_UNIQUE_INDEX).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Phonenumbers::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Phonenumbers {
    Table,
    Id,
    PhoneNumberId,
    WabaId,
    AccountId,
    WorkspaceId,
    DisplayPhoneNumber,
    IsActive,
    AccessTokenEncrypted,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
}
