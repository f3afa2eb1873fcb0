use sea_orm_migration::prelude::*;

mod m20260401_000001_create_accounts;
mod m20260401_000002_create_phonenumbers;
mod m20260401_000003_create_conversations;
mod m20260401_000004_create_messages;

pub use m20260401_000003_create_conversations::isolation_key_index;
pub use m20260401_000004_create_messages::dedup_key_index;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260401_000001_create_accounts::Migration),
            Box::new(m20260401_000002_create_phonenumbers::Migration),
            Box::new(m20260401_000003_create_conversations::Migration),
            Box::new(m20260401_000004_create_messages::Migration),
        ]
    }
}
