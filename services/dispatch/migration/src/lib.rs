use sea_orm_migration::prelude::*;

mod m20260402_000001_create_webhook_subscriptions;
mod m20260402_000002_create_webhooklogs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260402_000001_create_webhook_subscriptions::Migration),
            Box::new(m20260402_000002_create_webhooklogs::Migration),
        ]
    }
}
