use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    cli::run_cli(relay_inbox_migration::Migrator).await;
}
