use std::sync::Arc;

use anyhow::Context as _;
use sea_orm::Database;
use tracing::info;

use relay_core::tracing::init_tracing;
use relay_inbox::config::InboxConfig;
use relay_inbox::infra::grpc::GrpcEventPublisher;
use relay_inbox::realtime::RoomHub;
use relay_inbox::router::build_router;
use relay_inbox::state::{AppState, MetaSettings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = InboxConfig::from_env()?;

    let db = Database::connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    let publisher = GrpcEventPublisher::lazy(&config.dispatch_grpc_url)?;
    if config.meta_app_secret.is_none() {
        tracing::warn!("META_APP_SECRET not set; webhook signatures are not checked");
    }

    let state = AppState {
        db,
        hub: RoomHub::new(),
        publisher,
        meta: Arc::new(MetaSettings {
            verify_token: config.meta_verify_token,
            app_secret: config.meta_app_secret,
        }),
    };

    let router = build_router(state);
    let http_addr = format!("0.0.0.0:{}", config.inbox_port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .context("failed to bind")?;

    info!("inbox service listening on {http_addr}");
    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
