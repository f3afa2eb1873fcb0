use anyhow::Context as _;
use sea_orm::Database;
use tracing::info;

use relay_core::tracing::init_tracing;
use relay_dispatch::config::DispatchConfig;
use relay_dispatch::grpc_server::DispatchGrpcServer;
use relay_dispatch::infra::http::ReqwestTransport;
use relay_dispatch::router::build_router;
use relay_dispatch::state::AppState;
use relay_dispatch::worker::spawn_sweep_worker;
use relay_proto::dispatch::dispatch_service_server::DispatchServiceServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = DispatchConfig::from_env()?;

    let db = Database::connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    let policy = config.retry_policy();
    info!(
        max_retries = policy.max_retries,
        initial_delay_ms = policy.initial_delay.as_millis() as u64,
        timeout_secs = policy.timeout.as_secs(),
        "webhook retry policy"
    );

    let state = AppState {
        db,
        transport: ReqwestTransport::new()?,
        policy,
    };

    match config.sweep_interval() {
        Some(period) => {
            spawn_sweep_worker(state.clone(), period);
        }
        None => tracing::warn!("WEBHOOK_SWEEP_INTERVAL_SECS=0; failed webhooks are not swept"),
    }

    // Spawn gRPC server
    let grpc_addr: std::net::SocketAddr = format!("0.0.0.0:{}", config.dispatch_grpc_port)
        .parse()
        .context("invalid gRPC address")?;
    let grpc_server = DispatchGrpcServer {
        state: state.clone(),
    };
    tokio::spawn(async move {
        info!("dispatch gRPC server listening on {grpc_addr}");
        if let Err(e) = tonic::transport::Server::builder()
            .add_service(DispatchServiceServer::new(grpc_server))
            .serve(grpc_addr)
            .await
        {
            tracing::error!(error = ?e, "gRPC server error");
        }
    });

    // HTTP server
    let router = build_router(state);
    let http_addr = format!("0.0.0.0:{}", config.dispatch_port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .context("failed to bind")?;

    info!("dispatch service listening on {http_addr}");
    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
