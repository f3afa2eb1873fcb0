use anyhow::Context as _;

/// Inbox service configuration loaded from environment variables.
#[derive(Debug)]
pub struct InboxConfig {
    /// PostgreSQL connection URL. Env var: `DATABASE_URL`.
    pub database_url: String,
    /// TCP port for the HTTP server (default 3120). Env var: `INBOX_PORT`.
    pub inbox_port: u16,
    /// Token Meta echoes during webhook verification. Env var: `META_VERIFY_TOKEN`.
    pub meta_verify_token: String,
    /// App secret for `X-Hub-Signature-256`; unset disables the check. Env var: `META_APP_SECRET`.
    pub meta_app_secret: Option<String>,
    /// gRPC endpoint of the dispatch service (e.g. "http://dispatch:50061").
    pub dispatch_grpc_url: String,
}

impl InboxConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: std::env::var("DATABASE_URL").context("DATABASE_URL")?,
            inbox_port: std::env::var("INBOX_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3120),
            meta_verify_token: std::env::var("META_VERIFY_TOKEN").context("META_VERIFY_TOKEN")?,
            meta_app_secret: std::env::var("META_APP_SECRET")
                .ok()
                .filter(|v| !v.is_empty()),
            dispatch_grpc_url: std::env::var("DISPATCH_GRPC_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:50061".to_owned()),
        })
    }
}
