use std::time::Duration;

use anyhow::Context as _;

use crate::domain::retry::{MAX_JITTER, RetryPolicy};

/// Dispatch service configuration loaded from environment variables.
#[derive(Debug)]
pub struct DispatchConfig {
    /// PostgreSQL connection URL. Env var: `DATABASE_URL`.
    pub database_url: String,
    /// TCP port for the HTTP server (default 3121). Env var: `DISPATCH_PORT`.
    pub dispatch_port: u16,
    /// TCP port for the gRPC server (default 50061). Env var: `DISPATCH_GRPC_PORT`.
    pub dispatch_grpc_port: u16,
    /// Sends allowed per delivery (default 5). Env var: `WEBHOOK_MAX_RETRIES`.
    pub max_retries: u32,
    /// First backoff in milliseconds (default 1000). Env var: `WEBHOOK_INITIAL_DELAY_MS`.
    pub initial_delay_ms: u64,
    /// Per-attempt timeout in seconds (default 10). Env var: `WEBHOOK_TIMEOUT_SECS`.
    pub timeout_secs: u64,
    /// Seconds between failed-delivery sweeps (default 300, 0 disables).
    /// Env var: `WEBHOOK_SWEEP_INTERVAL_SECS`.
    pub sweep_interval_secs: u64,
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl DispatchConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: std::env::var("DATABASE_URL").context("DATABASE_URL")?,
            dispatch_port: env_or("DISPATCH_PORT", 3121),
            dispatch_grpc_port: env_or("DISPATCH_GRPC_PORT", 50061),
            max_retries: env_or("WEBHOOK_MAX_RETRIES", 5),
            initial_delay_ms: env_or("WEBHOOK_INITIAL_DELAY_MS", 1000),
            timeout_secs: env_or("WEBHOOK_TIMEOUT_SECS", 10),
            sweep_interval_secs: env_or("WEBHOOK_SWEEP_INTERVAL_SECS", 300),
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries.max(1),
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            timeout: Duration::from_secs(self.timeout_secs.max(1)),
            max_jitter: MAX_JITTER,
        }
    }

    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_secs > 0).then(|| Duration::from_secs(self.sweep_interval_secs))
    }
}
