//! Outbound webhook POSTs over `reqwest`.

use std::time::Duration;

use anyhow::Context as _;
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderName};

use crate::domain::repository::{TransportError, WebhookTransport};
use crate::domain::types::Delivery;

pub const EVENT_HEADER: HeaderName = HeaderName::from_static("x-webhook-event");
pub const ACCOUNT_HEADER: HeaderName = HeaderName::from_static("x-account-id");

#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("relay-dispatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build webhook HTTP client")?;
        Ok(Self { client })
    }
}

impl WebhookTransport for ReqwestTransport {
    async fn send(&self, delivery: &Delivery, timeout: Duration) -> Result<u16, TransportError> {
        let body = serde_json::to_vec(&delivery.payload)
            .map_err(|e| TransportError::Network(format!("encode payload: {e}")))?;
        let response = self
            .client
            .post(&delivery.url)
            .timeout(timeout)
            .header(CONTENT_TYPE, "application/json")
            .header(EVENT_HEADER, delivery.event_type.as_str())
            .header(ACCOUNT_HEADER, delivery.account_id.to_string())
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout(timeout)
                } else {
                    TransportError::Network(e.to_string())
                }
            })?;
        Ok(response.status().as_u16())
    }
}
