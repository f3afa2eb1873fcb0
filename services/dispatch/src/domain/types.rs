use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use relay_domain::event::EventType;

/// Which log rows a sweep may take over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryClaim {
    /// `None` takes rows of every account.
    pub account_id: Option<Uuid>,
    pub created_after: DateTime<Utc>,
    /// `pending` rows untouched since this instant belong to a run that died.
    pub stalled_before: DateTime<Utc>,
    pub max_attempts: u32,
    pub limit: u64,
}

/// Tenant endpoint that receives outbound webhooks for the listed events.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: Uuid,
    pub account_id: Uuid,
    pub url: String,
    /// Event type strings, or `"*"` for every event.
    pub events: Vec<String>,
    pub is_active: bool,
    #[serde(serialize_with = "relay_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "relay_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    pub fn listens_to(&self, event_type: EventType) -> bool {
        self.is_active && event_type.matches(&self.events)
    }
}

#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub account_id: Uuid,
    pub url: String,
    pub events: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Pending,
    Delivered,
    Failed,
}

impl DeliveryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Delivered => "delivered",
            Self::Failed => "failed",
        }
    }
}

/// Why the latest attempt of a delivery did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Network error, timeout or a retryable status. Another attempt may succeed.
    Transient,
    /// The subscriber answered 401, 403 or 410.
    Permanent,
    /// Every allowed attempt was used.
    Exhausted,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transient => "transient",
            Self::Permanent => "permanent",
            Self::Exhausted => "exhausted",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown value: {0}")]
pub struct UnknownVariant(pub String);

impl FromStr for DeliveryStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "delivered" => Ok(Self::Delivered),
            "failed" => Ok(Self::Failed),
            other => Err(UnknownVariant(other.to_owned())),
        }
    }
}

impl FromStr for FailureKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "transient" => Ok(Self::Transient),
            "permanent" => Ok(Self::Permanent),
            "exhausted" => Ok(Self::Exhausted),
            other => Err(UnknownVariant(other.to_owned())),
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit row of one outbound delivery. `attempts` counts every send across
/// the original run and all sweeps.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookLog {
    pub id: Uuid,
    pub account_id: Uuid,
    pub subscription_id: Option<Uuid>,
    pub url: String,
    pub event_type: EventType,
    pub payload: Value,
    pub status: DeliveryStatus,
    pub failure_kind: Option<FailureKind>,
    pub attempts: u32,
    pub last_status_code: Option<u16>,
    pub last_error: Option<String>,
    #[serde(serialize_with = "relay_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "relay_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
    #[serde(serialize_with = "relay_core::serde::to_rfc3339_ms_opt")]
    pub delivered_at: Option<DateTime<Utc>>,
}

impl WebhookLog {
    pub fn delivery(&self) -> Delivery {
        Delivery {
            account_id: self.account_id,
            subscription_id: self.subscription_id,
            url: self.url.clone(),
            event_type: self.event_type,
            payload: self.payload.clone(),
        }
    }
}

/// What to send, and to whom.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub account_id: Uuid,
    pub subscription_id: Option<Uuid>,
    pub url: String,
    pub event_type: EventType,
    pub payload: Value,
}

/// State written to the log after each attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    pub attempts: u32,
    pub status: DeliveryStatus,
    pub failure_kind: Option<FailureKind>,
    pub status_code: Option<u16>,
    pub error: Option<String>,
    pub at: DateTime<Utc>,
}

/// Reason a delivery ended without success, or why an attempt must be repeated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("{0}")]
    Transient(String),
    #[error("rejected with HTTP {0}")]
    Permanent(u16),
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: String },
}

impl DeliveryError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Transient(_) => FailureKind::Transient,
            Self::Permanent(_) => FailureKind::Permanent,
            Self::Exhausted { .. } => FailureKind::Exhausted,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Delivered,
    PermanentFailure,
    ExhaustedFailure,
}

/// Final result of a delivery run. Failures are carried here, never raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryResult {
    pub success: bool,
    pub attempts: u32,
    pub status_code: Option<u16>,
    pub error: Option<DeliveryError>,
    pub outcome: DeliveryOutcome,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SweepSummary {
    pub picked: u32,
    pub delivered: u32,
    pub failed: u32,
}
