//! Typed parsing of Meta WhatsApp Cloud API webhook bodies.
//!
//! A body holds `entry[]` (one per WABA) with `changes[]`. Only
//! `field = "messages"` changes are routed; every other field becomes
//! [`WebhookEvent::Unsupported`] so the caller can log and skip it.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::domain::types::MessageStatus;

const WHATSAPP_OBJECT: &str = "whatsapp_business_account";
const MESSAGES_FIELD: &str = "messages";

/// The body did not have the shape of a WhatsApp webhook.
#[derive(Debug, thiserror::Error)]
#[error("malformed webhook payload: {0}")]
pub struct MalformedWebhookPayload(pub String);

#[derive(Debug, Clone, PartialEq)]
pub enum WebhookEvent {
    Message(InboundMessageEvent),
    Status(StatusEvent),
    Unsupported { waba_id: String, field: String },
}

/// A customer message addressed to one of the tenant's phone numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessageEvent {
    pub waba_id: String,
    pub phone_number_id: String,
    pub display_phone_number: Option<String>,
    pub customer_number: String,
    pub customer_name: Option<String>,
    /// Meta message id (`wamid.…`).
    pub external_id: String,
    pub message_type: String,
    /// The type-specific sub-object (`text`, `image`, …) or `null` if absent.
    pub content: Value,
    pub timestamp: DateTime<Utc>,
}

/// A delivery receipt for a message the tenant sent.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusEvent {
    pub waba_id: String,
    pub phone_number_id: String,
    pub external_id: String,
    pub status: MessageStatus,
    pub recipient_id: String,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

// ── Wire shapes ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct Payload {
    object: String,
    #[serde(default)]
    entry: Vec<Entry>,
}

#[derive(Deserialize)]
struct Entry {
    id: String,
    #[serde(default)]
    changes: Vec<Change>,
}

#[derive(Deserialize)]
struct Change {
    field: Option<String>,
    #[serde(default)]
    value: Value,
}

#[derive(Deserialize)]
struct MessagesValue {
    metadata: Metadata,
    #[serde(default)]
    contacts: Vec<Contact>,
    #[serde(default)]
    messages: Vec<RawMessage>,
    #[serde(default)]
    statuses: Vec<RawStatus>,
}

#[derive(Deserialize)]
struct Metadata {
    display_phone_number: Option<String>,
    phone_number_id: String,
}

#[derive(Deserialize)]
struct Contact {
    wa_id: Option<String>,
    profile: Option<Profile>,
}

#[derive(Deserialize)]
struct Profile {
    name: Option<String>,
}

#[derive(Deserialize)]
struct RawMessage {
    from: String,
    id: String,
    timestamp: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

#[derive(Deserialize)]
struct RawStatus {
    id: String,
    status: String,
    timestamp: String,
    #[serde(default)]
    recipient_id: String,
    #[serde(default)]
    errors: Vec<RawError>,
}

#[derive(Deserialize)]
struct RawError {
    code: Option<i64>,
    title: Option<String>,
    message: Option<String>,
}

impl RawError {
    fn describe(&self) -> String {
        let text = self
            .title
            .as_deref()
            .or(self.message.as_deref())
            .unwrap_or("unknown error");
        match self.code {
            Some(code) => format!("{code}: {text}"),
            None => text.to_owned(),
        }
    }
}

// ── Parsing ──────────────────────────────────────────────────────────────────

/// Parse a raw webhook body into routable events, in payload order.
pub fn parse_webhook(body: &[u8]) -> Result<Vec<WebhookEvent>, MalformedWebhookPayload> {
    let payload: Payload =
        serde_json::from_slice(body).map_err(|e| MalformedWebhookPayload(e.to_string()))?;
    if payload.object != WHATSAPP_OBJECT {
        return Err(MalformedWebhookPayload(format!(
            "unexpected object `{}`",
            payload.object
        )));
    }

    let mut events = Vec::new();
    for entry in payload.entry {
        for change in entry.changes {
            // Meta omits `field` on some test deliveries; the value is still a messages change.
            let field = change.field.unwrap_or_else(|| MESSAGES_FIELD.to_owned());
            if field != MESSAGES_FIELD {
                events.push(WebhookEvent::Unsupported {
                    waba_id: entry.id.clone(),
                    field,
                });
                continue;
            }
            let value: MessagesValue = serde_json::from_value(change.value)
                .map_err(|e| MalformedWebhookPayload(format!("messages change: {e}")))?;
            parse_messages_change(&entry.id, value, &mut events)?;
        }
    }
    Ok(events)
}

fn parse_messages_change(
    waba_id: &str,
    value: MessagesValue,
    events: &mut Vec<WebhookEvent>,
) -> Result<(), MalformedWebhookPayload> {
    let MessagesValue {
        metadata,
        contacts,
        messages,
        statuses,
    } = value;

    for raw in messages {
        let customer_name = contacts
            .iter()
            .find(|c| c.wa_id.as_deref() == Some(raw.from.as_str()))
            .or_else(|| contacts.first())
            .and_then(|c| c.profile.as_ref())
            .and_then(|p| p.name.clone());
        let content = raw.rest.get(&raw.kind).cloned().unwrap_or(Value::Null);
        events.push(WebhookEvent::Message(InboundMessageEvent {
            waba_id: waba_id.to_owned(),
            phone_number_id: metadata.phone_number_id.clone(),
            display_phone_number: metadata.display_phone_number.clone(),
            timestamp: parse_unix_seconds(&raw.timestamp)?,
            customer_number: raw.from,
            customer_name,
            external_id: raw.id,
            message_type: raw.kind,
            content,
        }));
    }

    for raw in statuses {
        let status = match raw.status.as_str() {
            "sent" => MessageStatus::Sent,
            "delivered" => MessageStatus::Delivered,
            "read" => MessageStatus::Read,
            "failed" => MessageStatus::Failed,
            other => {
                events.push(WebhookEvent::Unsupported {
                    waba_id: waba_id.to_owned(),
                    field: format!("statuses.{other}"),
                });
                continue;
            }
        };
        events.push(WebhookEvent::Status(StatusEvent {
            waba_id: waba_id.to_owned(),
            phone_number_id: metadata.phone_number_id.clone(),
            status,
            error: raw.errors.first().map(RawError::describe),
            timestamp: parse_unix_seconds(&raw.timestamp)?,
            external_id: raw.id,
            recipient_id: raw.recipient_id,
        }));
    }
    Ok(())
}

fn parse_unix_seconds(raw: &str) -> Result<DateTime<Utc>, MalformedWebhookPayload> {
    raw.parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| MalformedWebhookPayload(format!("invalid timestamp `{raw}`")))
}
