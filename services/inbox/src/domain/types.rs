use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A tenant, looked up by the WABA id carried in `entry[].id`.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub waba_id: Option<String>,
    pub business_id: Option<String>,
    pub default_workspace_id: Uuid,
    pub is_active: bool,
}

/// Active configuration of one WhatsApp phone number inside an account.
#[derive(Debug, Clone)]
pub struct PhoneNumber {
    pub id: Uuid,
    /// Meta's phone number id.
    pub phone_number_id: String,
    pub waba_id: String,
    pub account_id: Uuid,
    pub workspace_id: Uuid,
    pub display_phone_number: Option<String>,
    pub is_active: bool,
}

/// The isolation key of a conversation. Two messages share a conversation
/// if and only if all four fields are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversationKey {
    pub account_id: Uuid,
    pub workspace_id: Uuid,
    pub phone_number_id: String,
    pub customer_number: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStatus {
    Open,
    Closed,
}

impl ConversationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: Uuid,
    pub account_id: Uuid,
    pub workspace_id: Uuid,
    pub phone_number_id: String,
    pub customer_number: String,
    pub customer_name: Option<String>,
    pub status: ConversationStatus,
    #[serde(serialize_with = "relay_core::serde::to_rfc3339_ms")]
    pub last_message_at: DateTime<Utc>,
    pub unread_count: i32,
    #[serde(serialize_with = "relay_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "relay_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn key(&self) -> ConversationKey {
        ConversationKey {
            account_id: self.account_id,
            workspace_id: self.workspace_id,
            phone_number_id: self.phone_number_id.clone(),
            customer_number: self.customer_number.clone(),
        }
    }
}

/// Result of the conversation upsert.
#[derive(Debug, Clone)]
pub struct UpsertedConversation {
    pub conversation: Conversation,
    /// `true` if this call inserted the row, `false` if it matched an existing one.
    pub created: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageDirection {
    Inbound,
    Outbound,
}

impl MessageDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
        }
    }
}

/// Delivery state of a message.
///
/// Outbound messages move `sent → delivered → read`; `failed` is terminal.
/// Inbound messages are stored as `received` and never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Received,
    Sent,
    Delivered,
    Read,
    Failed,
}

impl MessageStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Read => "read",
            Self::Failed => "failed",
        }
    }

    /// Statuses a message may currently hold for `self` to be applied.
    pub fn advances_from(self) -> &'static [MessageStatus] {
        match self {
            Self::Sent => &[],
            Self::Delivered => &[Self::Sent],
            Self::Read => &[Self::Sent, Self::Delivered],
            Self::Failed => &[Self::Sent, Self::Delivered],
            Self::Received => &[],
        }
    }

    pub fn can_advance_to(self, next: MessageStatus) -> bool {
        next.advances_from().contains(&self)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown value: {0}")]
pub struct UnknownVariant(pub String);

impl FromStr for MessageStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "received" => Ok(Self::Received),
            "sent" => Ok(Self::Sent),
            "delivered" => Ok(Self::Delivered),
            "read" => Ok(Self::Read),
            "failed" => Ok(Self::Failed),
            other => Err(UnknownVariant(other.to_owned())),
        }
    }
}

impl FromStr for MessageDirection {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inbound" => Ok(Self::Inbound),
            "outbound" => Ok(Self::Outbound),
            other => Err(UnknownVariant(other.to_owned())),
        }
    }
}

impl FromStr for ConversationStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            other => Err(UnknownVariant(other.to_owned())),
        }
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    /// Write-time sequence; `0` until the store assigns it.
    pub seq: i64,
    pub conversation_id: Uuid,
    pub account_id: Uuid,
    pub workspace_id: Uuid,
    pub phone_number_id: String,
    pub direction: MessageDirection,
    pub message_type: String,
    pub content: serde_json::Value,
    pub external_id: String,
    pub status: MessageStatus,
    pub error: Option<String>,
    #[serde(serialize_with = "relay_core::serde::to_rfc3339_ms")]
    pub timestamp: DateTime<Utc>,
    #[serde(serialize_with = "relay_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "relay_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

/// Message data as delivered by a webhook, before it is bound to a conversation.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub account_id: Uuid,
    pub phone_number_id: String,
    pub direction: MessageDirection,
    pub message_type: String,
    pub content: serde_json::Value,
    pub external_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Outcome of recording a message.
#[derive(Debug, Clone)]
pub enum Recorded {
    /// Stored for the first time; `conversation` carries the bumped counters.
    Created {
        message: Message,
        conversation: Conversation,
    },
    /// A message with the same external id already existed in the conversation.
    Duplicate(Message),
}

impl Recorded {
    pub fn message(&self) -> &Message {
        match self {
            Self::Created { message, .. } | Self::Duplicate(message) => message,
        }
    }
}
