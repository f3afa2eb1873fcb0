//! Event types published to tenant webhook subscribers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Event kinds an account can subscribe to.
///
/// Wire format: dotted lowercase (`message.received`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "message.received")]
    MessageReceived,
    #[serde(rename = "message.status")]
    MessageStatus,
    #[serde(rename = "conversation.created")]
    ConversationCreated,
}

/// Subscription wildcard that matches every event type.
pub const ANY_EVENT: &str = "*";

#[derive(Debug, thiserror::Error)]
#[error("unknown event type: {0}")]
pub struct UnknownEventType(pub String);

impl EventType {
    pub const ALL: [EventType; 3] = [
        Self::MessageReceived,
        Self::MessageStatus,
        Self::ConversationCreated,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::MessageReceived => "message.received",
            Self::MessageStatus => "message.status",
            Self::ConversationCreated => "conversation.created",
        }
    }

    /// Whether a subscription listing `filters` should receive this event.
    pub fn matches(self, filters: &[String]) -> bool {
        filters
            .iter()
            .any(|f| f == ANY_EVENT || f == self.as_str())
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = UnknownEventType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| UnknownEventType(s.to_owned()))
    }
}
