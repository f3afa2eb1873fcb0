//! In-process room registry for WebSocket clients.
//!
//! Every conversation has exactly one room, `conversation:<id>`. A client only
//! receives the events of rooms it joined; delivery is best effort and nothing
//! is queued for clients that are not connected. A client whose socket falls
//! [`CLIENT_BUFFER`] frames behind loses the frames that do not fit.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use uuid::Uuid;

use relay_domain::id::ConversationId;

use crate::domain::repository::Broadcaster;

// Server → client event names.
pub const JOINED: &str = "joined";
pub const JOIN_DENIED: &str = "join_denied";
pub const LEFT: &str = "left";
pub const NEW_MESSAGE: &str = "new_message";
pub const MESSAGE_STATUS: &str = "message_status";

pub type ClientId = u64;

/// Frames queued per client before new ones are dropped.
pub const CLIENT_BUFFER: usize = 64;

/// Client → server commands, `{"event": "join", "data": {"conversationId": …}}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientCommand {
    Join(RoomRequest),
    Leave(RoomRequest),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRequest {
    pub conversation_id: Uuid,
}

/// Serialize a server event as `{"event", "data"}`.
pub fn envelope(event: &str, data: &Value) -> Option<String> {
    serde_json::to_string(&json!({ "event": event, "data": data })).ok()
}

struct Client {
    account_id: Uuid,
    tx: mpsc::Sender<String>,
    rooms: HashSet<String>,
}

#[derive(Default)]
struct HubState {
    clients: HashMap<ClientId, Client>,
    rooms: HashMap<String, HashSet<ClientId>>,
}

impl HubState {
    fn remove_member(&mut self, room: &str, client_id: ClientId) {
        if let Some(members) = self.rooms.get_mut(room) {
            members.remove(&client_id);
            if members.is_empty() {
                self.rooms.remove(room);
            }
        }
    }
}

#[derive(Clone, Default)]
pub struct RoomHub {
    state: Arc<Mutex<HubState>>,
    next_client_id: Arc<AtomicU64>,
}

impl RoomHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HubState> {
        // Every critical section leaves the maps consistent, so poisoning is ignored.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a client of `account_id`. Outgoing frames arrive on the receiver.
    pub fn connect(&self, account_id: Uuid) -> (ClientId, mpsc::Receiver<String>) {
        let client_id = self.next_client_id.fetch_add(1, Ordering::Relaxed) + 1;
        let (tx, rx) = mpsc::channel(CLIENT_BUFFER);
        self.lock().clients.insert(
            client_id,
            Client {
                account_id,
                tx,
                rooms: HashSet::new(),
            },
        );
        (client_id, rx)
    }

    /// Account the client connected as.
    pub fn account_of(&self, client_id: ClientId) -> Option<Uuid> {
        self.lock().clients.get(&client_id).map(|c| c.account_id)
    }

    /// Add the client to the conversation's room. Authorization is the caller's job.
    pub fn join(&self, client_id: ClientId, conversation_id: ConversationId) -> bool {
        let room = conversation_id.room();
        let mut state = self.lock();
        let Some(client) = state.clients.get_mut(&client_id) else {
            return false;
        };
        client.rooms.insert(room.clone());
        state.rooms.entry(room).or_default().insert(client_id);
        true
    }

    pub fn leave(&self, client_id: ClientId, conversation_id: ConversationId) -> bool {
        let room = conversation_id.room();
        let mut state = self.lock();
        let was_member = state
            .clients
            .get_mut(&client_id)
            .is_some_and(|c| c.rooms.remove(&room));
        if was_member {
            state.remove_member(&room, client_id);
        }
        was_member
    }

    /// Drop the client and all of its memberships.
    pub fn disconnect(&self, client_id: ClientId) {
        let mut state = self.lock();
        if let Some(client) = state.clients.remove(&client_id) {
            for room in &client.rooms {
                state.remove_member(room, client_id);
            }
        }
    }

    pub fn room_size(&self, conversation_id: ConversationId) -> usize {
        self.lock()
            .rooms
            .get(&conversation_id.room())
            .map_or(0, HashSet::len)
    }

    /// Send an event to a single client.
    pub fn send_to(&self, client_id: ClientId, event: &str, data: &Value) -> bool {
        let Some(frame) = envelope(event, data) else {
            return false;
        };
        self.lock()
            .clients
            .get(&client_id)
            .is_some_and(|c| offer(client_id, c, frame))
    }
}

/// Queue a frame without waiting. A full or closed queue drops it.
fn offer(client_id: ClientId, client: &Client, frame: String) -> bool {
    match client.tx.try_send(frame) {
        Ok(()) => true,
        Err(mpsc::error::TrySendError::Full(_)) => {
            tracing::debug!(client_id, "realtime client lagging; frame dropped");
            false
        }
        Err(mpsc::error::TrySendError::Closed(_)) => false,
    }
}

impl Broadcaster for RoomHub {
    fn broadcast(&self, conversation_id: ConversationId, event: &str, payload: &Value) -> usize {
        let Some(frame) = envelope(event, payload) else {
            return 0;
        };
        let room = conversation_id.room();
        let state = self.lock();
        let Some(members) = state.rooms.get(&room) else {
            return 0;
        };
        members
            .iter()
            .filter_map(|id| state.clients.get(id).map(|client| (*id, client)))
            .filter(|(id, client)| offer(*id, client, frame.clone()))
            .count()
    }
}
