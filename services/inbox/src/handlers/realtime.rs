use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde_json::json;
use uuid::Uuid;

use relay_auth_types::identity::IdentityHeaders;
use relay_domain::id::ConversationId;

use crate::error::InboxServiceError;
use crate::realtime::{ClientCommand, ClientId, JOIN_DENIED, JOINED, LEFT};
use crate::state::AppState;
use crate::usecase::conversation::GetConversationUseCase;

// ── GET /realtime ────────────────────────────────────────────────────────────

pub async fn realtime(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> Response {
    let account_id = identity.account_id.0;
    ws.on_upgrade(move |socket| handle_socket(socket, state, account_id))
}

async fn handle_socket(socket: WebSocket, state: AppState, account_id: Uuid) {
    let (client_id, mut rx) = state.hub.connect(account_id);
    tracing::debug!(client_id, %account_id, "realtime client connected");

    let (mut ws_sender, mut ws_receiver) = socket.split();

    let send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if ws_sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(message)) = ws_receiver.next().await {
        let text = match message {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };
        match serde_json::from_str::<ClientCommand>(text.as_str()) {
            Ok(command) => handle_command(&state, client_id, account_id, command).await,
            Err(e) => tracing::debug!(client_id, error = %e, "ignored realtime frame"),
        }
    }

    state.hub.disconnect(client_id);
    send_task.abort();
    tracing::debug!(client_id, "realtime client disconnected");
}

async fn handle_command(state: &AppState, client_id: ClientId, account_id: Uuid, command: ClientCommand) {
    match command {
        ClientCommand::Join(request) => {
            let conversation_id = ConversationId(request.conversation_id);
            let uc = GetConversationUseCase {
                repo: state.conversation_repo(),
            };
            let reason = match uc.execute(account_id, conversation_id.0).await {
                Ok(_) => {
                    state.hub.join(client_id, conversation_id);
                    state.hub.send_to(
                        client_id,
                        JOINED,
                        &json!({ "conversationId": conversation_id, "room": conversation_id.room() }),
                    );
                    return;
                }
                Err(InboxServiceError::ConversationNotFound) => "not_found",
                Err(e) => {
                    tracing::error!(client_id, %conversation_id, error = ?e, "join lookup failed");
                    "unavailable"
                }
            };
            tracing::info!(client_id, %account_id, %conversation_id, reason, "join denied");
            state.hub.send_to(
                client_id,
                JOIN_DENIED,
                &json!({ "conversationId": conversation_id, "reason": reason }),
            );
        }
        ClientCommand::Leave(request) => {
            let conversation_id = ConversationId(request.conversation_id);
            state.hub.leave(client_id, conversation_id);
            state
                .hub
                .send_to(client_id, LEFT, &json!({ "conversationId": conversation_id }));
        }
    }
}
