use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};
use warp::ws::{Message, WebSocket};

use crate::realtime::RoomHub;
use crate::room_service::RoomService;
use duel_core::normalize_room_code;
use duel_types::ClientFrame;

/// One client socket scoped to a room code: hub events flow out as JSON,
/// and the only inbound frames are ephemeral typing signals. Game actions
/// go through the HTTP API, never through the socket.
pub async fn handle_room_socket(
    websocket: WebSocket,
    code: String,
    hub: Arc<RoomHub>,
    service: Arc<RoomService>,
) {
    let code = normalize_room_code(&code);
    info!(code = %code, "room socket connected");

    let (mut ws_sender, mut ws_receiver) = websocket.split();
    let mut events = hub.subscribe(&code);

    let outgoing = {
        let code = code.clone();
        async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        let json = match serde_json::to_string(&event) {
                            Ok(json) => json,
                            Err(e) => {
                                warn!(code = %code, "failed to serialize room event: {e}");
                                continue;
                            }
                        };
                        if ws_sender.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    // A slow socket missed events; the client's poll
                    // converges it, so just keep streaming.
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(missed)) => {
                        debug!(code = %code, missed, "socket lagged behind room events");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    };

    let incoming = {
        let code = code.clone();
        async move {
            while let Some(result) = ws_receiver.next().await {
                let msg = match result {
                    Ok(msg) => msg,
                    Err(e) => {
                        warn!(code = %code, "room socket error: {e}");
                        break;
                    }
                };
                if !msg.is_text() {
                    continue;
                }
                let Ok(text) = msg.to_str() else { continue };
                match serde_json::from_str::<ClientFrame>(text) {
                    Ok(ClientFrame::Typing { player_id }) => {
                        service.notify_typing(&code, player_id);
                    }
                    Err(e) => {
                        debug!(code = %code, "ignoring malformed client frame: {e}");
                    }
                }
            }
        }
    };

    tokio::select! {
        _ = outgoing => {},
        _ = incoming => {},
    }

    // Dropping the receiver unsubscribes; the hub prunes idle channels.
    info!(code = %code, "room socket disconnected");
}
