//! WebSocket handler for game connections.
//!
//! Each connection follows this lifecycle:
//!
//! 1. The player is seated in the room resolved from the URL path, or is
//!    turned away with an error when the room is full.
//! 2. A write task drains the player's mpsc receiver into the socket while
//!    the read loop processes [`ClientMessage`]s against the room.
//! 3. On disconnect the player is removed and the opponent is notified.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::Mutex;

use connect4_core::protocol::{ClientMessage, ServerMessage};

use crate::room::Room;

/// Drive a single WebSocket connection bound to `room`.
pub async fn handle_socket(socket: WebSocket, room: Arc<Mutex<Room>>) {
    let (mut ws_sink, mut ws_stream) = socket.split();

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let conn_id = {
        let mut room = room.lock().await;
        room.add_player(tx)
    };
    let Some(conn_id) = conn_id else {
        // Turn the player away before any channel exists.
        let err = ServerMessage::Error {
            error: "Game is full".to_string(),
        };
        if let Ok(json) = serde_json::to_string(&err) {
            let _ = ws_sink.send(Message::Text(json.into())).await;
        }
        let _ = ws_sink.close().await;
        return;
    };

    {
        let room = room.lock().await;
        tracing::info!(room = %room.room_id, conn = conn_id, "Player joined");
        room.broadcast_state();
    }

    // Write task: drain the player's mpsc receiver and forward messages as
    // WebSocket text frames.
    let write_handle = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(j) => j,
                Err(_) => continue,
            };
            if ws_sink.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // Read loop: deserialize ClientMessage, process, route responses.
    loop {
        match ws_stream.next().await {
            Some(Ok(Message::Text(text))) => {
                let msg: ClientMessage = match serde_json::from_str(&text) {
                    Ok(m) => m,
                    Err(e) => {
                        let room = room.lock().await;
                        room.send_to(
                            conn_id,
                            ServerMessage::Error {
                                error: format!("Invalid message: {e}"),
                            },
                        );
                        continue;
                    }
                };
                process_client_message(&msg, conn_id, &room).await;
            }
            Some(Ok(Message::Close(_))) | None => break,
            _ => continue,
        }
    }

    // Cleanup: free the seat and tell any remaining player what happened.
    write_handle.abort();
    let mut room = room.lock().await;
    room.remove_player(conn_id);
    if room.player_count() > 0 {
        room.broadcast_state();
    }
    tracing::info!(room = %room.room_id, conn = conn_id, "Player disconnected");
}

/// Process a single [`ClientMessage`] from a seated player.
async fn process_client_message(msg: &ClientMessage, conn_id: u64, room: &Arc<Mutex<Room>>) {
    match msg {
        ClientMessage::Move { col } => {
            let mut room = room.lock().await;
            let Some(player) = room.player_num(conn_id) else {
                return;
            };
            match room.make_move(*col, player) {
                Ok(()) => room.broadcast_state(),
                Err(reason) => {
                    // The rejected player gets the authoritative state back
                    // along with the reason.
                    let mut snap = room.snapshot_for(player);
                    snap.error = Some(reason.to_string());
                    room.send_to(conn_id, ServerMessage::State(snap));
                }
            }
        }
        ClientMessage::Reset { .. } => {
            let mut room = room.lock().await;
            room.reset();
            room.broadcast_state();
        }
        ClientMessage::Chat { message } => {
            let text = message.trim();
            if text.is_empty() {
                return;
            }
            let room = room.lock().await;
            let Some(player) = room.player_num(conn_id) else {
                return;
            };
            room.broadcast_chat(player, text);
        }
    }
}
