//! Channel-based WebSocket client for a game room.
//!
//! Spawns background reader/writer tasks over a `tokio-tungstenite`
//! connection and exposes channels so that the frontend can send and receive
//! messages without owning the socket directly.

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use connect4_core::protocol::{ClientMessage, ServerMessage};

/// Errors establishing a room connection.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("WebSocket connect failed: {0}")]
    Handshake(String),
}

/// Try to deserialize a raw text frame as a [`ServerMessage`].
///
/// Returns `None` for empty/whitespace-only input or unrecognised JSON;
/// the payloads are not schema-validated beyond their structural shape.
pub fn parse_server_frame(text: &str) -> Option<ServerMessage> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    serde_json::from_str::<ServerMessage>(trimmed).ok()
}

/// A channel-based network client for one room connection.
///
/// The returned client exposes:
/// - [`incoming`](NetClient::incoming) — an
///   [`mpsc::UnboundedReceiver<ServerMessage>`] for server messages. The
///   channel closing signals disconnection.
/// - [`send`](NetClient::send) — a non-async, non-blocking method to enqueue
///   a [`ClientMessage`] for transmission.
///
/// Background tasks handle the actual I/O, making this safe to use from any
/// async context.
pub struct NetClient {
    /// Receive parsed server messages. Channel close = disconnected.
    pub incoming: mpsc::UnboundedReceiver<ServerMessage>,
    /// Send-side of the writer channel (kept for [`Self::send`]).
    outgoing: mpsc::UnboundedSender<ClientMessage>,
}

impl NetClient {
    /// Connect to a room endpoint (e.g. `ws://host/ws/room-1`) and spawn the
    /// background I/O tasks. No handshake message is required — the server
    /// seats the player and pushes a first snapshot on its own.
    pub async fn connect(url: &str) -> Result<Self, ConnectError> {
        let (stream, _response) = connect_async(url)
            .await
            .map_err(|e| ConnectError::Handshake(e.to_string()))?;
        let (mut sink, mut ws_stream) = stream.split();

        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<ClientMessage>();

        // Reader task: parse text frames, skip everything else.
        tokio::spawn(async move {
            while let Some(frame) = ws_stream.next().await {
                match frame {
                    Ok(Message::Text(text)) => {
                        if let Some(msg) = parse_server_frame(&text)
                            && msg_tx.send(msg).is_err()
                        {
                            break;
                        }
                    }
                    Ok(Message::Close(_)) | Err(_) => break,
                    Ok(_) => {} // binary/ping/pong frames
                }
            }
            // Stream ended or error — channel drops, signalling disconnect.
        });

        // Writer task: serialize and push outbound messages.
        tokio::spawn(async move {
            while let Some(msg) = cmd_rx.recv().await {
                let json = match serde_json::to_string(&msg) {
                    Ok(j) => j,
                    Err(_) => continue,
                };
                if sink.send(Message::text(json)).await.is_err() {
                    break;
                }
            }
            // Channel closed (session dropped): close the socket so the
            // server sees the departure promptly.
            let _ = sink.close().await;
        });

        Ok(Self {
            incoming: msg_rx,
            outgoing: cmd_tx,
        })
    }

    /// Enqueue a [`ClientMessage`] for transmission to the server.
    ///
    /// Non-blocking — the message is written to a channel and the background
    /// writer task handles the actual I/O.
    pub fn send(&self, msg: ClientMessage) -> Result<(), mpsc::error::SendError<ClientMessage>> {
        self.outgoing.send(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use connect4_core::protocol::ServerMessage;

    #[test]
    fn blank_frames_are_skipped() {
        assert!(parse_server_frame("").is_none());
        assert!(parse_server_frame("   \n").is_none());
    }

    #[test]
    fn garbage_frames_are_skipped() {
        assert!(parse_server_frame("not json").is_none());
        assert!(parse_server_frame(r#"{"unexpected": true}"#).is_none());
    }

    #[test]
    fn chat_and_error_frames_parse() {
        assert!(matches!(
            parse_server_frame(r#"{"message":"hi","player":1}"#),
            Some(ServerMessage::Chat { .. })
        ));
        assert!(matches!(
            parse_server_frame(r#"{"error":"Game is full"}"#),
            Some(ServerMessage::Error { .. })
        ));
    }
}
