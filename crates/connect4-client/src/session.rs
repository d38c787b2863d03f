//! One client session for one room.
//!
//! [`GameSession`] owns the [`NetClient`] and the [`ClientState`], acting as
//! the single mutation gateway between the network and the frontend. It is
//! constructed per room join and dropped on leave — dropping it closes the
//! outbound channel, which ends the background writer task and the
//! connection with it.

use connect4_core::protocol::ClientMessage;

use crate::net_client::{ConnectError, NetClient};
use crate::state::{ClientState, LogCategory, StateChanged};

/// Outcome of processing a single network event.
#[derive(Debug)]
pub enum Poll {
    /// A server message was applied; the flags describe what was modified.
    Updated(StateChanged),
    /// The server closed the connection.
    Disconnected,
    /// No event was available (channel empty).
    Empty,
}

/// Owns the network client and session state for one room.
pub struct GameSession {
    net: NetClient,
    pub state: ClientState,
}

impl GameSession {
    /// Connect to a room endpoint (e.g. `ws://host/ws/room-1`).
    ///
    /// The server pushes the first snapshot unprompted; callers just start
    /// receiving.
    pub async fn connect(ws_url: &str) -> Result<Self, ConnectError> {
        let net = NetClient::connect(ws_url).await?;
        Ok(Self {
            net,
            state: ClientState::new(),
        })
    }

    /// Await the next network event. Useful in `tokio::select!` loops.
    pub async fn recv(&mut self) -> Poll {
        match self.net.incoming.recv().await {
            Some(msg) => Poll::Updated(self.state.apply_server_message(&msg)),
            None => {
                self.state.mark_disconnected();
                Poll::Disconnected
            }
        }
    }

    /// Try to receive and process one network event without blocking.
    pub fn try_recv(&mut self) -> Poll {
        use tokio::sync::mpsc::error::TryRecvError;
        match self.net.incoming.try_recv() {
            Ok(msg) => Poll::Updated(self.state.apply_server_message(&msg)),
            Err(TryRecvError::Empty) => Poll::Empty,
            Err(TryRecvError::Disconnected) => {
                self.state.mark_disconnected();
                Poll::Disconnected
            }
        }
    }

    /// Send a move intent for the given column.
    pub fn send_move(&self, col: usize) {
        let _ = self.net.send(ClientMessage::Move { col });
    }

    /// Ask the server to reset the room's game.
    pub fn send_reset(&self) {
        let _ = self.net.send(ClientMessage::reset());
    }

    /// Send a chat line. Input is trimmed; returns `false` (and sends
    /// nothing) when nothing remains.
    pub fn send_chat(&self, input: &str) -> bool {
        match ClientMessage::chat(input) {
            Some(msg) => {
                let _ = self.net.send(msg);
                true
            }
            None => false,
        }
    }

    /// Append a local feedback message to the session's event log.
    pub fn add_message(&mut self, text: String, category: LogCategory) {
        self.state.add_message(text, category);
    }
}
