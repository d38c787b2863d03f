//! Lobby access: the room list endpoint and room URL derivation.
//!
//! The lobby is plain request/response: `GET {base}/rooms` returns the full
//! room list, which the UI replaces wholesale each refresh. A failed fetch
//! is reported inline and recovery is simply the next periodic attempt —
//! no retry or backoff of its own.

use std::time::Duration;

use thiserror::Error;

use connect4_core::protocol::RoomSummary;

/// Fixed interval between automatic room-list refreshes.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(5);

/// Errors fetching the room list.
#[derive(Debug, Error)]
pub enum LobbyError {
    #[error("room list request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// HTTP client for the lobby endpoints of one game server.
pub struct LobbyClient {
    http: reqwest::Client,
    base_url: String,
}

impl LobbyClient {
    /// Create a client for the given server base URL
    /// (e.g. `http://127.0.0.1:8000`). A trailing slash is tolerated.
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the current room list.
    pub async fn fetch_rooms(&self) -> Result<Vec<RoomSummary>, LobbyError> {
        let url = format!("{}/rooms", self.base_url);
        let rooms = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<RoomSummary>>()
            .await?;
        Ok(rooms)
    }

    /// Derive the WebSocket URL for a room from the server base URL,
    /// mapping `http` → `ws` and `https` → `wss`.
    pub fn ws_url_for_room(&self, room_id: &str) -> String {
        let base = if let Some(rest) = self.base_url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.base_url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            self.base_url.clone()
        };
        format!("{base}/ws/{room_id}")
    }
}
