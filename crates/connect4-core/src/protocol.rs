use serde::{Deserialize, Serialize};

use crate::board::Grid;

/// Summary of one game room, as returned by `GET /rooms`.
///
/// Room lists are replaced wholesale on every lobby refresh — there is no
/// diffing against a previous list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomSummary {
    pub room_id: String,
    /// Number of players currently seated (0–2).
    pub players: usize,
    pub is_full: bool,
}

/// The `winner` field of a snapshot: a player number once someone has
/// connected four, or a server-side notice string (the original server uses
/// `"Opponent disconnected"`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Winner {
    Player(u8),
    Notice(String),
}

/// Notice the server reports when the other player drops mid-game.
pub const DISCONNECT_NOTICE: &str = "Opponent disconnected";

impl Winner {
    /// The winning player number, if the winner is a player at all.
    pub fn as_player(&self) -> Option<u8> {
        match self {
            Winner::Player(n) => Some(*n),
            Winner::Notice(_) => None,
        }
    }

    pub fn is_disconnect_notice(&self) -> bool {
        matches!(self, Winner::Notice(s) if s == DISCONNECT_NOTICE)
    }
}

/// One full server-pushed description of game state.
///
/// Field names are fixed by the wire protocol (camelCase JSON). The board is
/// always exactly 7 columns × 6 rows; serde rejects anything else.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub board: Grid,
    pub current_player: u8,
    pub game_active: bool,
    /// Both seats are taken and a game can be played.
    #[serde(default)]
    pub game_ready: bool,
    #[serde(default)]
    pub winner: Option<Winner>,
    #[serde(default)]
    pub draw: bool,
    /// The recipient's player number. Per-recipient: the same broadcast
    /// carries a different value to each seat.
    #[serde(default)]
    pub player_num: Option<u8>,
    /// Set when the snapshot reports a rejected action instead of progress.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Messages sent from server to client.
///
/// The wire protocol carries no type tag; payloads are told apart by their
/// fields, so the serde representation is untagged. Variant order matters:
/// chat frames carry `message` + `player`, snapshots always carry `board`,
/// and a bare `{"error": …}` is how the server rejects a connection to a
/// full room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ServerMessage {
    /// Chat line relayed to everyone in the room.
    Chat { message: String, player: u8 },

    /// Full game-state snapshot.
    State(GameSnapshot),

    /// Standalone error, sent before any snapshot (e.g. "Game is full").
    Error { error: String },
}

/// The literal `"reset"` action string.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResetAction {
    Reset,
}

/// Messages sent from client to server.
///
/// Untagged for the same reason as [`ServerMessage`]: the protocol fixes the
/// exact shapes `{"col": N}`, `{"action": "reset"}` and `{"message": …}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ClientMessage {
    /// Drop a piece into the given column (0-based).
    Move { col: usize },

    /// Ask the server to reset the room's game.
    Reset { action: ResetAction },

    /// Send a chat line to the room.
    Chat { message: String },
}

impl ClientMessage {
    /// The reset request, `{"action": "reset"}` on the wire.
    pub fn reset() -> Self {
        ClientMessage::Reset {
            action: ResetAction::Reset,
        }
    }

    /// Build a chat message from raw input.
    ///
    /// Trims surrounding whitespace and returns `None` when nothing remains,
    /// so empty submissions never reach the wire.
    pub fn chat(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(ClientMessage::Chat {
            message: trimmed.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::empty_grid;

    #[test]
    fn move_wire_shape() {
        let json = serde_json::to_string(&ClientMessage::Move { col: 3 }).unwrap();
        assert_eq!(json, r#"{"col":3}"#);
    }

    #[test]
    fn reset_wire_shape() {
        let json = serde_json::to_string(&ClientMessage::reset()).unwrap();
        assert_eq!(json, r#"{"action":"reset"}"#);
    }

    #[test]
    fn chat_wire_shape() {
        let json = serde_json::to_string(&ClientMessage::chat("  hello  ").unwrap()).unwrap();
        assert_eq!(json, r#"{"message":"hello"}"#);
    }

    #[test]
    fn chat_rejects_blank_input() {
        assert_eq!(ClientMessage::chat(""), None);
        assert_eq!(ClientMessage::chat("   \t  "), None);
    }

    #[test]
    fn client_messages_round_trip_untagged() {
        for msg in [
            ClientMessage::Move { col: 6 },
            ClientMessage::reset(),
            ClientMessage::chat("gg").unwrap(),
        ] {
            let json = serde_json::to_string(&msg).unwrap();
            let back: ClientMessage = serde_json::from_str(&json).unwrap();
            assert_eq!(back, msg);
        }
    }

    #[test]
    fn snapshot_parses_from_camel_case() {
        let json = r#"{
            "board": [[0,0,0,0,0,0,0],[0,0,0,0,0,0,0],[0,0,0,0,0,0,0],
                      [0,0,0,0,0,0,0],[0,0,0,0,0,0,0],[0,0,0,1,0,0,0]],
            "currentPlayer": 2,
            "gameActive": true,
            "gameReady": true,
            "winner": null,
            "draw": false,
            "playerNum": 1
        }"#;
        let msg: ServerMessage = serde_json::from_str(json).unwrap();
        let ServerMessage::State(snap) = msg else {
            panic!("expected a snapshot");
        };
        assert_eq!(snap.board[5][3], 1);
        assert_eq!(snap.current_player, 2);
        assert!(snap.game_active);
        assert_eq!(snap.player_num, Some(1));
        assert_eq!(snap.winner, None);
    }

    #[test]
    fn snapshot_rejects_wrong_dimensions() {
        // Five rows instead of six.
        let json = r#"{
            "board": [[0,0,0,0,0,0,0],[0,0,0,0,0,0,0],[0,0,0,0,0,0,0],
                      [0,0,0,0,0,0,0],[0,0,0,0,0,0,0]],
            "currentPlayer": 1,
            "gameActive": false
        }"#;
        assert!(serde_json::from_str::<GameSnapshot>(json).is_err());
    }

    #[test]
    fn chat_frame_is_not_mistaken_for_state() {
        let msg: ServerMessage =
            serde_json::from_str(r#"{"message":"hi there","player":2}"#).unwrap();
        assert_eq!(
            msg,
            ServerMessage::Chat {
                message: "hi there".to_string(),
                player: 2,
            }
        );
    }

    #[test]
    fn bare_error_parses() {
        let msg: ServerMessage = serde_json::from_str(r#"{"error":"Game is full"}"#).unwrap();
        assert_eq!(
            msg,
            ServerMessage::Error {
                error: "Game is full".to_string()
            }
        );
    }

    #[test]
    fn winner_is_player_or_notice() {
        let snap = GameSnapshot {
            board: empty_grid(),
            current_player: 1,
            game_active: false,
            game_ready: false,
            winner: Some(Winner::Player(2)),
            draw: false,
            player_num: Some(1),
            error: None,
        };
        let json = serde_json::to_string(&snap).unwrap();
        let back: GameSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.winner, Some(Winner::Player(2)));

        let json = json.replace(r#""winner":2"#, r#""winner":"Opponent disconnected""#);
        let back: GameSnapshot = serde_json::from_str(&json).unwrap();
        let winner = back.winner.unwrap();
        assert!(winner.is_disconnect_notice());
        assert_eq!(winner.as_player(), None);
    }
}
