//! Client-side session state for one room.
//!
//! [`ClientState`] mirrors the last server snapshot: a shadow copy of the
//! grid (used for incremental reconciliation), the local player identity,
//! the game flags the status line is derived from, and a bounded event log
//! for chat and errors. All mutation goes through
//! [`ClientState::apply_server_message`], which reports what changed so the
//! frontend can re-render selectively.

use std::collections::VecDeque;

use connect4_core::board::{self, EMPTY, Grid};
use connect4_core::protocol::{GameSnapshot, ServerMessage, Winner};

/// Semantic category for log entries. The UI layer decides how to style each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogCategory {
    System,
    Chat,
    Error,
}

/// An entry in the session's event log.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Chat line from a player in the room.
    Chat { player: u8, message: String },
    /// Error reported by the server.
    ServerError { message: String },
    /// The connection closed.
    Disconnected,
    /// Ad-hoc local text (used by the UI for feedback).
    Text { text: String, category: LogCategory },
}

impl GameEvent {
    pub fn category(&self) -> LogCategory {
        match self {
            GameEvent::Chat { .. } => LogCategory::Chat,
            GameEvent::ServerError { .. } | GameEvent::Disconnected => LogCategory::Error,
            GameEvent::Text { category, .. } => *category,
        }
    }
}

/// Describes what changed after applying a server message, so the frontend
/// can decide what to redraw. All flags default to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateChanged {
    /// One or more board cells changed.
    pub board: bool,
    /// The status line would now read differently.
    pub status: bool,
    /// The local player number was assigned.
    pub identity: bool,
    /// A log entry was appended.
    pub log: bool,
}

impl StateChanged {
    pub fn any(self) -> bool {
        self.board || self.status || self.identity || self.log
    }
}

/// All game data the client tracks for one room session.
pub struct ClientState {
    /// Mirror of the last applied snapshot's grid. Invariant: equal to that
    /// grid cell-for-cell after every reconciliation.
    pub shadow: Grid,
    /// Our player number, assigned once from the first snapshot carrying it.
    pub player_num: Option<u8>,
    pub current_player: u8,
    pub game_active: bool,
    pub game_ready: bool,
    pub winner: Option<Winner>,
    pub draw: bool,
    /// Connection status; cleared when the socket closes.
    pub connected: bool,
    /// Whether any snapshot has been applied yet.
    pub seen_snapshot: bool,
    /// The most recently placed piece, for the transient highlight.
    pub last_placed: Option<(usize, usize)>,
    /// A server error that ended the session before it began (e.g. joining
    /// a full room). The frontend returns to the lobby when this is set.
    pub fatal_error: Option<String>,
    /// Chat lines, errors, and local feedback (most recent last).
    pub events: VecDeque<GameEvent>,
}

/// Keep at most this many log entries.
const EVENT_LOG_CAP: usize = 100;

impl ClientState {
    pub fn new() -> Self {
        Self {
            shadow: board::empty_grid(),
            player_num: None,
            current_player: 1,
            game_active: false,
            game_ready: false,
            winner: None,
            draw: false,
            connected: true,
            seen_snapshot: false,
            last_placed: None,
            fatal_error: None,
            events: VecDeque::new(),
        }
    }

    /// Append an event, keeping only the most recent entries.
    pub fn add_event(&mut self, event: GameEvent) {
        self.events.push_back(event);
        if self.events.len() > EVENT_LOG_CAP {
            self.events.pop_front();
        }
    }

    /// Convenience: append a [`GameEvent::Text`] for ad-hoc messages.
    pub fn add_message(&mut self, text: String, category: LogCategory) {
        self.add_event(GameEvent::Text { text, category });
    }

    /// Apply one server message, returning which aspects changed.
    pub fn apply_server_message(&mut self, msg: &ServerMessage) -> StateChanged {
        let mut changed = StateChanged::default();

        match msg {
            ServerMessage::Chat { message, player } => {
                self.add_event(GameEvent::Chat {
                    player: *player,
                    message: message.clone(),
                });
                changed.log = true;
            }
            ServerMessage::Error { error } => {
                self.handle_error(error, &mut changed);
            }
            ServerMessage::State(snap) => {
                if let Some(error) = &snap.error {
                    // An error snapshot reports a rejected action; the board
                    // it would carry is not applied.
                    self.handle_error(error, &mut changed);
                } else {
                    self.apply_snapshot(snap, &mut changed);
                }
            }
        }

        changed
    }

    /// Mark the session as disconnected (the socket closed).
    ///
    /// The status line reports the disconnection and the player-identity
    /// display is cleared; there is no automatic reconnect.
    pub fn mark_disconnected(&mut self) {
        self.connected = false;
        self.add_event(GameEvent::Disconnected);
    }

    /// The single status line, by fixed priority: disconnection, a player
    /// having won, a draw, whose turn it is, the opponent-disconnected
    /// notice, then generic waiting text.
    pub fn status_line(&self) -> String {
        if !self.connected {
            return "Disconnected from server.".to_string();
        }
        if let Some(winner) = self.winner.as_ref().and_then(Winner::as_player) {
            return if self.player_num == Some(winner) {
                "You win!".to_string()
            } else {
                format!("Player {winner} wins!")
            };
        }
        if self.draw {
            return "It's a draw!".to_string();
        }
        if self.game_active {
            return if self.player_num == Some(self.current_player) {
                "Your turn".to_string()
            } else {
                format!("Player {}'s turn", self.current_player)
            };
        }
        if self.winner.as_ref().is_some_and(Winner::is_disconnect_notice) {
            return "Opponent disconnected".to_string();
        }
        if !self.seen_snapshot {
            return "Waiting for opponent...".to_string();
        }
        "Waiting for players...".to_string()
    }

    /// The "You are Player N" line, or `None` when unknown or disconnected.
    pub fn identity_line(&self) -> Option<String> {
        if !self.connected {
            return None;
        }
        self.player_num.map(|n| format!("You are Player {n}"))
    }

    // -- private -----------------------------------------------------------

    fn handle_error(&mut self, error: &str, changed: &mut StateChanged) {
        // An error before we were ever seated (e.g. "Game is full") ends the
        // session; later errors are informational.
        if self.player_num.is_none() {
            self.fatal_error = Some(error.to_string());
            changed.status = true;
        }
        self.add_event(GameEvent::ServerError {
            message: error.to_string(),
        });
        changed.log = true;
    }

    fn apply_snapshot(&mut self, snap: &GameSnapshot, changed: &mut StateChanged) {
        // Assign the player identity once, from the first snapshot that
        // carries it.
        if self.player_num.is_none()
            && let Some(num) = snap.player_num
        {
            self.player_num = Some(num);
            changed.identity = true;
        }

        changed.board = self.reconcile_board(&snap.board);

        if (
            self.current_player,
            self.game_active,
            self.game_ready,
            &self.winner,
            self.draw,
        ) != (
            snap.current_player,
            snap.game_active,
            snap.game_ready,
            &snap.winner,
            snap.draw,
        ) || !self.seen_snapshot
        {
            changed.status = true;
        }

        self.current_player = snap.current_player;
        self.game_active = snap.game_active;
        self.game_ready = snap.game_ready;
        self.winner = snap.winner.clone();
        self.draw = snap.draw;
        self.seen_snapshot = true;
    }

    /// Incremental reconciliation: compare each incoming cell against the
    /// shadow board, adopt the new grid, and move the "just placed"
    /// highlight to the most recently changed non-empty cell.
    ///
    /// Returns whether any cell changed. Afterwards the shadow equals the
    /// snapshot's grid cell-for-cell.
    fn reconcile_board(&mut self, grid: &Grid) -> bool {
        let mut any_changed = false;
        let mut newly_placed = None;

        for (r, row) in grid.iter().enumerate() {
            for (c, &cell) in row.iter().enumerate() {
                if self.shadow[r][c] != cell {
                    any_changed = true;
                    if cell != EMPTY {
                        newly_placed = Some((r, c));
                    }
                }
            }
        }

        if newly_placed.is_some() {
            self.last_placed = newly_placed;
        } else if let Some((r, c)) = self.last_placed {
            // The highlighted piece may have been cleared (reset).
            if grid[r][c] == EMPTY {
                self.last_placed = None;
            }
        }

        self.shadow = *grid;
        any_changed
    }
}

impl Default for ClientState {
    fn default() -> Self {
        Self::new()
    }
}
