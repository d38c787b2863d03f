//! One Connect-Four game room.
//!
//! A room seats up to two players; the player number is the seat position
//! plus one. Each seat holds an outbound [`mpsc`] sender that the WebSocket
//! write loop drains, so broadcasting never blocks on a slow socket.
//! Snapshots are per-recipient: the same broadcast carries each seat its
//! own `playerNum`.

use tokio::sync::mpsc;

use connect4_core::board::{self, Grid};
use connect4_core::protocol::{DISCONNECT_NOTICE, GameSnapshot, ServerMessage, Winner};

/// Maximum players per room.
pub const ROOM_CAPACITY: usize = 2;

pub type PlayerTx = mpsc::UnboundedSender<ServerMessage>;
pub type PlayerRx = mpsc::UnboundedReceiver<ServerMessage>;

struct Seat {
    conn_id: u64,
    tx: PlayerTx,
}

/// State and rules of a single game room.
pub struct Room {
    pub room_id: String,
    board: Grid,
    current_player: u8,
    game_active: bool,
    game_ready: bool,
    winner: Option<Winner>,
    draw: bool,
    seats: Vec<Seat>,
    next_conn_id: u64,
}

impl Room {
    pub fn new(room_id: &str) -> Self {
        Self {
            room_id: room_id.to_string(),
            board: board::empty_grid(),
            current_player: 1,
            game_active: false,
            game_ready: false,
            winner: None,
            draw: false,
            seats: Vec::new(),
            next_conn_id: 0,
        }
    }

    pub fn player_count(&self) -> usize {
        self.seats.len()
    }

    pub fn is_full(&self) -> bool {
        self.seats.len() >= ROOM_CAPACITY
    }

    /// Reset the game to its initial state. With both seats taken the next
    /// game is immediately ready and active.
    pub fn reset(&mut self) {
        self.board = board::empty_grid();
        self.current_player = 1;
        self.winner = None;
        self.draw = false;
        let full = self.is_full();
        self.game_active = full;
        self.game_ready = full;
    }

    /// Seat a new player, returning their connection id, or `None` when the
    /// room is full. Reaching two players starts a fresh game.
    pub fn add_player(&mut self, tx: PlayerTx) -> Option<u64> {
        if self.is_full() {
            return None;
        }
        let conn_id = self.next_conn_id;
        self.next_conn_id += 1;
        self.seats.push(Seat { conn_id, tx });
        self.reset();
        Some(conn_id)
    }

    /// Remove a player. If an opponent remains, the aborted game reports
    /// the disconnect notice as its winner until a new game starts.
    pub fn remove_player(&mut self, conn_id: u64) {
        self.seats.retain(|s| s.conn_id != conn_id);
        self.reset();
        if !self.seats.is_empty() {
            self.winner = Some(Winner::Notice(DISCONNECT_NOTICE.to_string()));
        }
    }

    /// The player number for a connection (seat position + 1).
    pub fn player_num(&self, conn_id: u64) -> Option<u8> {
        self.seats
            .iter()
            .position(|s| s.conn_id == conn_id)
            .map(|i| i as u8 + 1)
    }

    /// Attempt a move, reporting a rejection reason on failure.
    pub fn make_move(&mut self, col: usize, player: u8) -> Result<(), &'static str> {
        if !self.game_active {
            return Err("Game is not active.");
        }
        if self.current_player != player {
            return Err("Not your turn.");
        }
        if col >= board::COLS {
            return Err("Invalid column.");
        }
        let Some(row) = board::drop_piece(&mut self.board, col, player) else {
            return Err("Column is full.");
        };

        if board::is_winning_move(&self.board, row, col) {
            self.game_active = false;
            self.winner = Some(Winner::Player(player));
        } else if board::is_full(&self.board) {
            self.game_active = false;
            self.draw = true;
        } else {
            self.current_player = if player == 1 { 2 } else { 1 };
        }
        Ok(())
    }

    /// The game state from one player's perspective.
    pub fn snapshot_for(&self, player_num: u8) -> GameSnapshot {
        GameSnapshot {
            board: self.board,
            current_player: self.current_player,
            game_active: self.game_active,
            game_ready: self.game_ready,
            winner: self.winner.clone(),
            draw: self.draw,
            player_num: Some(player_num),
            error: None,
        }
    }

    /// Push each seat its own snapshot.
    pub fn broadcast_state(&self) {
        for (i, seat) in self.seats.iter().enumerate() {
            // Ignore send failure — the player may have just disconnected.
            let _ = seat
                .tx
                .send(ServerMessage::State(self.snapshot_for(i as u8 + 1)));
        }
    }

    /// Relay a chat line to everyone in the room.
    pub fn broadcast_chat(&self, player: u8, message: &str) {
        let msg = ServerMessage::Chat {
            message: message.to_string(),
            player,
        };
        for seat in &self.seats {
            let _ = seat.tx.send(msg.clone());
        }
    }

    /// Send a message to one connection.
    pub fn send_to(&self, conn_id: u64, msg: ServerMessage) {
        if let Some(seat) = self.seats.iter().find(|s| s.conn_id == conn_id) {
            let _ = seat.tx.send(msg);
        }
    }
}
