//! Client orchestrator — connects the lobby, the game session, and the TUI.
//!
//! Owns the two event loops:
//! - the lobby loop, which refreshes the room listing on a timer, and
//! - the game loop, which drives a [`GameSession`] for one room.
//!
//! All game state lives in `connect4_client` and all rendering in
//! [`crate::tui`]; this module only routes events between them.

use std::time::Duration;

use connect4_client::lobby::{LobbyClient, REFRESH_INTERVAL};
use connect4_client::session::{GameSession, Poll};
use connect4_core::protocol::RoomSummary;
use tokio::time::Instant;

use crate::tui::{GameIntent, LobbyIntent, Tui};

const INPUT_TICK: Duration = Duration::from_millis(50);

/// How the user left a game room.
enum GameOutcome {
    /// Back to the lobby, optionally with a message to show there.
    Lobby(Option<String>),
    /// Close the application.
    Quit,
}

/// What the lobby loop resolved to.
enum LobbyChoice {
    Join(String),
    Quit,
}

/// Run the full client against the given server base URL.
pub async fn run(server_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let lobby = LobbyClient::new(server_url);

    let mut tui = Tui::setup()?;
    let result = run_outer_loop(&mut tui, &lobby).await;
    tui.teardown()?;
    result
}

/// Alternate between the lobby and game rooms until the user quits.
async fn run_outer_loop(
    tui: &mut Tui,
    lobby: &LobbyClient,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut notice: Option<String> = None;

    loop {
        match run_lobby(tui, lobby, notice.take()).await? {
            LobbyChoice::Quit => break,
            LobbyChoice::Join(room_id) => {
                let ws_url = lobby.ws_url_for_room(&room_id);
                match GameSession::connect(&ws_url).await {
                    Ok(session) => {
                        tui.enter_room();
                        match run_game(tui, session, &room_id).await? {
                            GameOutcome::Lobby(msg) => notice = msg,
                            GameOutcome::Quit => break,
                        }
                    }
                    Err(e) => notice = Some(format!("Could not join {room_id}: {e}")),
                }
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Lobby loop
// ---------------------------------------------------------------------------

async fn run_lobby(
    tui: &mut Tui,
    lobby: &LobbyClient,
    notice: Option<String>,
) -> Result<LobbyChoice, Box<dyn std::error::Error>> {
    let mut rooms: Vec<RoomSummary> = Vec::new();
    let mut error: Option<String> = notice;
    let mut next_refresh = Instant::now();

    loop {
        if Instant::now() >= next_refresh {
            match lobby.fetch_rooms().await {
                Ok(list) => {
                    rooms = list;
                    error = None;
                }
                // Keep the last good listing on screen with the failure.
                Err(e) => error = Some(format!("Could not reach server: {e}")),
            }
            next_refresh = Instant::now() + REFRESH_INTERVAL;
        }

        tui.render_lobby(&rooms, error.as_deref())?;

        tokio::time::sleep(INPUT_TICK).await;
        match tui.poll_lobby_input(&rooms)? {
            LobbyIntent::Quit => return Ok(LobbyChoice::Quit),
            LobbyIntent::Join(room_id) => return Ok(LobbyChoice::Join(room_id)),
            LobbyIntent::Refresh => next_refresh = Instant::now(),
            LobbyIntent::None => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Game loop
// ---------------------------------------------------------------------------

async fn run_game(
    tui: &mut Tui,
    mut session: GameSession,
    room_id: &str,
) -> Result<GameOutcome, Box<dyn std::error::Error>> {
    loop {
        tui.render_game(&session.state, room_id)?;

        // A rejection at the door (e.g. a full room) sends us straight back.
        if let Some(err) = session.state.fatal_error.clone() {
            return Ok(GameOutcome::Lobby(Some(err)));
        }

        if session.state.connected {
            tokio::select! {
                poll = session.recv() => {
                    match poll {
                        Poll::Updated(_) | Poll::Empty => {}
                        // Stay on screen so the user can read the status;
                        // the input-only branch below takes over.
                        Poll::Disconnected => {}
                    }
                }

                _ = tokio::time::sleep(INPUT_TICK) => {
                    if let Some(outcome) = handle_game_input(tui, &mut session)? {
                        return Ok(outcome);
                    }
                }
            }
        } else {
            tokio::time::sleep(INPUT_TICK).await;
            if let Some(outcome) = handle_game_input(tui, &mut session)? {
                return Ok(outcome);
            }
        }
    }
}

/// Process one tick of game input; `Some` ends the game loop.
fn handle_game_input(
    tui: &mut Tui,
    session: &mut GameSession,
) -> std::io::Result<Option<GameOutcome>> {
    match tui.poll_game_input(&session.state)? {
        GameIntent::Quit => return Ok(Some(GameOutcome::Quit)),
        GameIntent::Leave => return Ok(Some(GameOutcome::Lobby(None))),
        GameIntent::Drop(col) => session.send_move(col),
        GameIntent::Reset => session.send_reset(),
        GameIntent::Chat(text) => {
            session.send_chat(&text);
        }
        GameIntent::Feedback(text, category) => session.add_message(text, category),
        GameIntent::None => {}
    }
    Ok(None)
}
