//! End-to-end tests driving the server through the real client stack.

use std::sync::Arc;
use std::time::Duration;

use connect4_client::lobby::LobbyClient;
use connect4_client::session::{GameSession, Poll};
use connect4_core::protocol::Winner;
use connect4_server::lobby::Lobby;

/// Start a server with `rooms` pre-created rooms on an ephemeral port and
/// return its base HTTP URL.
async fn start_server(rooms: usize) -> String {
    let lobby = Arc::new(Lobby::new());
    for i in 1..=rooms {
        lobby.create_room(&format!("room_{i}")).await;
    }
    let app = connect4_server::router(lobby);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Pump a session's incoming events until `done` holds (or time out).
async fn pump_until(session: &mut GameSession, done: impl Fn(&GameSession) -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !done(session) {
            if let Poll::Disconnected = session.recv().await {
                break;
            }
        }
    })
    .await
    .expect("timed out waiting for expected state");
}

#[tokio::test]
async fn lobby_lists_rooms_with_occupancy() {
    let base = start_server(2).await;
    let lobby = LobbyClient::new(&base);

    let rooms = lobby.fetch_rooms().await.unwrap();
    assert_eq!(rooms.len(), 2);
    assert!(rooms.iter().all(|r| r.players == 0 && !r.is_full));

    let mut p1 = GameSession::connect(&lobby.ws_url_for_room("room_1")).await.unwrap();
    pump_until(&mut p1, |s| s.state.seen_snapshot).await;

    let rooms = lobby.fetch_rooms().await.unwrap();
    let room_1 = rooms.iter().find(|r| r.room_id == "room_1").unwrap();
    assert_eq!(room_1.players, 1);
    assert!(!room_1.is_full);
}

#[tokio::test]
async fn unknown_room_is_rejected_at_the_door() {
    let base = start_server(1).await;
    let lobby = LobbyClient::new(&base);
    assert!(GameSession::connect(&lobby.ws_url_for_room("room_99")).await.is_err());
}

#[tokio::test]
async fn two_players_play_to_a_vertical_win() {
    let base = start_server(1).await;
    let lobby = LobbyClient::new(&base);
    let url = lobby.ws_url_for_room("room_1");

    let mut p1 = GameSession::connect(&url).await.unwrap();
    pump_until(&mut p1, |s| s.state.player_num == Some(1)).await;
    assert_eq!(p1.state.status_line(), "Waiting for players...");

    let mut p2 = GameSession::connect(&url).await.unwrap();
    pump_until(&mut p2, |s| s.state.player_num == Some(2)).await;
    pump_until(&mut p1, |s| s.state.game_active).await;
    assert_eq!(p1.state.status_line(), "Your turn");
    assert_eq!(p2.state.status_line(), "Player 1's turn");

    // P1 stacks column 0, P2 stacks column 1, until P1 connects four.
    for round in 0..4 {
        p1.send_move(0);
        pump_until(&mut p1, |s| s.state.shadow[5 - round][0] == 1).await;
        if round < 3 {
            p2.send_move(1);
            pump_until(&mut p1, |s| s.state.shadow[5 - round][1] == 2).await;
        }
    }

    pump_until(&mut p1, |s| s.state.winner.is_some()).await;
    pump_until(&mut p2, |s| s.state.winner.is_some()).await;
    assert_eq!(p1.state.winner, Some(Winner::Player(1)));
    assert_eq!(p1.state.status_line(), "You win!");
    assert_eq!(p2.state.status_line(), "Player 1 wins!");
    assert_eq!(p1.state.last_placed, Some((2, 0)));
}

#[tokio::test]
async fn out_of_turn_move_reports_an_error_without_touching_the_board() {
    let base = start_server(1).await;
    let lobby = LobbyClient::new(&base);
    let url = lobby.ws_url_for_room("room_1");

    let mut p1 = GameSession::connect(&url).await.unwrap();
    let mut p2 = GameSession::connect(&url).await.unwrap();
    pump_until(&mut p1, |s| s.state.game_active).await;
    pump_until(&mut p2, |s| s.state.game_active).await;

    p2.send_move(3);
    pump_until(&mut p2, |s| {
        s.state.events.iter().any(|e| {
            matches!(e, connect4_client::state::GameEvent::ServerError { message }
                if message == "Not your turn.")
        })
    })
    .await;
    assert_eq!(p2.state.shadow, connect4_core::board::empty_grid());
    assert!(p2.state.fatal_error.is_none());
}

#[tokio::test]
async fn third_player_is_turned_away_as_full() {
    let base = start_server(1).await;
    let lobby = LobbyClient::new(&base);
    let url = lobby.ws_url_for_room("room_1");

    let mut p1 = GameSession::connect(&url).await.unwrap();
    let mut p2 = GameSession::connect(&url).await.unwrap();
    pump_until(&mut p1, |s| s.state.game_active).await;
    pump_until(&mut p2, |s| s.state.game_active).await;

    let rooms = lobby.fetch_rooms().await.unwrap();
    assert!(rooms[0].is_full);

    let mut p3 = GameSession::connect(&url).await.unwrap();
    pump_until(&mut p3, |s| s.state.fatal_error.is_some()).await;
    assert_eq!(p3.state.fatal_error.as_deref(), Some("Game is full"));
    assert_eq!(p3.state.player_num, None);
}

#[tokio::test]
async fn disconnect_notifies_and_a_rematch_follows() {
    let base = start_server(1).await;
    let lobby = LobbyClient::new(&base);
    let url = lobby.ws_url_for_room("room_1");

    let mut p1 = GameSession::connect(&url).await.unwrap();
    let p2 = GameSession::connect(&url).await.unwrap();
    pump_until(&mut p1, |s| s.state.game_active).await;

    // Dropping the session closes the socket.
    drop(p2);
    pump_until(&mut p1, |s| {
        s.state.winner.as_ref().is_some_and(Winner::is_disconnect_notice)
    })
    .await;
    assert_eq!(p1.state.status_line(), "Opponent disconnected");
    assert!(!p1.state.game_active);

    // A fresh opponent clears the notice and starts a new game.
    let mut p3 = GameSession::connect(&url).await.unwrap();
    pump_until(&mut p3, |s| s.state.player_num == Some(2)).await;
    pump_until(&mut p1, |s| s.state.game_active).await;
    assert_eq!(p1.state.winner, None);
    assert_eq!(p1.state.status_line(), "Your turn");
}

#[tokio::test]
async fn chat_and_reset_round_trip() {
    let base = start_server(1).await;
    let lobby = LobbyClient::new(&base);
    let url = lobby.ws_url_for_room("room_1");

    let mut p1 = GameSession::connect(&url).await.unwrap();
    let mut p2 = GameSession::connect(&url).await.unwrap();
    pump_until(&mut p1, |s| s.state.game_active).await;
    pump_until(&mut p2, |s| s.state.game_active).await;

    assert!(p1.send_chat("  hello there  "));
    let received = |s: &GameSession| {
        s.state.events.iter().any(|e| {
            matches!(e, connect4_client::state::GameEvent::Chat { player: 1, message }
                if message == "hello there")
        })
    };
    pump_until(&mut p1, received).await;
    pump_until(&mut p2, received).await;

    p1.send_move(4);
    pump_until(&mut p2, |s| s.state.shadow[5][4] == 1).await;

    p2.send_reset();
    pump_until(&mut p2, |s| s.state.shadow[5][4] == 0).await;
    assert!(p2.state.game_active);
    assert_eq!(p2.state.status_line(), "Player 1's turn");
}
