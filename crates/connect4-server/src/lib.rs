//! Multi-room Axum Connect-Four server.
//!
//! # Routes
//!
//! | Method | Path             | Description                            |
//! |--------|------------------|----------------------------------------|
//! | `GET`  | `/rooms`         | List rooms with their occupancy (JSON) |
//! | `GET`  | `/ws/{room_id}`  | WebSocket upgrade into a game room     |

pub mod lobby;
pub mod room;
pub mod ws;

use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;

use connect4_core::protocol::RoomSummary;
use lobby::Lobby;

/// Shared application state available to all handlers.
#[derive(Clone)]
struct AppState {
    lobby: Arc<Lobby>,
}

/// Build the application router over an existing lobby.
pub fn router(lobby: Arc<Lobby>) -> Router {
    Router::new()
        .route("/rooms", get(rooms_handler))
        .route("/ws/{room_id}", get(ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(AppState { lobby })
}

/// `GET /rooms` — lobby listing for room pickers.
async fn rooms_handler(State(state): State<AppState>) -> Json<Vec<RoomSummary>> {
    Json(state.lobby.rooms_info().await)
}

/// `GET /ws/{room_id}` — upgrade to WebSocket and hand off to
/// [`ws::handle_socket`]. Unknown rooms are a 404, not an implicit create.
async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(room_id): Path<String>,
    State(state): State<AppState>,
) -> Response {
    match state.lobby.get_room(&room_id).await {
        Some(room) => ws.on_upgrade(move |socket| ws::handle_socket(socket, room)),
        None => (StatusCode::NOT_FOUND, "No such room").into_response(),
    }
}
