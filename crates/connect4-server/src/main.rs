use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use connect4_server::lobby::Lobby;

#[tokio::main]
async fn main() {
    // Initialise tracing (respects RUST_LOG env var).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let lobby = Arc::new(Lobby::new());

    // Pre-create the fixed set of rooms the lobby advertises.
    let room_count: usize = std::env::var("DEFAULT_ROOMS")
        .ok()
        .and_then(|n| n.parse().ok())
        .unwrap_or(4);
    for i in 1..=room_count {
        lobby.create_room(&format!("room_{i}")).await;
    }

    let app = connect4_server::router(lobby);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Connect-Four server listening on {addr} ({room_count} rooms)");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
