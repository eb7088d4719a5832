//! Room coordination service for typing races: tracks rooms and their
//! members, hands out paragraphs, relays standings and declares winners.

pub mod config;
pub mod db;
pub mod passages;
pub mod room;
pub mod socket;

use axum::{
    extract::{State, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
    Router,
};
use dashmap::DashMap;
use db::PassageSource;
use room::Room;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
};
use tracing::info;

pub type Rooms = Arc<DashMap<String, Arc<Room>>>;

#[derive(Clone)]
pub struct AppState {
    pub rooms: Rooms,
    pub passages: Arc<PassageSource>,
    pub min_players: usize,
}

impl AppState {
    pub fn new(passages: PassageSource, min_players: usize) -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
            passages: Arc::new(passages),
            min_players: min_players.max(1),
        }
    }
}

pub fn app(state: AppState, static_dir: &str) -> Router {
    let index = format!("{}/index.html", static_dir);
    Router::new()
        .route("/ws", get(ws_handler))
        .fallback_service(ServeDir::new(static_dir).fallback(ServeFile::new(index)))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(listener: TcpListener, state: AppState, static_dir: &str) -> anyhow::Result<()> {
    info!("Server running on http://{}", listener.local_addr()?);
    axum::serve(listener, app(state, static_dir)).await?;
    Ok(())
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| socket::handle_socket(socket, state))
}
