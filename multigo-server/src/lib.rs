use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use axum::Router;
use axum::routing::get;
use multigo_engine::ZobristTable;

pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod ws;

use config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub registry: ws::registry::RoomRegistry,
    pub table: Arc<ZobristTable>,
    pub next_player_id: Arc<AtomicU64>,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        AppState {
            registry: ws::registry::RoomRegistry::new(),
            table: ZobristTable::shared(),
            next_player_id: Arc::new(AtomicU64::new(1)),
            config,
        }
    }
}

pub fn build_router(config: ServerConfig) -> (Router, AppState) {
    let state = AppState::new(config);

    let app = Router::new()
        .route("/ws", get(ws::handler::ws_upgrade))
        .nest("/api", routes::api::router())
        .route("/up", get(routes::health::health_check))
        .with_state(state.clone());

    (app, state)
}
