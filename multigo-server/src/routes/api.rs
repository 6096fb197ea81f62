use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use multigo_engine::GameState;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::{ApiError, AppError};

// -- Response types --

#[derive(Debug, Serialize, Deserialize)]
pub struct RoomResponse {
    pub room_id: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    #[serde(flatten)]
    pub state: GameState,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/rooms/{id}", get(get_room))
}

/// GET /api/rooms/{id}
async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomResponse>, ApiError> {
    let room_id = room_id.to_ascii_uppercase();
    let not_found = || AppError::NotFound("Room not found".to_string());

    let info = state.registry.info(&room_id).await.ok_or_else(not_found)?;
    let engine = state
        .registry
        .get_engine(&room_id)
        .await
        .ok_or_else(not_found)?;

    Ok(Json(RoomResponse {
        room_id: info.id,
        created_at: info.created_at,
        last_activity: info.last_activity,
        state: engine.game_state(),
    }))
}
