use multigo_engine::PlayerId;

use crate::AppState;
use crate::error::AppError;
use crate::services::{room_actions, state_serializer};
use crate::ws::registry::WsSender;

/// Handle an incoming WebSocket message from a player.
pub async fn handle_message(
    state: &AppState,
    player_id: PlayerId,
    data: &serde_json::Value,
    tx: &WsSender,
) {
    let action = data.get("action").and_then(|v| v.as_str()).unwrap_or("");

    let result = match action {
        "create_room" => handle_create_room(state, player_id, data, tx).await,
        "join_room" | "leave_room" | "start_game" | "play" | "pass" | "resign" | "mark"
        | "confirm" => handle_room_action(state, player_id, action, data, tx).await,
        _ => {
            let _ = tx.send(state_serializer::error(&format!("Unknown action: {action}")).to_string());
            return;
        }
    };

    if let Err(e) = result {
        tracing::warn!("Rejected {action} from player {player_id}: {e}");
        let _ = tx.send(state_serializer::error(&e.client_message()).to_string());
    }
}

async fn handle_create_room(
    state: &AppState,
    player_id: PlayerId,
    data: &serde_json::Value,
    tx: &WsSender,
) -> Result<(), AppError> {
    let room_size = small_int(data, "room_size")?;
    let board_size = small_int(data, "board_size")?;

    room_actions::create_room(state, player_id, room_size, board_size, tx).await?;
    Ok(())
}

/// Actions addressed to an existing room by `room_id`.
async fn handle_room_action(
    state: &AppState,
    player_id: PlayerId,
    action: &str,
    data: &serde_json::Value,
    tx: &WsSender,
) -> Result<(), AppError> {
    let room_id = room_id(data)?;

    match action {
        "join_room" => room_actions::join_room(state, room_id, player_id, tx).await?,
        "leave_room" => room_actions::leave_room(state, room_id, player_id).await?,
        "start_game" => room_actions::start_game(state, room_id, player_id).await?,
        "play" => {
            let (x, y) = coordinates(data)?;
            room_actions::play_move(state, room_id, player_id, x, y).await?
        }
        "pass" => room_actions::pass(state, room_id, player_id).await?,
        "resign" => room_actions::resign(state, room_id, player_id).await?,
        "mark" => {
            let (x, y) = coordinates(data)?;
            room_actions::toggle_mark(state, room_id, player_id, x, y).await?
        }
        "confirm" => room_actions::confirm(state, room_id, player_id).await?,
        _ => return Err(AppError::BadRequest(format!("Unknown action: {action}"))),
    };
    Ok(())
}

fn room_id(data: &serde_json::Value) -> Result<&str, AppError> {
    data.get("room_id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| AppError::BadRequest("Missing room_id".to_string()))
}

fn coordinates(data: &serde_json::Value) -> Result<(i64, i64), AppError> {
    let x = data
        .get("x")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| AppError::BadRequest("Missing x".to_string()))?;
    let y = data
        .get("y")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| AppError::BadRequest("Missing y".to_string()))?;
    Ok((x, y))
}

fn small_int(data: &serde_json::Value, key: &str) -> Result<u8, AppError> {
    data.get(key)
        .and_then(|v| v.as_u64())
        .and_then(|v| u8::try_from(v).ok())
        .ok_or_else(|| AppError::BadRequest(format!("Missing or invalid {key}")))
}
