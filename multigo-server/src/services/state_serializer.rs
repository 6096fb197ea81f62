use multigo_engine::{Engine, PlayerId, Point};
use serde_json::json;

/// Serialize the full room state for sending to WebSocket clients.
/// `captured` lists the stones removed by the action that produced this state.
pub fn serialize_state(room_id: &str, engine: &Engine, captured: &[Point]) -> serde_json::Value {
    json!({
        "kind": "state",
        "room_id": room_id,
        "stage": engine.stage().to_string(),
        "state": serde_json::to_value(engine.game_state()).unwrap_or_default(),
        "current_player": engine.current_player(),
        "captured": captured,
    })
}

pub fn room_created(room_id: &str, engine: &Engine) -> serde_json::Value {
    json!({
        "kind": "room_created",
        "room_id": room_id,
        "room_size": engine.room_size(),
        "board_size": engine.board_size(),
        "players": engine.players(),
    })
}

pub fn init(player_id: PlayerId) -> serde_json::Value {
    json!({"kind": "init", "player_id": player_id})
}

pub fn error(message: &str) -> serde_json::Value {
    json!({"kind": "error", "message": message})
}
