use std::sync::atomic::Ordering;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::AppState;
use crate::services::{room_actions, state_serializer};
use crate::ws::game_channel;

/// WebSocket upgrade handler: GET /ws
pub async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let player_id = state.next_player_id.fetch_add(1, Ordering::Relaxed);
    let (mut ws_sink, mut ws_stream) = socket.split();

    // Create a channel for sending messages back to this client
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let _ = tx.send(state_serializer::init(player_id).to_string());
    tracing::debug!("WebSocket opened: player={player_id}");

    // Spawn task to forward messages from the channel to the WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if ws_sink.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    // Process incoming messages
    while let Some(Ok(msg)) = ws_stream.next().await {
        match msg {
            Message::Text(text) => {
                let text_str: &str = &text;
                match serde_json::from_str::<serde_json::Value>(text_str) {
                    Ok(data) => game_channel::handle_message(&state, player_id, &data, &tx).await,
                    Err(_) => {
                        let _ = tx.send(state_serializer::error("Invalid JSON").to_string());
                    }
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    // Cleanup
    room_actions::disconnect(&state, player_id, &tx).await;
    send_task.abort();

    tracing::debug!("WebSocket closed: player={player_id}");
}
