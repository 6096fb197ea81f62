use multigo_engine::{Engine, GoError, PlayerId, Point, Stage};

use crate::AppState;
use crate::error::AppError;
use crate::services::state_serializer;
use crate::ws::registry::{RoomId, Subscription, WsSender};

// -- Room lifecycle --
// Each action validates through the engine and commits to the registry, which
// broadcasts the new state to the room under the same lock. Callers only report
// errors back.

pub async fn create_room(
    state: &AppState,
    player_id: PlayerId,
    room_size: u8,
    board_size: u8,
    tx: &WsSender,
) -> Result<(RoomId, Engine), AppError> {
    let mut engine = Engine::with_table(state.table.clone(), room_size, board_size)?;
    engine.seat_player(player_id)?;

    leave_other_waiting_rooms(state, player_id, None).await;

    let room_id = state.registry.create_room(engine.clone()).await;
    let _ = tx.send(state_serializer::room_created(&room_id, &engine).to_string());
    state.registry.attach(&room_id, player_id, tx.clone()).await;
    state.registry.broadcast(&room_id, &state_message(&room_id, &engine)).await;
    tracing::info!("Room {room_id} created by player {player_id} ({room_size} players, {board_size}x{board_size})");

    Ok((room_id, engine))
}

/// Take a free seat, or resubscribe this connection to a seat already held.
pub async fn join_room(
    state: &AppState,
    room_id: &str,
    player_id: PlayerId,
    tx: &WsSender,
) -> Result<Engine, AppError> {
    let (engine, newly_seated) = commit(
        state,
        room_id,
        Subscription::Attach(player_id, tx.clone()),
        |engine| {
            if engine.is_seated(player_id) {
                return Ok(false);
            }
            engine.seat_player(player_id).map(|_| true)
        },
    )
    .await?;

    if newly_seated {
        if let Some(stone) = engine.seat_of(player_id) {
            tracing::info!("Player {player_id} joined room {room_id} as {stone}");
        }
        leave_other_waiting_rooms(state, player_id, Some(room_id)).await;
    }

    Ok(engine)
}

pub async fn leave_room(state: &AppState, room_id: &str, player_id: PlayerId) -> Result<Engine, AppError> {
    let (engine, ()) = commit(state, room_id, Subscription::Detach(player_id), |engine| {
        engine.unseat_player(player_id)
    })
    .await?;
    tracing::info!("Player {player_id} left room {room_id}");
    Ok(engine)
}

pub async fn start_game(state: &AppState, room_id: &str, player_id: PlayerId) -> Result<Engine, AppError> {
    let (engine, ()) = commit(state, room_id, Subscription::Unchanged, |engine| {
        if !engine.is_seated(player_id) {
            return Err(GoError::NotSeated);
        }
        engine.begin_play()
    })
    .await?;
    tracing::info!("Game started in room {room_id}");
    Ok(engine)
}

/// Drop a closed connection. Waiting rooms it was the player's last link to give
/// up the seat and broadcast the new seating.
pub async fn disconnect(state: &AppState, player_id: PlayerId, tx: &WsSender) {
    let changed = state
        .registry
        .disconnect(player_id, tx, state_message)
        .await;
    for room_id in changed {
        tracing::debug!("Player {player_id} disconnected from waiting room {room_id}");
    }
}

// -- Core game actions --

pub async fn play_move(
    state: &AppState,
    room_id: &str,
    player_id: PlayerId,
    x: i64,
    y: i64,
) -> Result<Engine, AppError> {
    let point = to_point(x, y)?;

    let result = state
        .registry
        .commit(
            room_id,
            Subscription::Unchanged,
            |engine| engine.try_play(player_id, point),
            |engine, captured: &Vec<Point>| {
                state_serializer::serialize_state(room_id, engine, captured).to_string()
            },
        )
        .await;
    let (engine, _) = committed(result)?;
    Ok(engine)
}

pub async fn pass(state: &AppState, room_id: &str, player_id: PlayerId) -> Result<Engine, AppError> {
    let (engine, stage) =
        commit(state, room_id, Subscription::Unchanged, |engine| engine.try_pass(player_id)).await?;

    if stage == Stage::Scoring {
        tracing::info!("Room {room_id}: every player passed, scoring has begun");
    }
    Ok(engine)
}

pub async fn resign(state: &AppState, room_id: &str, player_id: PlayerId) -> Result<Engine, AppError> {
    let (engine, _) =
        commit(state, room_id, Subscription::Unchanged, |engine| engine.try_resign(player_id)).await?;

    if let Some(stone) = engine.resigned() {
        tracing::info!("Room {room_id}: {stone} resigned, game over");
    }
    Ok(engine)
}

// -- Scoring --

pub async fn toggle_mark(
    state: &AppState,
    room_id: &str,
    player_id: PlayerId,
    x: i64,
    y: i64,
) -> Result<Engine, AppError> {
    let point = to_point(x, y)?;

    let (engine, ()) = commit(state, room_id, Subscription::Unchanged, |engine| {
        engine.toggle_mark(player_id, point)
    })
    .await?;
    Ok(engine)
}

pub async fn confirm(state: &AppState, room_id: &str, player_id: PlayerId) -> Result<Engine, AppError> {
    let (engine, stage) =
        commit(state, room_id, Subscription::Unchanged, |engine| engine.toggle_confirm(player_id))
            .await?;

    if stage == Stage::Finished
        && let Some(score) = engine.score()
    {
        tracing::info!("Room {room_id}: game over, totals {:?}", score.totals());
    }
    Ok(engine)
}

// -- Internal helpers --

fn state_message(room_id: &str, engine: &Engine) -> String {
    state_serializer::serialize_state(room_id, engine, &[]).to_string()
}

async fn leave_other_waiting_rooms(state: &AppState, player_id: PlayerId, except: Option<&str>) {
    let left = state
        .registry
        .leave_waiting_rooms(player_id, except, state_message)
        .await;
    for room_id in left {
        tracing::debug!("Player {player_id} removed from waiting room {room_id}");
    }
}

/// Commit an action whose broadcast carries no captures.
async fn commit<T, F>(
    state: &AppState,
    room_id: &str,
    subscription: Subscription,
    f: F,
) -> Result<(Engine, T), AppError>
where
    F: FnOnce(&mut Engine) -> Result<T, GoError>,
{
    let result = state
        .registry
        .commit(room_id, subscription, f, |engine, _| state_message(room_id, engine))
        .await;
    committed(result)
}

fn committed<T>(result: Option<Result<(Engine, T), GoError>>) -> Result<(Engine, T), AppError> {
    match result {
        Some(Ok(result)) => Ok(result),
        Some(Err(e)) => Err(AppError::from(e)),
        None => Err(room_not_found()),
    }
}

fn to_point(x: i64, y: i64) -> Result<Point, AppError> {
    match (u8::try_from(x), u8::try_from(y)) {
        (Ok(x), Ok(y)) => Ok((x, y)),
        _ => Err(AppError::BadRequest("Invalid coordinates".to_string())),
    }
}

fn room_not_found() -> AppError {
    AppError::NotFound("Room not found".to_string())
}
