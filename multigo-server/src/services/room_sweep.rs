use chrono::{DateTime, Utc};

use crate::AppState;
use crate::ws::registry::RoomId;

/// Periodic sweep that evicts rooms nobody has touched for `room_ttl`.
pub async fn run(state: AppState) {
    let mut interval = tokio::time::interval(state.config.sweep_interval);
    loop {
        interval.tick().await;
        let evicted = sweep(&state, Utc::now()).await;
        if !evicted.is_empty() {
            tracing::debug!("Room sweep: {} room(s) left", state.registry.len().await);
        }
    }
}

/// Evict rooms idle since before `now - room_ttl`. Returns the evicted ids.
pub async fn sweep(state: &AppState, now: DateTime<Utc>) -> Vec<RoomId> {
    let Some(cutoff) = chrono::Duration::from_std(state.config.room_ttl)
        .ok()
        .and_then(|ttl| now.checked_sub_signed(ttl))
    else {
        tracing::warn!("Room sweep: TTL {:?} out of range, skipping", state.config.room_ttl);
        return Vec::new();
    };

    let evicted = state.registry.evict_idle(cutoff).await;
    for room_id in &evicted {
        tracing::info!("Room sweep: evicted idle room {room_id}");
    }
    evicted
}
