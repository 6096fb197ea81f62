use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use multigo_engine::{Engine, GoError, PlayerId, Stage};
use rand::RngExt;
use tokio::sync::{RwLock, mpsc};

pub type WsSender = mpsc::UnboundedSender<String>;
pub type RoomId = String;

const ROOM_ID_LEN: usize = 5;

#[derive(Debug)]
struct Room {
    engine: Engine,
    /// Map of player_id -> ws senders (a player may have several tabs on one id).
    players: HashMap<PlayerId, Vec<WsSender>>,
    created_at: DateTime<Utc>,
    last_activity: DateTime<Utc>,
}

impl Room {
    fn new(engine: Engine, now: DateTime<Utc>) -> Self {
        Room {
            engine,
            players: HashMap::new(),
            created_at: now,
            last_activity: now,
        }
    }

    fn attach(&mut self, player_id: PlayerId, sender: WsSender) {
        let senders = self.players.entry(player_id).or_default();
        if !senders.iter().any(|s| s.same_channel(&sender)) {
            senders.push(sender);
        }
    }

    fn send_all(&self, message: &str) {
        for senders in self.players.values() {
            for sender in senders {
                let _ = sender.send(message.to_string());
            }
        }
    }
}

/// How a committed action changes who receives the room's broadcasts.
#[derive(Debug)]
pub enum Subscription {
    Unchanged,
    /// Subscribe this connection before the new state goes out.
    Attach(PlayerId, WsSender),
    /// Drop every connection of this player before the new state goes out.
    Detach(PlayerId),
}

/// Summary of a room for listings and logs.
#[derive(Debug, Clone)]
pub struct RoomInfo {
    pub id: RoomId,
    pub stage: Stage,
    pub seated: usize,
    pub room_size: u8,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

/// Every live room, keyed by id. Mutations of one room happen under the write
/// lock, so actions on a match are applied one at a time in arrival order.
#[derive(Debug, Clone, Default)]
pub struct RoomRegistry {
    rooms: Arc<RwLock<HashMap<RoomId, Room>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        RoomRegistry::default()
    }

    /// Register a new room around `engine` and return its fresh id.
    pub async fn create_room(&self, engine: Engine) -> RoomId {
        let mut rooms = self.rooms.write().await;
        let id = loop {
            let candidate = generate_room_id();
            if !rooms.contains_key(&candidate) {
                break candidate;
            }
        };
        rooms.insert(id.clone(), Room::new(engine, Utc::now()));
        id
    }

    pub async fn contains(&self, room_id: &str) -> bool {
        self.rooms.read().await.contains_key(room_id)
    }

    pub async fn len(&self) -> usize {
        self.rooms.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rooms.read().await.is_empty()
    }

    /// Get a clone of the room's engine (read-only).
    pub async fn get_engine(&self, room_id: &str) -> Option<Engine> {
        let rooms = self.rooms.read().await;
        rooms.get(room_id).map(|room| room.engine.clone())
    }

    pub async fn info(&self, room_id: &str) -> Option<RoomInfo> {
        let rooms = self.rooms.read().await;
        rooms.get(room_id).map(|room| RoomInfo {
            id: room_id.to_string(),
            stage: room.engine.stage(),
            seated: room.engine.players().len(),
            room_size: room.engine.room_size(),
            created_at: room.created_at,
            last_activity: room.last_activity,
        })
    }

    /// Apply a mutation to the room's engine, then apply `subscription` and send
    /// `render` of the committed state to everyone in the room. All of it happens
    /// under one write lock, so clients receive states in commit order.
    ///
    /// The closure runs against a copy; the room only changes when it returns `Ok`,
    /// and nothing is sent otherwise. Returns `None` if the room does not exist.
    pub async fn commit<T, F, R>(
        &self,
        room_id: &str,
        subscription: Subscription,
        f: F,
        render: R,
    ) -> Option<Result<(Engine, T), GoError>>
    where
        F: FnOnce(&mut Engine) -> Result<T, GoError>,
        R: FnOnce(&Engine, &T) -> String,
    {
        let mut rooms = self.rooms.write().await;
        let room = rooms.get_mut(room_id)?;
        let mut draft = room.engine.clone();
        let value = match f(&mut draft) {
            Ok(value) => value,
            Err(e) => return Some(Err(e)),
        };

        room.engine = draft;
        room.last_activity = Utc::now();
        match subscription {
            Subscription::Unchanged => {}
            Subscription::Attach(player_id, sender) => room.attach(player_id, sender),
            Subscription::Detach(player_id) => {
                room.players.remove(&player_id);
            }
        }
        room.send_all(&render(&room.engine, &value));

        Some(Ok((room.engine.clone(), value)))
    }

    /// Add a player's sender to a room.
    pub async fn attach(&self, room_id: &str, player_id: PlayerId, sender: WsSender) -> bool {
        let mut rooms = self.rooms.write().await;
        let Some(room) = rooms.get_mut(room_id) else {
            return false;
        };
        room.attach(player_id, sender);
        room.last_activity = Utc::now();
        true
    }

    /// Unseat `player_id` from every waiting room other than `except`, sending
    /// `render` of each changed room to the players left in it.
    /// Returns the ids of the rooms that changed.
    pub async fn leave_waiting_rooms<R>(
        &self,
        player_id: PlayerId,
        except: Option<&str>,
        render: R,
    ) -> Vec<RoomId>
    where
        R: Fn(&str, &Engine) -> String,
    {
        let mut rooms = self.rooms.write().await;
        let mut changed = Vec::new();
        for (id, room) in rooms.iter_mut() {
            if Some(id.as_str()) == except || room.engine.stage() != Stage::Waiting {
                continue;
            }
            if room.engine.unseat_player(player_id).is_ok() {
                room.players.remove(&player_id);
                room.last_activity = Utc::now();
                room.send_all(&render(id, &room.engine));
                changed.push(id.clone());
            }
        }
        changed
    }

    /// Drop a closed connection from every room. A player whose last connection is
    /// gone also gives up their seat in any waiting room, and the rest of that room
    /// is sent `render` of the new seating.
    /// Returns the ids of rooms whose seating changed.
    pub async fn disconnect<R>(&self, player_id: PlayerId, sender: &WsSender, render: R) -> Vec<RoomId>
    where
        R: Fn(&str, &Engine) -> String,
    {
        let mut rooms = self.rooms.write().await;
        let mut changed = Vec::new();
        for (id, room) in rooms.iter_mut() {
            let Some(senders) = room.players.get_mut(&player_id) else {
                continue;
            };
            senders.retain(|s| !s.same_channel(sender));
            if !senders.is_empty() {
                continue;
            }
            room.players.remove(&player_id);
            if room.engine.stage() == Stage::Waiting
                && room.engine.unseat_player(player_id).is_ok()
            {
                room.send_all(&render(id, &room.engine));
                changed.push(id.clone());
            }
        }
        changed
    }

    /// Broadcast a message to all players in a room.
    pub async fn broadcast(&self, room_id: &str, message: &str) {
        let rooms = self.rooms.read().await;
        if let Some(room) = rooms.get(room_id) {
            room.send_all(message);
        }
    }

    /// Remove every room whose last activity is older than `cutoff`.
    /// Returns the evicted ids.
    pub async fn evict_idle(&self, cutoff: DateTime<Utc>) -> Vec<RoomId> {
        let mut rooms = self.rooms.write().await;
        let stale: Vec<RoomId> = rooms
            .iter()
            .filter(|(_, room)| room.last_activity < cutoff)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &stale {
            rooms.remove(id);
        }
        stale
    }

    #[cfg(test)]
    async fn set_last_activity(&self, room_id: &str, at: DateTime<Utc>) {
        let mut rooms = self.rooms.write().await;
        if let Some(room) = rooms.get_mut(room_id) {
            room.last_activity = at;
        }
    }
}

fn generate_room_id() -> RoomId {
    let mut rng = rand::rng();
    (0..ROOM_ID_LEN)
        .map(|_| {
            let idx = rng.random_range(0..26);
            b"ABCDEFGHIJKLMNOPQRSTUVWXYZ"[idx] as char
        })
        .collect()
}
