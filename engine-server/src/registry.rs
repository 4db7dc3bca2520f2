//! Room registry
//!
//! Sessions live in a sharded concurrent map keyed by room id. Every request
//! holds the shard lock of its own room only, so moves in one room are
//! serialized while independent rooms proceed in parallel.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use games_ultimate::Move;

use crate::error::SessionError;
use crate::protocol::{ClientId, RoomId};
use crate::session::{Outbound, Session, SessionStatus};

/// Length of generated room ids.
pub const ROOM_ID_LEN: usize = 8;

/// Counts of live rooms by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub rooms: usize,
    pub waiting: usize,
    pub playing: usize,
    pub finished: usize,
}

#[derive(Debug)]
pub struct SessionRegistry {
    rooms: DashMap<RoomId, Session>,
    auto_create: bool,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(true)
    }
}

fn new_room_id() -> RoomId {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(ROOM_ID_LEN);
    id
}

impl SessionRegistry {
    /// Create an empty registry. With `auto_create` a join for an unknown
    /// room creates it instead of failing with `RoomNotFound`.
    pub fn new(auto_create: bool) -> Self {
        Self {
            rooms: DashMap::new(),
            auto_create,
        }
    }

    /// Allocate a fresh waiting room with `client` as its first entrant.
    pub fn create_room(&self, client: ClientId) -> RoomId {
        loop {
            let room_id = new_room_id();
            if let Entry::Vacant(slot) = self.rooms.entry(room_id.clone()) {
                slot.insert(Session::created_by(room_id.clone(), client));
                info!(room_id = %room_id, client = %client, "Room created");
                return room_id;
            }
        }
    }

    pub fn join_room(&self, client: ClientId, room_id: &str) -> Result<Vec<Outbound>, SessionError> {
        let mut session = if self.auto_create {
            self.rooms.entry(room_id.to_string()).or_insert_with(|| {
                info!(room_id = %room_id, "Room created on join");
                Session::new(room_id)
            })
        } else {
            self.rooms
                .get_mut(room_id)
                .ok_or_else(|| SessionError::RoomNotFound(room_id.to_string()))?
        };
        session.join(client)
    }

    pub fn make_move(
        &self,
        client: ClientId,
        room_id: &str,
        mv: Move,
    ) -> Result<Vec<Outbound>, SessionError> {
        let mut session = self
            .rooms
            .get_mut(room_id)
            .ok_or_else(|| SessionError::RoomNotFound(room_id.to_string()))?;
        session.make_move(client, mv)
    }

    /// Remove `client` from every room it is in, dropping rooms it empties.
    pub fn disconnect(&self, client: ClientId) -> Vec<Outbound> {
        let joined: Vec<RoomId> = self
            .rooms
            .iter()
            .filter(|entry| entry.value().contains(client))
            .map(|entry| entry.key().clone())
            .collect();

        let mut out = Vec::new();
        for room_id in joined {
            if let Some(mut session) = self.rooms.get_mut(&room_id) {
                if let Some(notes) = session.leave(client) {
                    out.extend(notes);
                }
            }
            if self
                .rooms
                .remove_if(&room_id, |_, session| session.is_empty())
                .is_some()
            {
                info!(room_id = %room_id, "Room removed");
            }
        }
        out
    }

    pub fn insert(&self, session: Session) -> Option<Session> {
        self.rooms.insert(session.room_id().to_string(), session)
    }

    /// Snapshot of a room.
    pub fn get(&self, room_id: &str) -> Option<Session> {
        self.rooms.get(room_id).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, room_id: &str) -> Option<Session> {
        self.rooms.remove(room_id).map(|(_, session)| session)
    }

    pub fn contains(&self, room_id: &str) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn stats(&self) -> RegistryStats {
        self.rooms
            .iter()
            .fold(RegistryStats::default(), |mut stats, entry| {
                stats.rooms += 1;
                match entry.value().status() {
                    SessionStatus::Waiting => stats.waiting += 1,
                    SessionStatus::Playing => stats.playing += 1,
                    SessionStatus::Finished => stats.finished += 1,
                }
                stats
            })
    }
}
