use std::collections::HashMap;

use application::RoomRepository;
use async_trait::async_trait;
use domain::{ParticipantCode, RepositoryError, Room, RoomCode};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

/// Room store backed by process memory.
///
/// Mirrors the PostgreSQL adapter's semantics: versioned compare-and-swap
/// updates, and identity codes that keep resolving to their room after the
/// holder was removed.
#[derive(Default)]
pub struct InMemoryRoomRepository {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    rooms: HashMap<RoomCode, Room>,
    codes: HashMap<ParticipantCode, RoomCode>,
}

impl InMemoryRoomRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a room, indexing the identity codes of its current participants.
    pub async fn insert(&self, room: Room) {
        let mut inner = self.inner.write().await;
        for participant in &room.participants {
            inner
                .codes
                .insert(participant.code.clone(), room.room_code.clone());
        }
        inner.rooms.insert(room.room_code.clone(), room);
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn get_by_participant_code(
        &self,
        code: &ParticipantCode,
        cancel: CancellationToken,
    ) -> Result<Room, RepositoryError> {
        if cancel.is_cancelled() {
            return Err(RepositoryError::Cancelled);
        }
        let inner = self.inner.read().await;
        let room_code = inner.codes.get(code).ok_or(RepositoryError::NotFound)?;
        inner
            .rooms
            .get(room_code)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn get_by_room_code(
        &self,
        code: &RoomCode,
        cancel: CancellationToken,
    ) -> Result<Room, RepositoryError> {
        if cancel.is_cancelled() {
            return Err(RepositoryError::Cancelled);
        }
        let inner = self.inner.read().await;
        inner.rooms.get(code).cloned().ok_or(RepositoryError::NotFound)
    }

    async fn update(
        &self,
        room: &Room,
        cancel: CancellationToken,
    ) -> Result<Room, RepositoryError> {
        if cancel.is_cancelled() {
            return Err(RepositoryError::Cancelled);
        }
        let mut inner = self.inner.write().await;
        let stored_version = inner
            .rooms
            .get(&room.room_code)
            .ok_or(RepositoryError::NotFound)?
            .version;
        if stored_version != room.version {
            return Err(RepositoryError::Conflict);
        }

        let mut committed = room.clone();
        committed.version += 1;
        // Codes of removed participants stay indexed; codes are never
        // reused within a room's lifetime.
        for participant in &committed.participants {
            inner
                .codes
                .insert(participant.code.clone(), committed.room_code.clone());
        }
        inner
            .rooms
            .insert(committed.room_code.clone(), committed.clone());
        Ok(committed)
    }
}
