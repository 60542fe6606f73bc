use async_trait::async_trait;
use domain::{ParticipantCode, RepositoryError, Room, RoomCode};
#[cfg(test)]
use mockall::automock;
use tokio_util::sync::CancellationToken;

/// Persistence boundary for room aggregates.
///
/// Every operation honors the cancellation token: once it is triggered the
/// call returns `RepositoryError::Cancelled` promptly and never leaves a
/// partially applied write behind.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Locate the room that issued the given identity code.
    ///
    /// Codes are never reused within a room's lifetime, so a code issued to
    /// a since-removed participant still resolves to its room.
    async fn get_by_participant_code(
        &self,
        code: &ParticipantCode,
        cancel: CancellationToken,
    ) -> Result<Room, RepositoryError>;

    /// Locate a room by its own code.
    async fn get_by_room_code(
        &self,
        code: &RoomCode,
        cancel: CancellationToken,
    ) -> Result<Room, RepositoryError>;

    /// Atomically replace the persisted state of `room` and return what was
    /// committed. Fails with `Conflict` when the stored version no longer
    /// matches the aggregate's loaded version.
    async fn update(
        &self,
        room: &Room,
        cancel: CancellationToken,
    ) -> Result<Room, RepositoryError>;
}
