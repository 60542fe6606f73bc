use std::sync::Arc;

use domain::{
    ParticipantCode, ParticipantId, RepositoryError, Room, RoomCode, ValidationErrors,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::error::ApplicationError;
use crate::repository::RoomRepository;

/// Input for the removal use case. Not persisted.
#[derive(Debug, Clone)]
pub struct RemoveParticipantRequest {
    /// Identity code of the participant issuing the request.
    pub participant_code: String,
    /// Id of the participant to remove.
    pub participant_id: u64,
}

pub struct RoomServiceDependencies {
    pub room_repository: Arc<dyn RoomRepository>,
    pub clock: Arc<dyn Clock>,
}

pub struct RoomService {
    deps: RoomServiceDependencies,
}

impl RoomService {
    pub fn new(deps: RoomServiceDependencies) -> Self {
        Self { deps }
    }

    /// Remove a participant from their room.
    ///
    /// Validations run in a fixed order and the first failure wins: resolve
    /// the acting room, require an administrator, resolve the target inside
    /// that room, require actor and target to be the same participant, and
    /// require the room to still be open. Only then is the aggregate mutated
    /// and persisted, and the committed room re-read for the caller.
    pub async fn remove_participant(
        &self,
        request: RemoveParticipantRequest,
        cancel: CancellationToken,
    ) -> Result<Room, ApplicationError> {
        debug!(
            participant_id = request.participant_id,
            "participant removal requested"
        );

        let acting_code = ParticipantCode::new(request.participant_code);
        let target_id = ParticipantId::new(request.participant_id);

        let mut room = match self
            .deps
            .room_repository
            .get_by_participant_code(&acting_code, cancel.clone())
            .await
        {
            Ok(room) => room,
            Err(RepositoryError::NotFound) => {
                return Err(ValidationErrors::not_found(
                    "participant_code",
                    "participant with the specified code was not found",
                )
                .into());
            }
            Err(err) => return Err(err.into()),
        };

        let acting_id = match room.participant_by_code(&acting_code) {
            Some(participant) if participant.is_admin => participant.id,
            _ => {
                return Err(ValidationErrors::forbidden(
                    "participant_code",
                    "only the room administrator can remove participants",
                )
                .into());
            }
        };

        let Some(target) = room.participant_by_id(target_id) else {
            return Err(ValidationErrors::bad_request(
                "participant_id",
                "participant with the specified id does not belong to the room",
            )
            .into());
        };

        if acting_id != target.id {
            return Err(ValidationErrors::bad_request(
                "participant_id",
                "only your own participant record can be removed",
            )
            .into());
        }

        if room.is_closed() {
            return Err(
                ValidationErrors::bad_request("room", "the room is already closed").into(),
            );
        }

        room.remove_participant(target_id, self.deps.clock.now())
            .map_err(ValidationErrors::from)?;

        if let Err(err) = self
            .deps
            .room_repository
            .update(&room, cancel.clone())
            .await
        {
            if matches!(err, RepositoryError::Cancelled) {
                return Err(ApplicationError::Cancelled);
            }
            return Err(ValidationErrors::bad_request("", err.to_string()).into());
        }

        info!(
            room_code = %room.room_code,
            participant_id = %target_id,
            "participant removed"
        );

        // The caller observes what was durably committed, not the in-memory
        // mutation.
        self.deps
            .room_repository
            .get_by_participant_code(&acting_code, cancel)
            .await
            .map_err(|err| match err {
                RepositoryError::NotFound => ValidationErrors::not_found(
                    "participant_code",
                    "participant with the specified code was not found",
                )
                .into(),
                other => ApplicationError::from(other),
            })
    }

    /// Load a room for display by its room code.
    pub async fn room_by_code(
        &self,
        room_code: impl Into<String>,
        cancel: CancellationToken,
    ) -> Result<Room, ApplicationError> {
        let code = RoomCode::new(room_code);
        match self
            .deps
            .room_repository
            .get_by_room_code(&code, cancel)
            .await
        {
            Ok(room) => Ok(room),
            Err(RepositoryError::NotFound) => Err(ValidationErrors::not_found(
                "room_code",
                "room with the specified code was not found",
            )
            .into()),
            Err(err) => Err(err.into()),
        }
    }
}
