use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};
use crate::participant::Participant;
use crate::value_objects::{ParticipantCode, ParticipantId, RoomCode, Timestamp};

/// Room aggregate: the sole guardian of membership invariants.
///
/// Instances are transient, reconstructed from the store per request.
/// Participants keep their insertion order for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub room_code: RoomCode,
    pub participants: Vec<Participant>,
    pub closed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Optimistic concurrency token, bumped by the store on every commit.
    pub version: u64,
}

impl Room {
    pub fn new(
        room_code: RoomCode,
        participants: Vec<Participant>,
        now: Timestamp,
    ) -> DomainResult<Self> {
        Self::reconstitute(room_code, participants, None, now, now, 0)
    }

    /// Rebuild an aggregate from persisted state.
    ///
    /// Used by store implementations and by test fixtures that need a room
    /// in an arbitrary lifecycle state, such as an already-closed room.
    pub fn reconstitute(
        room_code: RoomCode,
        participants: Vec<Participant>,
        closed_at: Option<Timestamp>,
        created_at: Timestamp,
        updated_at: Timestamp,
        version: u64,
    ) -> DomainResult<Self> {
        if room_code.as_str().trim().is_empty() {
            return Err(DomainError::invalid_argument("room_code", "cannot be empty"));
        }
        Self::validate_members(&participants)?;
        Ok(Self {
            room_code,
            participants,
            closed_at,
            created_at,
            updated_at,
            version,
        })
    }

    pub fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }

    /// Find the participant holding the given identity code.
    pub fn participant_by_code(&self, code: &ParticipantCode) -> Option<&Participant> {
        // Rooms stay small; linear scan is deliberate.
        self.participants.iter().find(|p| &p.code == code)
    }

    pub fn participant_by_id(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    /// Remove exactly one participant from the room.
    ///
    /// Preconditions are checked here again regardless of what the caller
    /// already validated: the room must be open and the id must be present.
    pub fn remove_participant(&mut self, id: ParticipantId, now: Timestamp) -> DomainResult<()> {
        if self.is_closed() {
            return Err(DomainError::RoomClosed);
        }
        let position = self
            .participants
            .iter()
            .position(|p| p.id == id)
            .ok_or(DomainError::ParticipantNotFound { id })?;
        self.participants.remove(position);
        self.updated_at = now;
        Ok(())
    }

    fn validate_members(participants: &[Participant]) -> DomainResult<()> {
        for (index, participant) in participants.iter().enumerate() {
            for other in &participants[index + 1..] {
                if participant.id == other.id {
                    return Err(DomainError::invalid_argument(
                        "participants",
                        "duplicate participant id",
                    ));
                }
                if participant.code == other.code {
                    return Err(DomainError::invalid_argument(
                        "participants",
                        "duplicate identity code",
                    ));
                }
            }
        }
        Ok(())
    }
}
