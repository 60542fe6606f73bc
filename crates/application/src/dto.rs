use domain::{Participant, Room, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantDto {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub is_admin: bool,
}

impl From<&Participant> for ParticipantDto {
    fn from(participant: &Participant) -> Self {
        Self {
            id: participant.id.into(),
            first_name: participant.first_name.clone(),
            last_name: participant.last_name.clone(),
            is_admin: participant.is_admin,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomDto {
    pub room_code: String,
    pub participants: Vec<ParticipantDto>,
    pub closed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<&Room> for RoomDto {
    fn from(room: &Room) -> Self {
        Self {
            room_code: room.room_code.as_str().to_owned(),
            participants: room.participants.iter().map(ParticipantDto::from).collect(),
            closed_at: room.closed_at,
            created_at: room.created_at,
            updated_at: room.updated_at,
        }
    }
}
