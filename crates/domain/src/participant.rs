use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};
use crate::value_objects::{ParticipantCode, ParticipantId};

/// A member of a room.
///
/// The identity code is a credential and is only ever compared server-side;
/// response DTOs do not serialize it back out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub code: ParticipantCode,
    pub first_name: String,
    pub last_name: String,
    pub is_admin: bool,
}

impl Participant {
    pub fn new(
        id: ParticipantId,
        code: ParticipantCode,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        is_admin: bool,
    ) -> DomainResult<Self> {
        if code.as_str().trim().is_empty() {
            return Err(DomainError::invalid_argument(
                "participant_code",
                "cannot be empty",
            ));
        }
        Ok(Self {
            id,
            code,
            first_name: Self::validate_name("first_name", first_name.into())?,
            last_name: Self::validate_name("last_name", last_name.into())?,
            is_admin,
        })
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    fn validate_name(field: &'static str, value: String) -> DomainResult<String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::invalid_argument(field, "cannot be empty"));
        }
        if trimmed.len() > 50 {
            return Err(DomainError::invalid_argument(field, "too long"));
        }
        Ok(trimmed.to_owned())
    }
}
