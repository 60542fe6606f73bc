//! Application layer.
//!
//! Use-case services around the room aggregate: input handling, the
//! validation chain, and the abstractions for persistence and time.

pub mod clock;
pub mod dto;
pub mod error;
pub mod repository;
pub mod services;

pub use clock::{Clock, SystemClock};
pub use dto::{ParticipantDto, RoomDto};
pub use error::ApplicationError;
pub use repository::RoomRepository;
pub use services::{RemoveParticipantRequest, RoomService, RoomServiceDependencies};
