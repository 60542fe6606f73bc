//! Persistence adapters for the room store.

pub mod memory;
pub mod repository;

pub use memory::InMemoryRoomRepository;
pub use repository::{create_pg_pool, PgRoomRepository};
