//! Core domain model for shared rooms and their participants.

pub mod errors;
pub mod participant;
pub mod room;
pub mod value_objects;

pub use errors::*;
pub use participant::*;
pub use room::*;
pub use value_objects::*;
