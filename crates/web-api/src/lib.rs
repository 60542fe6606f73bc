//! HTTP edge for the room service.
//!
//! Axum routes delegating to the application layer's use-case service.

mod error;
mod routes;
mod state;

pub use error::ApiError;
pub use routes::router;
pub use state::AppState;
