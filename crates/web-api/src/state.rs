use std::sync::Arc;

use application::RoomService;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct AppState {
    pub room_service: Arc<RoomService>,
    /// Process-wide shutdown token; requests run under child tokens of it.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(room_service: Arc<RoomService>, shutdown: CancellationToken) -> Self {
        Self {
            room_service,
            shutdown,
        }
    }
}
