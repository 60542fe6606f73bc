use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use application::{RemoveParticipantRequest, RoomDto};

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
struct IdentityQuery {
    code: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/rooms/{room_code}", get(get_room))
        .route("/participants/{participant_id}", delete(remove_participant))
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn get_room(
    State(state): State<AppState>,
    Path(room_code): Path<String>,
) -> Result<Json<RoomDto>, ApiError> {
    let room = state
        .room_service
        .room_by_code(room_code, state.shutdown.child_token())
        .await?;

    Ok(Json(RoomDto::from(&room)))
}

async fn remove_participant(
    State(state): State<AppState>,
    Path(participant_id): Path<u64>,
    Query(query): Query<IdentityQuery>,
) -> Result<Json<RoomDto>, ApiError> {
    let room = state
        .room_service
        .remove_participant(
            RemoveParticipantRequest {
                participant_code: query.code,
                participant_id,
            },
            state.shutdown.child_token(),
        )
        .await?;

    Ok(Json(RoomDto::from(&room)))
}
