use std::sync::Arc;

use chrono::{TimeZone, Utc};
use domain::{
    ErrorKind, Participant, ParticipantCode, ParticipantId, RepositoryError, Room, RoomCode,
    Timestamp, ValidationErrors,
};
use mockall::Sequence;
use tokio_util::sync::CancellationToken;

use crate::clock::Clock;
use crate::error::ApplicationError;
use crate::repository::MockRoomRepository;
use crate::services::{RemoveParticipantRequest, RoomService, RoomServiceDependencies};

struct FixedClock(Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

fn fixture_time() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

fn participant(id: u64, code: &str, is_admin: bool) -> Participant {
    Participant::new(
        ParticipantId::new(id),
        ParticipantCode::new(code),
        format!("First{id}"),
        format!("Last{id}"),
        is_admin,
    )
    .unwrap()
}

fn room_with(participants: Vec<Participant>, closed_at: Option<Timestamp>) -> Room {
    Room::reconstitute(
        RoomCode::new("room-1"),
        participants,
        closed_at,
        fixture_time(),
        fixture_time(),
        3,
    )
    .unwrap()
}

fn service(repository: MockRoomRepository) -> RoomService {
    RoomService::new(RoomServiceDependencies {
        room_repository: Arc::new(repository),
        clock: Arc::new(FixedClock(fixture_time())),
    })
}

fn request(code: &str, id: u64) -> RemoveParticipantRequest {
    RemoveParticipantRequest {
        participant_code: code.to_owned(),
        participant_id: id,
    }
}

fn expect_validation(result: Result<Room, ApplicationError>) -> ValidationErrors {
    match result {
        Err(ApplicationError::Validation(errors)) => errors,
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_admin_self_removal_succeeds() {
    let initial = room_with(
        vec![participant(1, "A1", true), participant(2, "B2", false)],
        None,
    );
    let committed = room_with(vec![participant(2, "B2", false)], None);

    let mut repository = MockRoomRepository::new();
    let mut seq = Sequence::new();

    let loaded = initial.clone();
    repository
        .expect_get_by_participant_code()
        .withf(|code, _| code.as_str() == "A1")
        .times(1)
        .in_sequence(&mut seq)
        .returning(move |_, _| Ok(loaded.clone()));

    repository
        .expect_update()
        .withf(|room, _| {
            room.participants.len() == 1
                && room.participant_by_id(ParticipantId::new(1)).is_none()
                && room.participant_by_id(ParticipantId::new(2)).is_some()
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|room, _| Ok(room.clone()));

    let refreshed = committed.clone();
    repository
        .expect_get_by_participant_code()
        .withf(|code, _| code.as_str() == "A1")
        .times(1)
        .in_sequence(&mut seq)
        .returning(move |_, _| Ok(refreshed.clone()));

    let result = service(repository)
        .remove_participant(request("A1", 1), CancellationToken::new())
        .await
        .unwrap();

    // The re-fetched, committed room is returned, not the in-memory one.
    assert_eq!(result, committed);
    assert_eq!(result.participants.len(), 1);
    assert_eq!(result.participants[0], participant(2, "B2", false));
}

#[tokio::test]
async fn test_unknown_code_is_not_found() {
    let mut repository = MockRoomRepository::new();
    repository
        .expect_get_by_participant_code()
        .times(1)
        .returning(|_, _| Err(RepositoryError::NotFound));

    let result = service(repository)
        .remove_participant(request("nope", 1), CancellationToken::new())
        .await;

    let errors = expect_validation(result);
    assert_eq!(errors.kind, ErrorKind::NotFound);
    assert_eq!(errors.failures[0].field, "participant_code");
    assert!(errors.failures[0].message.contains("not found"));
}

#[tokio::test]
async fn test_non_admin_actor_is_forbidden() {
    let room = room_with(
        vec![participant(1, "A1", true), participant(2, "B2", false)],
        None,
    );

    let mut repository = MockRoomRepository::new();
    repository
        .expect_get_by_participant_code()
        .times(1)
        .returning(move |_, _| Ok(room.clone()));

    let result = service(repository)
        .remove_participant(request("B2", 2), CancellationToken::new())
        .await;

    let errors = expect_validation(result);
    assert_eq!(errors.kind, ErrorKind::Forbidden);
    assert_eq!(errors.failures[0].field, "participant_code");
    assert!(errors.failures[0].message.contains("administrator"));
}

#[tokio::test]
async fn test_target_from_another_room_is_bad_request() {
    // Participant 9 exists, but in some other room; from this aggregate's
    // point of view the id simply is not present.
    let room = room_with(
        vec![participant(1, "A1", true), participant(2, "B2", false)],
        None,
    );

    let mut repository = MockRoomRepository::new();
    repository
        .expect_get_by_participant_code()
        .times(1)
        .returning(move |_, _| Ok(room.clone()));

    let result = service(repository)
        .remove_participant(request("A1", 9), CancellationToken::new())
        .await;

    let errors = expect_validation(result);
    assert_eq!(errors.kind, ErrorKind::BadRequest);
    assert_eq!(errors.failures[0].field, "participant_id");
    assert!(errors.failures[0].message.contains("does not belong"));
}

#[tokio::test]
async fn test_removing_other_participant_is_bad_request() {
    let room = room_with(
        vec![participant(1, "A1", true), participant(2, "B2", false)],
        None,
    );

    let mut repository = MockRoomRepository::new();
    repository
        .expect_get_by_participant_code()
        .times(1)
        .returning(move |_, _| Ok(room.clone()));

    let result = service(repository)
        .remove_participant(request("A1", 2), CancellationToken::new())
        .await;

    let errors = expect_validation(result);
    assert_eq!(errors.kind, ErrorKind::BadRequest);
    assert_eq!(errors.failures[0].field, "participant_id");
    assert!(errors.failures[0].message.contains("own"));
}

#[tokio::test]
async fn test_closed_room_is_bad_request() {
    let room = room_with(
        vec![participant(1, "A1", true), participant(2, "B2", false)],
        Some(fixture_time()),
    );

    let mut repository = MockRoomRepository::new();
    repository
        .expect_get_by_participant_code()
        .times(1)
        .returning(move |_, _| Ok(room.clone()));

    let result = service(repository)
        .remove_participant(request("A1", 1), CancellationToken::new())
        .await;

    let errors = expect_validation(result);
    assert_eq!(errors.kind, ErrorKind::BadRequest);
    assert_eq!(errors.failures[0].field, "room");
    assert!(errors.failures[0].message.contains("already closed"));
}

#[tokio::test]
async fn test_authorization_is_checked_before_room_state() {
    // A closed room still reports the authorization failure first.
    let room = room_with(
        vec![participant(1, "A1", true), participant(2, "B2", false)],
        Some(fixture_time()),
    );

    let mut repository = MockRoomRepository::new();
    repository
        .expect_get_by_participant_code()
        .times(1)
        .returning(move |_, _| Ok(room.clone()));

    let result = service(repository)
        .remove_participant(request("B2", 2), CancellationToken::new())
        .await;

    let errors = expect_validation(result);
    assert_eq!(errors.kind, ErrorKind::Forbidden);
}

#[tokio::test]
async fn test_update_failure_is_bad_request_with_store_message() {
    let room = room_with(vec![participant(1, "A1", true)], None);

    let mut repository = MockRoomRepository::new();
    repository
        .expect_get_by_participant_code()
        .times(1)
        .returning(move |_, _| Ok(room.clone()));
    repository
        .expect_update()
        .times(1)
        .returning(|_, _| Err(RepositoryError::storage("write rejected")));

    let result = service(repository)
        .remove_participant(request("A1", 1), CancellationToken::new())
        .await;

    let errors = expect_validation(result);
    assert_eq!(errors.kind, ErrorKind::BadRequest);
    assert_eq!(errors.failures[0].field, "");
    assert!(errors.failures[0].message.contains("write rejected"));
}

#[tokio::test]
async fn test_cancelled_load_surfaces_cancellation() {
    let mut repository = MockRoomRepository::new();
    repository
        .expect_get_by_participant_code()
        .times(1)
        .returning(|_, _| Err(RepositoryError::Cancelled));

    let result = service(repository)
        .remove_participant(request("A1", 1), CancellationToken::new())
        .await;

    assert!(matches!(result, Err(ApplicationError::Cancelled)));
}

#[tokio::test]
async fn test_cancelled_update_surfaces_cancellation() {
    let room = room_with(vec![participant(1, "A1", true)], None);

    let mut repository = MockRoomRepository::new();
    repository
        .expect_get_by_participant_code()
        .times(1)
        .returning(move |_, _| Ok(room.clone()));
    repository
        .expect_update()
        .times(1)
        .returning(|_, _| Err(RepositoryError::Cancelled));

    let result = service(repository)
        .remove_participant(request("A1", 1), CancellationToken::new())
        .await;

    assert!(matches!(result, Err(ApplicationError::Cancelled)));
}

#[tokio::test]
async fn test_unexpected_storage_fault_is_not_a_validation_error() {
    let mut repository = MockRoomRepository::new();
    repository
        .expect_get_by_participant_code()
        .times(1)
        .returning(|_, _| Err(RepositoryError::storage("connection reset")));

    let result = service(repository)
        .remove_participant(request("A1", 1), CancellationToken::new())
        .await;

    assert!(matches!(
        result,
        Err(ApplicationError::Repository(RepositoryError::Storage { .. }))
    ));
}

#[tokio::test]
async fn test_room_by_code_returns_room() {
    let room = room_with(vec![participant(1, "A1", true)], None);
    let expected = room.clone();

    let mut repository = MockRoomRepository::new();
    repository
        .expect_get_by_room_code()
        .withf(|code, _| code.as_str() == "room-1")
        .times(1)
        .returning(move |_, _| Ok(room.clone()));

    let result = service(repository)
        .room_by_code("room-1", CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result, expected);
}

#[tokio::test]
async fn test_room_by_code_not_found() {
    let mut repository = MockRoomRepository::new();
    repository
        .expect_get_by_room_code()
        .times(1)
        .returning(|_, _| Err(RepositoryError::NotFound));

    let result = service(repository)
        .room_by_code("missing", CancellationToken::new())
        .await;

    let errors = expect_validation(result);
    assert_eq!(errors.kind, ErrorKind::NotFound);
    assert_eq!(errors.failures[0].field, "room_code");
}
