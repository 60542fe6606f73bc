use std::future::Future;

use application::RoomRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{Participant, ParticipantCode, ParticipantId, RepositoryError, Room, RoomCode};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use tokio_util::sync::CancellationToken;

pub async fn create_pg_pool(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

fn map_sqlx_err(err: sqlx::Error) -> RepositoryError {
    RepositoryError::storage(err.to_string())
}

fn invalid_data(message: impl Into<String>) -> RepositoryError {
    RepositoryError::storage(message)
}

/// Race a storage round-trip against the cancellation token.
async fn guard<T>(
    cancel: &CancellationToken,
    future: impl Future<Output = T>,
) -> Result<T, RepositoryError> {
    tokio::select! {
        _ = cancel.cancelled() => Err(RepositoryError::Cancelled),
        value = future => Ok(value),
    }
}

fn id_as_i64(id: ParticipantId) -> Result<i64, RepositoryError> {
    i64::try_from(u64::from(id)).map_err(|_| invalid_data("participant id out of range"))
}

fn version_as_i64(version: u64) -> Result<i64, RepositoryError> {
    i64::try_from(version).map_err(|_| invalid_data("room version out of range"))
}

#[derive(Debug, FromRow)]
struct RoomRecord {
    room_code: String,
    closed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: i64,
}

#[derive(Debug, FromRow)]
struct ParticipantRecord {
    participant_id: i64,
    participant_code: String,
    first_name: String,
    last_name: String,
    is_admin: bool,
}

impl TryFrom<ParticipantRecord> for Participant {
    type Error = RepositoryError;

    fn try_from(value: ParticipantRecord) -> Result<Self, Self::Error> {
        let id = u64::try_from(value.participant_id)
            .map_err(|_| invalid_data("negative participant id"))?;
        Participant::new(
            ParticipantId::new(id),
            ParticipantCode::new(value.participant_code),
            value.first_name,
            value.last_name,
            value.is_admin,
        )
        .map_err(|err| invalid_data(err.to_string()))
    }
}

fn build_room(record: RoomRecord, members: Vec<ParticipantRecord>) -> Result<Room, RepositoryError> {
    let mut participants = Vec::with_capacity(members.len());
    for member in members {
        participants.push(Participant::try_from(member)?);
    }
    let version =
        u64::try_from(record.version).map_err(|_| invalid_data("negative room version"))?;
    Room::reconstitute(
        RoomCode::new(record.room_code),
        participants,
        record.closed_at,
        record.created_at,
        record.updated_at,
        version,
    )
    .map_err(|err| invalid_data(err.to_string()))
}

#[derive(Clone)]
pub struct PgRoomRepository {
    pool: PgPool,
}

impl PgRoomRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_room(
        &self,
        room_code: &str,
        cancel: &CancellationToken,
    ) -> Result<Room, RepositoryError> {
        let record = guard(
            cancel,
            sqlx::query_as::<_, RoomRecord>(
                r#"
                SELECT room_code, closed_at, created_at, updated_at, version
                FROM rooms
                WHERE room_code = $1
                "#,
            )
            .bind(room_code)
            .fetch_optional(&self.pool),
        )
        .await?
        .map_err(map_sqlx_err)?
        .ok_or(RepositoryError::NotFound)?;

        let members = guard(
            cancel,
            sqlx::query_as::<_, ParticipantRecord>(
                r#"
                SELECT participant_id, participant_code, first_name, last_name, is_admin
                FROM participants
                WHERE room_code = $1 AND removed_at IS NULL
                ORDER BY ordinal
                "#,
            )
            .bind(room_code)
            .fetch_all(&self.pool),
        )
        .await?
        .map_err(map_sqlx_err)?;

        build_room(record, members)
    }
}

#[async_trait]
impl RoomRepository for PgRoomRepository {
    async fn get_by_participant_code(
        &self,
        code: &ParticipantCode,
        cancel: CancellationToken,
    ) -> Result<Room, RepositoryError> {
        // Removed participants keep their row, so previously issued codes
        // still resolve to their room.
        let room_code = guard(
            &cancel,
            sqlx::query_as::<_, (String,)>(
                r#"SELECT room_code FROM participants WHERE participant_code = $1"#,
            )
            .bind(code.as_str())
            .fetch_optional(&self.pool),
        )
        .await?
        .map_err(map_sqlx_err)?;

        let (room_code,) = room_code.ok_or(RepositoryError::NotFound)?;
        self.load_room(&room_code, &cancel).await
    }

    async fn get_by_room_code(
        &self,
        code: &RoomCode,
        cancel: CancellationToken,
    ) -> Result<Room, RepositoryError> {
        self.load_room(code.as_str(), &cancel).await
    }

    async fn update(
        &self,
        room: &Room,
        cancel: CancellationToken,
    ) -> Result<Room, RepositoryError> {
        if cancel.is_cancelled() {
            return Err(RepositoryError::Cancelled);
        }

        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;

        let result = sqlx::query(
            r#"
            UPDATE rooms
            SET closed_at = $2, updated_at = $3, version = version + 1
            WHERE room_code = $1 AND version = $4
            "#,
        )
        .bind(room.room_code.as_str())
        .bind(room.closed_at)
        .bind(room.updated_at)
        .bind(version_as_i64(room.version)?)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_err)?;

        if result.rows_affected() == 0 {
            // Distinguish a missing room from a concurrent write.
            let exists = sqlx::query_as::<_, (i64,)>(
                r#"SELECT version FROM rooms WHERE room_code = $1"#,
            )
            .bind(room.room_code.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;
            return Err(match exists {
                Some(_) => {
                    tracing::debug!(room_code = %room.room_code, "version conflict on update");
                    RepositoryError::Conflict
                }
                None => RepositoryError::NotFound,
            });
        }

        let retained = room
            .participants
            .iter()
            .map(|p| id_as_i64(p.id))
            .collect::<Result<Vec<_>, _>>()?;

        sqlx::query(
            r#"
            UPDATE participants
            SET removed_at = $3
            WHERE room_code = $1 AND removed_at IS NULL AND NOT (participant_id = ANY($2))
            "#,
        )
        .bind(room.room_code.as_str())
        .bind(&retained)
        .bind(room.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_err)?;

        for (ordinal, participant) in room.participants.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO participants
                    (room_code, participant_id, participant_code, first_name, last_name, is_admin, ordinal)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (room_code, participant_id) DO UPDATE
                SET participant_code = EXCLUDED.participant_code,
                    first_name = EXCLUDED.first_name,
                    last_name = EXCLUDED.last_name,
                    is_admin = EXCLUDED.is_admin,
                    ordinal = EXCLUDED.ordinal
                "#,
            )
            .bind(room.room_code.as_str())
            .bind(id_as_i64(participant.id)?)
            .bind(participant.code.as_str())
            .bind(&participant.first_name)
            .bind(&participant.last_name)
            .bind(participant.is_admin)
            .bind(ordinal as i32)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;
        }

        if cancel.is_cancelled() {
            // Dropping the transaction rolls everything back.
            return Err(RepositoryError::Cancelled);
        }

        tx.commit().await.map_err(map_sqlx_err)?;

        self.load_room(room.room_code.as_str(), &cancel).await
    }
}
