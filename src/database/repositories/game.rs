//! Game repository implementation

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::game::{CreateGameRequest, Game, GameStatus, UpdateGameRequest};
use crate::utils::errors::MatchdayError;

const GAME_COLUMNS: &str = "id, name, organizer_id, group_id, location, start_time, end_time, \
     max_participants, cost, is_paid, is_public, pattern, series_id, status, \
     cancellation_reason, waitlist_seq, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct GameRepository {
    pool: PgPool,
}

impl GameRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert one game row. `start_time`/`end_time` are passed separately so
    /// series seeding can reuse one template request for several occurrences.
    pub async fn create(
        &self,
        conn: &mut PgConnection,
        request: &CreateGameRequest,
        series_id: Option<Uuid>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<Game, MatchdayError> {
        let game = sqlx::query_as::<_, Game>(&format!(
            r#"
            INSERT INTO games (name, organizer_id, group_id, location, start_time, end_time,
                               max_participants, cost, is_paid, is_public, pattern, series_id,
                               status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, 'open', $13, $13)
            RETURNING {GAME_COLUMNS}
            "#
        ))
        .bind(&request.name)
        .bind(request.organizer_id)
        .bind(request.group_id)
        .bind(&request.location)
        .bind(start_time)
        .bind(end_time)
        .bind(request.max_participants)
        .bind(request.cost)
        .bind(request.is_paid)
        .bind(request.is_public)
        .bind(request.pattern)
        .bind(series_id)
        .bind(Utc::now())
        .fetch_one(conn)
        .await?;

        Ok(game)
    }

    /// Find game by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Game>, MatchdayError> {
        let game = sqlx::query_as::<_, Game>(&format!(
            "SELECT {GAME_COLUMNS} FROM games WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(game)
    }

    /// Find a game and lock its row for the rest of the transaction.
    ///
    /// Every roster mutation for a game goes through this lock; it is what
    /// serializes concurrent joins/leaves against the capacity check.
    pub async fn find_for_update(
        &self,
        conn: &mut PgConnection,
        id: i64,
    ) -> Result<Option<Game>, MatchdayError> {
        let game = sqlx::query_as::<_, Game>(&format!(
            "SELECT {GAME_COLUMNS} FROM games WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(game)
    }

    /// Update template fields of a game inside the caller's transaction
    pub async fn update(
        &self,
        conn: &mut PgConnection,
        id: i64,
        request: &UpdateGameRequest,
    ) -> Result<Game, MatchdayError> {
        let game = sqlx::query_as::<_, Game>(&format!(
            r#"
            UPDATE games
            SET name = COALESCE($2, name),
                location = COALESCE($3, location),
                start_time = COALESCE($4, start_time),
                end_time = COALESCE($5, end_time),
                max_participants = COALESCE($6, max_participants),
                cost = COALESCE($7, cost),
                is_paid = COALESCE($8, is_paid),
                is_public = COALESCE($9, is_public),
                updated_at = $10
            WHERE id = $1
            RETURNING {GAME_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&request.name)
        .bind(&request.location)
        .bind(request.start_time)
        .bind(request.end_time)
        .bind(request.max_participants)
        .bind(request.cost)
        .bind(request.is_paid)
        .bind(request.is_public)
        .bind(Utc::now())
        .fetch_one(conn)
        .await?;

        Ok(game)
    }

    /// Delete game (organizer-initiated; the scheduler never deletes)
    pub async fn delete(&self, id: i64) -> Result<bool, MatchdayError> {
        let result = sqlx::query("DELETE FROM games WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Set game status inside a transaction
    pub async fn set_status(
        &self,
        conn: &mut PgConnection,
        id: i64,
        status: GameStatus,
    ) -> Result<(), MatchdayError> {
        sqlx::query("UPDATE games SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(status)
            .bind(Utc::now())
            .execute(conn)
            .await?;

        Ok(())
    }

    /// Cancel a game, recording the reason
    pub async fn set_cancelled(
        &self,
        conn: &mut PgConnection,
        id: i64,
        reason: &str,
    ) -> Result<(), MatchdayError> {
        sqlx::query(
            "UPDATE games SET status = 'cancelled', cancellation_reason = $2, updated_at = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(reason)
        .bind(Utc::now())
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Advance the game's waitlist position counter and return the new value.
    ///
    /// Must run under the game row lock taken by [`find_for_update`]; the
    /// counter only ever grows, so positions are never reused.
    ///
    /// [`find_for_update`]: GameRepository::find_for_update
    pub async fn next_waitlist_position(
        &self,
        conn: &mut PgConnection,
        id: i64,
    ) -> Result<i32, MatchdayError> {
        let (position,): (i32,) = sqlx::query_as(
            "UPDATE games SET waitlist_seq = waitlist_seq + 1 WHERE id = $1 RETURNING waitlist_seq",
        )
        .bind(id)
        .fetch_one(conn)
        .await?;

        Ok(position)
    }

    /// Get upcoming non-cancelled games
    pub async fn list_upcoming(&self, limit: Option<i64>) -> Result<Vec<Game>, MatchdayError> {
        let limit = limit.unwrap_or(50);
        let games = sqlx::query_as::<_, Game>(&format!(
            "SELECT {GAME_COLUMNS} FROM games \
             WHERE start_time > NOW() AND status <> 'cancelled' \
             ORDER BY start_time ASC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(games)
    }

    /// Get publicly visible games that are still open or full
    pub async fn list_public(&self) -> Result<Vec<Game>, MatchdayError> {
        let games = sqlx::query_as::<_, Game>(&format!(
            "SELECT {GAME_COLUMNS} FROM games \
             WHERE is_public = TRUE AND status IN ('open', 'full') \
             ORDER BY start_time ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(games)
    }

    /// Get games organized by a user, newest first
    pub async fn list_by_organizer(&self, organizer_id: Uuid) -> Result<Vec<Game>, MatchdayError> {
        let games = sqlx::query_as::<_, Game>(&format!(
            "SELECT {GAME_COLUMNS} FROM games WHERE organizer_id = $1 ORDER BY start_time DESC"
        ))
        .bind(organizer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(games)
    }

    /// Get games a user is enrolled in
    pub async fn list_by_participant(&self, user_id: Uuid) -> Result<Vec<Game>, MatchdayError> {
        let games = sqlx::query_as::<_, Game>(&format!(
            r#"
            SELECT g.{} FROM games g
            INNER JOIN participants p ON g.id = p.game_id
            WHERE p.user_id = $1
            ORDER BY g.start_time ASC
            "#,
            GAME_COLUMNS.replace(", ", ", g.")
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(games)
    }

    /// Get a group's non-cancelled games
    pub async fn list_by_group(&self, group_id: i64) -> Result<Vec<Game>, MatchdayError> {
        let games = sqlx::query_as::<_, Game>(&format!(
            "SELECT {GAME_COLUMNS} FROM games \
             WHERE group_id = $1 AND status <> 'cancelled' \
             ORDER BY start_time ASC"
        ))
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(games)
    }

    /// Ids of games whose start time has passed the grace cutoff and whose
    /// status is not yet terminal.
    pub async fn find_expired_ids(&self, cutoff: DateTime<Utc>) -> Result<Vec<i64>, MatchdayError> {
        let rows: Vec<(i64,)> = sqlx::query_as(
            "SELECT id FROM games WHERE start_time < $1 AND status IN ('open', 'full') ORDER BY start_time ASC",
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Distinct series ids that still have at least one non-cancelled occurrence.
    pub async fn active_series_ids(&self) -> Result<Vec<Uuid>, MatchdayError> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            "SELECT DISTINCT series_id FROM games \
             WHERE series_id IS NOT NULL AND status <> 'cancelled'",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// The series' latest non-cancelled occurrence; template fields for the
    /// next occurrence are copied from it.
    pub async fn latest_in_series(&self, series_id: Uuid) -> Result<Option<Game>, MatchdayError> {
        let game = sqlx::query_as::<_, Game>(&format!(
            "SELECT {GAME_COLUMNS} FROM games \
             WHERE series_id = $1 AND status <> 'cancelled' \
             ORDER BY start_time DESC LIMIT 1"
        ))
        .bind(series_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(game)
    }

    /// Count a series' upcoming (non-cancelled, future-start) occurrences.
    pub async fn count_upcoming_in_series(
        &self,
        series_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<i64, MatchdayError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM games \
             WHERE series_id = $1 AND status <> 'cancelled' AND start_time > $2",
        )
        .bind(series_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
