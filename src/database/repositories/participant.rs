//! Participant repository implementation
//!
//! Roster mutations run inside the caller's transaction (under the game row
//! lock), so most methods take the transaction connection explicitly.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::participant::{Participant, ParticipantStatus};
use crate::utils::errors::MatchdayError;

const PARTICIPANT_COLUMNS: &str =
    "id, game_id, user_id, status, waitlist_position, guest_count, joined_at, confirmed_at";

#[derive(Debug, Clone)]
pub struct ParticipantRepository {
    pool: PgPool,
}

impl ParticipantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert an enrollment row with the status the capacity ledger decided.
    pub async fn insert(
        &self,
        conn: &mut PgConnection,
        game_id: i64,
        user_id: Uuid,
        status: ParticipantStatus,
        waitlist_position: Option<i32>,
        guest_count: i32,
    ) -> Result<Participant, MatchdayError> {
        let now = Utc::now();
        let confirmed_at = match status {
            ParticipantStatus::Confirmed => Some(now),
            ParticipantStatus::Reserve => None,
        };

        let participant = sqlx::query_as::<_, Participant>(&format!(
            r#"
            INSERT INTO participants (game_id, user_id, status, waitlist_position, guest_count, joined_at, confirmed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PARTICIPANT_COLUMNS}
            "#
        ))
        .bind(game_id)
        .bind(user_id)
        .bind(status)
        .bind(waitlist_position)
        .bind(guest_count)
        .bind(now)
        .bind(confirmed_at)
        .fetch_one(conn)
        .await?;

        Ok(participant)
    }

    /// Find one enrollment by (game, user)
    pub async fn find(&self, game_id: i64, user_id: Uuid) -> Result<Option<Participant>, MatchdayError> {
        let participant = sqlx::query_as::<_, Participant>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE game_id = $1 AND user_id = $2"
        ))
        .bind(game_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(participant)
    }

    /// Same as [`find`], inside the caller's transaction.
    ///
    /// [`find`]: ParticipantRepository::find
    pub async fn find_in_tx(
        &self,
        conn: &mut PgConnection,
        game_id: i64,
        user_id: Uuid,
    ) -> Result<Option<Participant>, MatchdayError> {
        let participant = sqlx::query_as::<_, Participant>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE game_id = $1 AND user_id = $2"
        ))
        .bind(game_id)
        .bind(user_id)
        .fetch_optional(conn)
        .await?;

        Ok(participant)
    }

    /// Full roster snapshot for a game
    pub async fn roster(&self, game_id: i64) -> Result<Vec<Participant>, MatchdayError> {
        let participants = sqlx::query_as::<_, Participant>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE game_id = $1 ORDER BY joined_at ASC"
        ))
        .bind(game_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(participants)
    }

    /// Full roster snapshot for a game, inside the caller's transaction.
    pub async fn roster_in_tx(
        &self,
        conn: &mut PgConnection,
        game_id: i64,
    ) -> Result<Vec<Participant>, MatchdayError> {
        let participants = sqlx::query_as::<_, Participant>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE game_id = $1 ORDER BY joined_at ASC"
        ))
        .bind(game_id)
        .fetch_all(conn)
        .await?;

        Ok(participants)
    }

    /// Confirmed participants of a game
    pub async fn confirmed(&self, game_id: i64) -> Result<Vec<Participant>, MatchdayError> {
        let participants = sqlx::query_as::<_, Participant>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants \
             WHERE game_id = $1 AND status = 'confirmed' ORDER BY joined_at ASC"
        ))
        .bind(game_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(participants)
    }

    /// The waitlist in promotion order
    pub async fn waitlist(&self, game_id: i64) -> Result<Vec<Participant>, MatchdayError> {
        let participants = sqlx::query_as::<_, Participant>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants \
             WHERE game_id = $1 AND status = 'reserve' ORDER BY waitlist_position ASC"
        ))
        .bind(game_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(participants)
    }

    /// Remove an enrollment row
    pub async fn delete(
        &self,
        conn: &mut PgConnection,
        game_id: i64,
        user_id: Uuid,
    ) -> Result<bool, MatchdayError> {
        let result = sqlx::query("DELETE FROM participants WHERE game_id = $1 AND user_id = $2")
            .bind(game_id)
            .bind(user_id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Promote a waitlisted participant: confirmed status, cleared position,
    /// stamped confirmation time.
    pub async fn promote(
        &self,
        conn: &mut PgConnection,
        participant_id: i64,
        confirmed_at: DateTime<Utc>,
    ) -> Result<Participant, MatchdayError> {
        let participant = sqlx::query_as::<_, Participant>(&format!(
            r#"
            UPDATE participants
            SET status = 'confirmed', waitlist_position = NULL, confirmed_at = $2
            WHERE id = $1
            RETURNING {PARTICIPANT_COLUMNS}
            "#
        ))
        .bind(participant_id)
        .bind(confirmed_at)
        .fetch_one(conn)
        .await?;

        Ok(participant)
    }

    /// Update a confirmed participant's guest count in place
    pub async fn set_guest_count(
        &self,
        conn: &mut PgConnection,
        participant_id: i64,
        guest_count: i32,
    ) -> Result<Participant, MatchdayError> {
        let participant = sqlx::query_as::<_, Participant>(&format!(
            r#"
            UPDATE participants
            SET guest_count = $2
            WHERE id = $1
            RETURNING {PARTICIPANT_COLUMNS}
            "#
        ))
        .bind(participant_id)
        .bind(guest_count)
        .fetch_one(conn)
        .await?;

        Ok(participant)
    }
}
