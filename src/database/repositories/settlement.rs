//! Settlement repository implementation

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::settlement::Settlement;
use crate::utils::errors::MatchdayError;

const SETTLEMENT_COLUMNS: &str = "id, game_id, payer_id, recipient_id, amount, due_date, is_paid, \
     status, payment_method, payment_reference, notes, paid_at, created_at";

/// Row data for one settlement to insert.
#[derive(Debug, Clone)]
pub struct NewSettlement {
    pub game_id: i64,
    pub payer_id: Uuid,
    pub recipient_id: Uuid,
    pub amount: Decimal,
    pub due_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SettlementRepository {
    pool: PgPool,
}

impl SettlementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a batch of settlements inside the caller's transaction.
    pub async fn insert_many(
        &self,
        conn: &mut PgConnection,
        settlements: &[NewSettlement],
    ) -> Result<Vec<Settlement>, MatchdayError> {
        let mut created = Vec::with_capacity(settlements.len());
        for row in settlements {
            let settlement = sqlx::query_as::<_, Settlement>(&format!(
                r#"
                INSERT INTO settlements (game_id, payer_id, recipient_id, amount, due_date, is_paid, status, created_at)
                VALUES ($1, $2, $3, $4, $5, FALSE, 'pending', $6)
                RETURNING {SETTLEMENT_COLUMNS}
                "#
            ))
            .bind(row.game_id)
            .bind(row.payer_id)
            .bind(row.recipient_id)
            .bind(row.amount)
            .bind(row.due_date)
            .bind(Utc::now())
            .fetch_one(&mut *conn)
            .await?;
            created.push(settlement);
        }

        Ok(created)
    }

    /// Find settlement by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Settlement>, MatchdayError> {
        let settlement = sqlx::query_as::<_, Settlement>(&format!(
            "SELECT {SETTLEMENT_COLUMNS} FROM settlements WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(settlement)
    }

    /// All settlements for a game
    pub async fn for_game(&self, game_id: i64) -> Result<Vec<Settlement>, MatchdayError> {
        let settlements = sqlx::query_as::<_, Settlement>(&format!(
            "SELECT {SETTLEMENT_COLUMNS} FROM settlements WHERE game_id = $1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(game_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(settlements)
    }

    /// Same as [`for_game`], inside the caller's transaction.
    ///
    /// [`for_game`]: SettlementRepository::for_game
    pub async fn for_game_in_tx(
        &self,
        conn: &mut PgConnection,
        game_id: i64,
    ) -> Result<Vec<Settlement>, MatchdayError> {
        let settlements = sqlx::query_as::<_, Settlement>(&format!(
            "SELECT {SETTLEMENT_COLUMNS} FROM settlements WHERE game_id = $1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(game_id)
        .fetch_all(conn)
        .await?;

        Ok(settlements)
    }

    /// Delete a game's settlement set; returns how many rows went away.
    pub async fn delete_for_game(
        &self,
        conn: &mut PgConnection,
        game_id: i64,
    ) -> Result<u64, MatchdayError> {
        let result = sqlx::query("DELETE FROM settlements WHERE game_id = $1")
            .bind(game_id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected())
    }

    /// Mark a settlement paid. Guarded on `is_paid = FALSE`; returns `None`
    /// when the settlement is missing or already paid.
    pub async fn mark_paid(
        &self,
        id: i64,
        payment_method: &str,
        payment_reference: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Option<Settlement>, MatchdayError> {
        let settlement = sqlx::query_as::<_, Settlement>(&format!(
            r#"
            UPDATE settlements
            SET is_paid = TRUE, status = 'paid', paid_at = $2,
                payment_method = $3, payment_reference = $4, notes = COALESCE($5, notes)
            WHERE id = $1 AND is_paid = FALSE
            RETURNING {SETTLEMENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(Utc::now())
        .bind(payment_method)
        .bind(payment_reference)
        .bind(notes)
        .fetch_optional(&self.pool)
        .await?;

        Ok(settlement)
    }

    /// Cancel a settlement. Guarded on `is_paid = FALSE`.
    pub async fn cancel(&self, id: i64, reason: &str) -> Result<Option<Settlement>, MatchdayError> {
        let settlement = sqlx::query_as::<_, Settlement>(&format!(
            r#"
            UPDATE settlements
            SET status = 'cancelled', notes = $2
            WHERE id = $1 AND is_paid = FALSE
            RETURNING {SETTLEMENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(reason)
        .fetch_optional(&self.pool)
        .await?;

        Ok(settlement)
    }

    /// Settlements a user owes, newest first
    pub async fn payables(
        &self,
        user_id: Uuid,
        only_unpaid: bool,
    ) -> Result<Vec<Settlement>, MatchdayError> {
        let settlements = sqlx::query_as::<_, Settlement>(&format!(
            "SELECT {SETTLEMENT_COLUMNS} FROM settlements \
             WHERE payer_id = $1 AND ($2 = FALSE OR is_paid = FALSE) \
             ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .bind(only_unpaid)
        .fetch_all(&self.pool)
        .await?;

        Ok(settlements)
    }

    /// Settlements owed to a user, newest first
    pub async fn receivables(
        &self,
        user_id: Uuid,
        only_unpaid: bool,
    ) -> Result<Vec<Settlement>, MatchdayError> {
        let settlements = sqlx::query_as::<_, Settlement>(&format!(
            "SELECT {SETTLEMENT_COLUMNS} FROM settlements \
             WHERE recipient_id = $1 AND ($2 = FALSE OR is_paid = FALSE) \
             ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .bind(only_unpaid)
        .fetch_all(&self.pool)
        .await?;

        Ok(settlements)
    }

    /// Sum of what a user still owes
    pub async fn total_to_pay(&self, user_id: Uuid) -> Result<Decimal, MatchdayError> {
        let (total,): (Decimal,) = sqlx::query_as(
            "SELECT COALESCE(SUM(amount), 0) FROM settlements \
             WHERE payer_id = $1 AND is_paid = FALSE AND status IN ('pending', 'overdue')",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    /// Sum of what is still owed to a user
    pub async fn total_to_receive(&self, user_id: Uuid) -> Result<Decimal, MatchdayError> {
        let (total,): (Decimal,) = sqlx::query_as(
            "SELECT COALESCE(SUM(amount), 0) FROM settlements \
             WHERE recipient_id = $1 AND is_paid = FALSE AND status IN ('pending', 'overdue')",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    /// Sum a user paid within [`from`, `to`)
    pub async fn paid_in_range(
        &self,
        user_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Decimal, MatchdayError> {
        let (total,): (Decimal,) = sqlx::query_as(
            "SELECT COALESCE(SUM(amount), 0) FROM settlements \
             WHERE payer_id = $1 AND is_paid = TRUE AND paid_at >= $2 AND paid_at < $3",
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    /// A user's settlements for games starting within [`from`, `to`)
    pub async fn for_games_in_range(
        &self,
        user_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Settlement>, MatchdayError> {
        let settlements = sqlx::query_as::<_, Settlement>(&format!(
            r#"
            SELECT s.{} FROM settlements s
            INNER JOIN games g ON g.id = s.game_id
            WHERE s.payer_id = $1 AND g.start_time >= $2 AND g.start_time < $3
            ORDER BY g.start_time ASC
            "#,
            SETTLEMENT_COLUMNS.replace(", ", ", s.")
        ))
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(settlements)
    }

    /// Flip pending settlements past their due date to overdue; returns the
    /// flipped rows so reminders can go out.
    pub async fn mark_overdue(&self, now: DateTime<Utc>) -> Result<Vec<Settlement>, MatchdayError> {
        let settlements = sqlx::query_as::<_, Settlement>(&format!(
            r#"
            UPDATE settlements
            SET status = 'overdue'
            WHERE status = 'pending' AND is_paid = FALSE AND due_date < $1
            RETURNING {SETTLEMENT_COLUMNS}
            "#
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(settlements)
    }
}

#[cfg(test)]
mod tests {
    use crate::models::settlement::SettlementStatus;

    #[test]
    fn status_values_round_trip_display() {
        assert_eq!(SettlementStatus::Pending.to_string(), "pending");
        assert_eq!(SettlementStatus::Overdue.to_string(), "overdue");
    }
}
