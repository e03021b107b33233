//! Settlement service
//!
//! Computes and tracks per-participant payment obligations for paid games.
//! Cost is split proportionally to occupied slots, so a participant pays for
//! their own guests; the organizer is never charged. Generation is idempotent
//! per game; replacing an existing set takes an explicit regenerate call.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::config::SettlementConfig;
use crate::database::{
    DatabasePool, GameRepository, NewSettlement, ParticipantRepository, SettlementRepository,
};
use crate::domain::split;
use crate::models::game::Game;
use crate::models::participant::Participant;
use crate::models::settlement::{
    payment_method, GameSettlementSummary, MonthlyPaymentSummary, Settlement, SettlementDetail,
};
use crate::services::hooks::{Notification, NotificationSink};
use crate::utils::errors::{MatchdayError, Result};

/// Settlement engine for paid games
#[derive(Clone)]
pub struct SettlementService {
    pool: DatabasePool,
    games: GameRepository,
    participants: ParticipantRepository,
    settlements: SettlementRepository,
    config: SettlementConfig,
    notifier: Arc<dyn NotificationSink>,
}

impl SettlementService {
    pub fn new(
        pool: DatabasePool,
        games: GameRepository,
        participants: ParticipantRepository,
        settlements: SettlementRepository,
        config: SettlementConfig,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            pool,
            games,
            participants,
            settlements,
            config,
            notifier,
        }
    }

    /// Generate the settlement set for a game.
    ///
    /// Empty for free games. Idempotent: an existing set is returned as-is;
    /// use [`regenerate_for_game`] to replace one. Runs under the game row
    /// lock so generation cannot interleave with a join still confirming a
    /// participant.
    ///
    /// [`regenerate_for_game`]: SettlementService::regenerate_for_game
    pub async fn generate_for_game(&self, game_id: i64) -> Result<Vec<Settlement>> {
        let mut tx = self.pool.begin().await?;

        let game = self
            .games
            .find_for_update(&mut tx, game_id)
            .await?
            .ok_or(MatchdayError::GameNotFound { game_id })?;

        if !game.is_paid || game.cost <= Decimal::ZERO {
            return Ok(Vec::new());
        }

        let existing = self.settlements.for_game_in_tx(&mut tx, game_id).await?;
        if !existing.is_empty() {
            return Ok(existing);
        }

        let roster = self.participants.roster_in_tx(&mut tx, game_id).await?;
        let created = self.generate_locked(&mut tx, &game, &roster).await?;

        tx.commit().await?;

        info!(
            game_id = game_id,
            settlements = created.len(),
            "Settlements generated"
        );

        Ok(created)
    }

    /// Replace a game's settlement set: delete whatever exists, then generate
    /// fresh from the current confirmed roster, all in one transaction.
    pub async fn regenerate_for_game(&self, game_id: i64) -> Result<Vec<Settlement>> {
        let mut tx = self.pool.begin().await?;

        let game = self
            .games
            .find_for_update(&mut tx, game_id)
            .await?
            .ok_or(MatchdayError::GameNotFound { game_id })?;

        let removed = self.settlements.delete_for_game(&mut tx, game_id).await?;

        let created = if game.is_paid && game.cost > Decimal::ZERO {
            let roster = self.participants.roster_in_tx(&mut tx, game_id).await?;
            self.generate_locked(&mut tx, &game, &roster).await?
        } else {
            Vec::new()
        };

        tx.commit().await?;

        info!(
            game_id = game_id,
            removed = removed,
            settlements = created.len(),
            "Settlements regenerated"
        );

        Ok(created)
    }

    /// Mark a settlement paid by the payer.
    pub async fn mark_paid(
        &self,
        settlement_id: i64,
        method: &str,
        reference: Option<&str>,
    ) -> Result<Settlement> {
        self.mark_paid_inner(settlement_id, method, reference, None).await
    }

    /// Mark a settlement paid on the organizer's word. The caller has already
    /// verified the actor is the game's organizer.
    pub async fn mark_paid_by_organizer(&self, settlement_id: i64) -> Result<Settlement> {
        self.mark_paid_inner(
            settlement_id,
            payment_method::CONFIRMED_BY_ORGANIZER,
            None,
            Some("Confirmed by organizer"),
        )
        .await
    }

    /// Cancel an unpaid settlement, recording the reason.
    pub async fn cancel(&self, settlement_id: i64, reason: &str) -> Result<Settlement> {
        match self.settlements.cancel(settlement_id, reason).await? {
            Some(settlement) => {
                info!(settlement_id = settlement_id, reason = reason, "Settlement cancelled");
                Ok(settlement)
            }
            None => Err(self.missing_or_paid(settlement_id).await?),
        }
    }

    /// Get settlement by ID
    pub async fn get_settlement(&self, settlement_id: i64) -> Result<Option<Settlement>> {
        self.settlements.find_by_id(settlement_id).await
    }

    /// Settlements a user owes
    pub async fn user_payables(&self, user_id: Uuid, only_unpaid: bool) -> Result<Vec<Settlement>> {
        self.settlements.payables(user_id, only_unpaid).await
    }

    /// Settlements owed to a user
    pub async fn user_receivables(&self, user_id: Uuid, only_unpaid: bool) -> Result<Vec<Settlement>> {
        self.settlements.receivables(user_id, only_unpaid).await
    }

    /// Outstanding amount a user owes
    pub async fn total_to_pay(&self, user_id: Uuid) -> Result<Decimal> {
        self.settlements.total_to_pay(user_id).await
    }

    /// Outstanding amount owed to a user
    pub async fn total_to_receive(&self, user_id: Uuid) -> Result<Decimal> {
        self.settlements.total_to_receive(user_id).await
    }

    /// Amount a user paid in the current calendar month
    pub async fn paid_this_month(&self, user_id: Uuid) -> Result<Decimal> {
        let now = Utc::now();
        let (from, to) = month_range(now.year(), now.month())?;
        self.settlements.paid_in_range(user_id, from, to).await
    }

    /// A user's payment summary for games starting in the given month
    pub async fn monthly_summary(
        &self,
        user_id: Uuid,
        year: i32,
        month: u32,
    ) -> Result<MonthlyPaymentSummary> {
        let (from, to) = month_range(year, month)?;
        let settlements = self.settlements.for_games_in_range(user_id, from, to).await?;

        let total: Decimal = settlements.iter().map(|s| s.amount).sum();
        let paid: Decimal = settlements.iter().filter(|s| s.is_paid).map(|s| s.amount).sum();

        Ok(MonthlyPaymentSummary {
            total,
            paid,
            unpaid: total - paid,
            count: settlements.len(),
        })
    }

    /// All settlements for a game
    pub async fn settlements_for_game(&self, game_id: i64) -> Result<Vec<Settlement>> {
        self.settlements.for_game(game_id).await
    }

    /// Collection status of one game's settlement set
    pub async fn game_summary(&self, game_id: i64) -> Result<GameSettlementSummary> {
        let game = self
            .games
            .find_by_id(game_id)
            .await?
            .ok_or(MatchdayError::GameNotFound { game_id })?;
        let settlements = self.settlements.for_game(game_id).await?;

        let paid: Vec<&Settlement> = settlements.iter().filter(|s| s.is_paid).collect();
        let total_collected: Decimal = paid.iter().map(|s| s.amount).sum();
        let total_outstanding: Decimal = settlements
            .iter()
            .filter(|s| s.is_outstanding())
            .map(|s| s.amount)
            .sum();

        Ok(GameSettlementSummary {
            game_id,
            total_amount: game.cost,
            total_payers: settlements.len(),
            paid_count: paid.len(),
            unpaid_count: settlements.len() - paid.len(),
            total_collected,
            total_outstanding,
            settlements: settlements
                .iter()
                .map(|s| SettlementDetail {
                    settlement_id: s.id,
                    payer_id: s.payer_id,
                    amount: s.amount,
                    is_paid: s.is_paid,
                    status: s.status,
                    due_date: s.due_date,
                    paid_at: s.paid_at,
                })
                .collect(),
        })
    }

    /// Flip pending settlements past their due date to overdue and emit a
    /// payment reminder for each. Invoked from the maintenance sweep.
    pub async fn flag_overdue(&self) -> Result<Vec<Settlement>> {
        let flipped = self.settlements.mark_overdue(Utc::now()).await?;

        for settlement in &flipped {
            self.notifier
                .notify(Notification::PaymentReminder {
                    settlement_id: settlement.id,
                    game_id: settlement.game_id,
                    payer_id: settlement.payer_id,
                })
                .await;
        }

        if !flipped.is_empty() {
            info!(count = flipped.len(), "Settlements flagged overdue");
        }

        Ok(flipped)
    }

    /// Build and insert the settlement rows for a game under its row lock.
    async fn generate_locked(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        game: &Game,
        roster: &[Participant],
    ) -> Result<Vec<Settlement>> {
        let payers: Vec<(Uuid, i32)> = roster
            .iter()
            .filter(|p| p.is_confirmed() && p.user_id != game.organizer_id)
            .map(|p| (p.user_id, p.total_slots()))
            .collect();

        let shares = split::split_by_slots(game.cost, &payers);
        if shares.is_empty() {
            return Ok(Vec::new());
        }

        let due_date = game.start_time + Duration::days(self.config.due_days);
        let rows: Vec<NewSettlement> = shares
            .iter()
            .map(|share| NewSettlement {
                game_id: game.id,
                payer_id: share.payer_id,
                recipient_id: game.organizer_id,
                amount: share.amount,
                due_date,
            })
            .collect();

        self.settlements.insert_many(&mut *tx, &rows).await
    }

    async fn mark_paid_inner(
        &self,
        settlement_id: i64,
        method: &str,
        reference: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Settlement> {
        match self
            .settlements
            .mark_paid(settlement_id, method, reference, notes)
            .await?
        {
            Some(settlement) => {
                info!(
                    settlement_id = settlement_id,
                    method = method,
                    "Settlement marked paid"
                );
                Ok(settlement)
            }
            None => Err(self.missing_or_paid(settlement_id).await?),
        }
    }

    /// A guarded update matched nothing: either the settlement does not exist
    /// or it is already paid.
    async fn missing_or_paid(&self, settlement_id: i64) -> Result<MatchdayError> {
        Ok(match self.settlements.find_by_id(settlement_id).await? {
            Some(_) => MatchdayError::SettlementAlreadyPaid { settlement_id },
            None => MatchdayError::SettlementNotFound { settlement_id },
        })
    }
}

/// UTC range [first of month, first of next month)
fn month_range(year: i32, month: u32) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let from = Utc
        .with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| MatchdayError::Validation(format!("Invalid month: {year}-{month:02}")))?;
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let to = Utc
        .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| MatchdayError::Validation(format!("Invalid month: {year}-{month:02}")))?;

    Ok((from, to))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_range_spans_one_month() {
        let (from, to) = month_range(2025, 6).unwrap();
        assert_eq!(from.to_rfc3339(), "2025-06-01T00:00:00+00:00");
        assert_eq!(to.to_rfc3339(), "2025-07-01T00:00:00+00:00");
    }

    #[test]
    fn month_range_wraps_december() {
        let (from, to) = month_range(2025, 12).unwrap();
        assert_eq!(from.to_rfc3339(), "2025-12-01T00:00:00+00:00");
        assert_eq!(to.to_rfc3339(), "2026-01-01T00:00:00+00:00");
    }

    #[test]
    fn month_range_rejects_bad_month() {
        assert!(month_range(2025, 13).is_err());
    }
}
