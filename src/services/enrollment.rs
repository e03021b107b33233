//! Enrollment service
//!
//! Owns the participant lifecycle for a game: joining, leaving, guest-count
//! changes and waitlist promotion. Every mutating operation runs inside one
//! transaction that locks the game row first, so the capacity check and the
//! roster write it guards are atomic per game. Concurrent operations on
//! different games proceed in parallel; operations on the same game queue on
//! the row lock.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info};

use crate::config::EnrollmentConfig;
use crate::database::{DatabasePool, GameRepository, ParticipantRepository};
use crate::domain::capacity;
use crate::models::game::{Game, GameStatus};
use crate::models::participant::{Participant, ParticipantStatus};
use crate::services::hooks::{Notification, NotificationSink, StatisticsSink};
use crate::utils::errors::{MatchdayError, Result};

/// Enrollment state machine over a game's roster
#[derive(Clone)]
pub struct EnrollmentService {
    pool: DatabasePool,
    games: GameRepository,
    participants: ParticipantRepository,
    config: EnrollmentConfig,
    stats: Arc<dyn StatisticsSink>,
    notifier: Arc<dyn NotificationSink>,
}

impl EnrollmentService {
    pub fn new(
        pool: DatabasePool,
        games: GameRepository,
        participants: ParticipantRepository,
        config: EnrollmentConfig,
        stats: Arc<dyn StatisticsSink>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            pool,
            games,
            participants,
            config,
            stats,
            notifier,
        }
    }

    /// Join a game with `guest_count` guests.
    ///
    /// The capacity ledger decides between a confirmed spot and the waitlist;
    /// a request whose party exactly fills the remaining capacity confirms.
    /// Joining flips the game to `full` once confirmed occupancy reaches
    /// capacity.
    pub async fn join(&self, game_id: i64, user_id: uuid::Uuid, guest_count: i32) -> Result<Participant> {
        if guest_count < 0 {
            return Err(MatchdayError::Validation(
                "Guest count cannot be negative".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let game = self
            .games
            .find_for_update(&mut tx, game_id)
            .await?
            .ok_or(MatchdayError::GameNotFound { game_id })?;

        self.check_registration_open(&game)?;

        if self
            .participants
            .find_in_tx(&mut tx, game_id, user_id)
            .await?
            .is_some()
        {
            return Err(MatchdayError::AlreadyEnrolled { game_id, user_id });
        }

        let roster = self.participants.roster_in_tx(&mut tx, game_id).await?;
        let occupied = capacity::occupied_slots(&roster);
        let requested = 1 + guest_count;

        let outcome = capacity::decide_join(game.max_participants, occupied, requested, game.waitlist_seq);

        let waitlist_position = match outcome.status {
            ParticipantStatus::Confirmed => None,
            // The counter bump shares the game row lock, so the position the
            // ledger computed is the one the database hands out.
            ParticipantStatus::Reserve => {
                Some(self.games.next_waitlist_position(&mut tx, game_id).await?)
            }
        };

        let participant = self
            .participants
            .insert(&mut tx, game_id, user_id, outcome.status, waitlist_position, guest_count)
            .await?;

        if outcome.status == ParticipantStatus::Confirmed
            && occupied + requested >= game.max_participants
            && game.status == GameStatus::Open
        {
            self.games.set_status(&mut tx, game_id, GameStatus::Full).await?;
        }

        tx.commit().await?;

        info!(
            game_id = game_id,
            user_id = %user_id,
            guest_count = guest_count,
            status = %participant.status,
            "User joined game"
        );

        self.stats.user_stats_changed(user_id).await;
        match participant.waitlist_position {
            Some(position) => {
                self.notifier
                    .notify(Notification::Waitlisted {
                        game_id,
                        user_id,
                        position,
                    })
                    .await
            }
            None => {
                self.notifier
                    .notify(Notification::JoinConfirmed { game_id, user_id })
                    .await
            }
        }

        Ok(participant)
    }

    /// Leave a game.
    ///
    /// A confirmed departure frees slots, so promotion runs inside the same
    /// transaction before the operation is considered complete.
    pub async fn leave(&self, game_id: i64, user_id: uuid::Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let game = self
            .games
            .find_for_update(&mut tx, game_id)
            .await?
            .ok_or(MatchdayError::GameNotFound { game_id })?;

        if game.organizer_id == user_id {
            return Err(MatchdayError::OrganizerCannotLeave { game_id });
        }

        let participant = self
            .participants
            .find_in_tx(&mut tx, game_id, user_id)
            .await?
            .ok_or(MatchdayError::NotEnrolled { game_id, user_id })?;

        let was_confirmed = participant.is_confirmed();
        self.participants.delete(&mut tx, game_id, user_id).await?;

        // A freed confirmed slot is offered to the waitlist before the
        // operation completes; terminal games keep their roster frozen.
        let promoted = if was_confirmed && !game.status.is_terminal() {
            self.promote_locked(&mut tx, &game).await?
        } else {
            Vec::new()
        };

        self.recompute_status(&mut tx, &game).await?;

        tx.commit().await?;

        info!(
            game_id = game_id,
            user_id = %user_id,
            was_confirmed = was_confirmed,
            promoted = promoted.len(),
            "User left game"
        );

        self.stats.user_stats_changed(user_id).await;
        for p in &promoted {
            self.notifier
                .notify(Notification::Promoted {
                    game_id,
                    user_id: p.user_id,
                })
                .await;
        }

        Ok(())
    }

    /// Offer free slots to the waitlist.
    ///
    /// Walks the waitlist in position order, skipping parties that do not fit
    /// the remaining free slots. A no-op when the game has no free capacity.
    pub async fn promote_from_waitlist(&self, game_id: i64) -> Result<Vec<Participant>> {
        let mut tx = self.pool.begin().await?;

        let game = self
            .games
            .find_for_update(&mut tx, game_id)
            .await?
            .ok_or(MatchdayError::GameNotFound { game_id })?;

        if game.status.is_terminal() {
            return Ok(Vec::new());
        }

        let promoted = self.promote_locked(&mut tx, &game).await?;
        self.recompute_status(&mut tx, &game).await?;

        tx.commit().await?;

        for p in &promoted {
            self.notifier
                .notify(Notification::Promoted {
                    game_id,
                    user_id: p.user_id,
                })
                .await;
        }

        Ok(promoted)
    }

    /// Change a confirmed participant's guest count in place.
    ///
    /// Rejected without mutation when the new party size would overflow
    /// capacity. Never triggers promotion: growth cannot free slots, and a
    /// shrink deliberately leaves promotion to departures so the policy stays
    /// auditable.
    pub async fn update_guest_count(
        &self,
        game_id: i64,
        user_id: uuid::Uuid,
        guest_count: i32,
    ) -> Result<Participant> {
        if guest_count < 0 {
            return Err(MatchdayError::Validation(
                "Guest count cannot be negative".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let game = self
            .games
            .find_for_update(&mut tx, game_id)
            .await?
            .ok_or(MatchdayError::GameNotFound { game_id })?;

        let participant = self
            .participants
            .find_in_tx(&mut tx, game_id, user_id)
            .await?
            .ok_or(MatchdayError::NotEnrolled { game_id, user_id })?;

        if !participant.is_confirmed() {
            return Err(MatchdayError::NotConfirmed { game_id, user_id });
        }

        let roster = self.participants.roster_in_tx(&mut tx, game_id).await?;
        let occupied = capacity::occupied_slots(&roster);
        let old_slots = participant.total_slots();
        let new_slots = 1 + guest_count;

        if !capacity::guest_change_fits(game.max_participants, occupied, old_slots, new_slots) {
            return Err(MatchdayError::CapacityExceeded {
                game_id,
                requested: new_slots,
                available: game.max_participants - (occupied - old_slots),
            });
        }

        let updated = self
            .participants
            .set_guest_count(&mut tx, participant.id, guest_count)
            .await?;

        self.recompute_status(&mut tx, &game).await?;

        tx.commit().await?;

        debug!(
            game_id = game_id,
            user_id = %user_id,
            guest_count = guest_count,
            "Guest count updated"
        );

        Ok(updated)
    }

    /// Free confirmed slots in a game, never negative
    pub async fn available_slots(&self, game_id: i64) -> Result<i32> {
        let game = self
            .games
            .find_by_id(game_id)
            .await?
            .ok_or(MatchdayError::GameNotFound { game_id })?;

        let confirmed = self.participants.confirmed(game_id).await?;
        let occupied: i32 = confirmed.iter().map(Participant::total_slots).sum();

        Ok(capacity::available_slots(game.max_participants, occupied))
    }

    /// The game's waitlist, ordered by position
    pub async fn waitlist(&self, game_id: i64) -> Result<Vec<Participant>> {
        self.participants.waitlist(game_id).await
    }

    /// The game's full roster
    pub async fn roster(&self, game_id: i64) -> Result<Vec<Participant>> {
        self.participants.roster(game_id).await
    }

    /// Whether a user is enrolled (confirmed or waitlisted) in a game
    pub async fn is_enrolled(&self, game_id: i64, user_id: uuid::Uuid) -> Result<bool> {
        Ok(self.participants.find(game_id, user_id).await?.is_some())
    }

    fn check_registration_open(&self, game: &Game) -> Result<()> {
        if game.status.is_terminal() {
            return Err(MatchdayError::RegistrationClosed { game_id: game.id });
        }

        let closes_at = game.start_time - Duration::minutes(self.config.registration_close_minutes);
        if Utc::now() >= closes_at {
            return Err(MatchdayError::RegistrationClosed { game_id: game.id });
        }

        Ok(())
    }

    /// Promote waitlisted participants into free slots, under the game lock.
    async fn promote_locked(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        game: &Game,
    ) -> Result<Vec<Participant>> {
        let roster = self.participants.roster_in_tx(&mut *tx, game.id).await?;
        let occupied = capacity::occupied_slots(&roster);
        let plan = capacity::plan_promotions(game.max_participants, occupied, &roster);

        let now = Utc::now();
        let mut promoted = Vec::with_capacity(plan.len());
        for candidate in plan {
            let p = self.participants.promote(&mut *tx, candidate.id, now).await?;
            info!(
                game_id = game.id,
                user_id = %p.user_id,
                slots = p.total_slots(),
                "Promoted from waitlist"
            );
            promoted.push(p);
        }

        Ok(promoted)
    }

    /// Re-derive open/full from post-mutation occupancy. Terminal states are
    /// left untouched.
    async fn recompute_status(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        game: &Game,
    ) -> Result<()> {
        if game.status.is_terminal() {
            return Ok(());
        }

        let roster = self.participants.roster_in_tx(&mut *tx, game.id).await?;
        let occupied = capacity::occupied_slots(&roster);
        let target = if occupied >= game.max_participants {
            GameStatus::Full
        } else {
            GameStatus::Open
        };

        if target != game.status {
            self.games.set_status(&mut *tx, game.id, target).await?;
        }

        Ok(())
    }
}
