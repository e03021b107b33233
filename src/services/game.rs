//! Game lifecycle service
//!
//! Owns game creation, editing, cancellation and completion, plus the
//! recurring-series machinery: seeding a series from a template and topping
//! active series up to their lookahead.

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::EnrollmentConfig;
use crate::database::{DatabasePool, GameRepository, ParticipantRepository};
use crate::domain::recurrence;
use crate::models::game::{CreateGameRequest, Game, GameStatus, UpdateGameRequest};
use crate::models::participant::{Participant, ParticipantStatus};
use crate::services::hooks::{Notification, NotificationSink, StatisticsSink};
use crate::utils::errors::{MatchdayError, Result};

/// Game lifecycle controller
#[derive(Clone)]
pub struct GameService {
    pool: DatabasePool,
    games: GameRepository,
    participants: ParticipantRepository,
    config: EnrollmentConfig,
    stats: Arc<dyn StatisticsSink>,
    notifier: Arc<dyn NotificationSink>,
}

impl GameService {
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

    /// Create a single game.
    ///
    /// The organizer is auto-enrolled as a confirmed participant with zero
    /// guests in the same transaction; this first enrollment never needs
    /// waitlisting because capacity is validated to be at least the minimum.
    pub async fn create_game(&self, request: &CreateGameRequest) -> Result<Game> {
        self.validate_create(request)?;
        let request = Self::normalized(request);

        let mut tx = self.pool.begin().await?;

        let game = self
            .games
            .create(&mut tx, &request, None, request.start_time, request.end_time)
            .await?;
        self.enroll_organizer(&mut tx, &game).await?;

        tx.commit().await?;

        info!(game_id = game.id, organizer_id = %game.organizer_id, "Game created");
        self.stats.user_stats_changed(game.organizer_id).await;

        Ok(game)
    }

    /// Create a recurring series from a template.
    ///
    /// Seeds occurrences at the pattern's offset under one fresh series id;
    /// daily series seed a single occurrence, all other patterns seed four.
    /// The organizer is auto-enrolled in every occurrence.
    pub async fn create_recurring_series(&self, request: &CreateGameRequest) -> Result<Vec<Game>> {
        let pattern = request.pattern.ok_or_else(|| {
            MatchdayError::Validation("A recurring series needs a recurrence pattern".to_string())
        })?;
        self.validate_create(request)?;
        let request = Self::normalized(request);

        let series_id = Uuid::new_v4();
        let plans = recurrence::plan_series_seed(request.start_time, request.end_time, pattern);

        let mut tx = self.pool.begin().await?;

        let mut created = Vec::with_capacity(plans.len());
        for plan in plans {
            let game = self
                .games
                .create(&mut tx, &request, Some(series_id), plan.start_time, plan.end_time)
                .await?;
            self.enroll_organizer(&mut tx, &game).await?;
            created.push(game);
        }

        tx.commit().await?;

        info!(
            series_id = %series_id,
            occurrences = created.len(),
            pattern = ?pattern,
            "Recurring series created"
        );
        self.stats.user_stats_changed(request.organizer_id).await;

        Ok(created)
    }

    /// Get game by ID
    pub async fn get_game(&self, game_id: i64) -> Result<Option<Game>> {
        self.games.find_by_id(game_id).await
    }

    /// Update a game's template fields.
    ///
    /// Capacity can never be reduced below the currently confirmed occupancy;
    /// that would silently overbook the roster.
    pub async fn update_game(&self, game_id: i64, request: &UpdateGameRequest) -> Result<Game> {
        let mut tx = self.pool.begin().await?;

        let game = self
            .games
            .find_for_update(&mut tx, game_id)
            .await?
            .ok_or(MatchdayError::GameNotFound { game_id })?;

        let start = request.start_time.unwrap_or(game.start_time);
        let end = request.end_time.unwrap_or(game.end_time);
        if end <= start {
            return Err(MatchdayError::Validation(
                "Game must end after it starts".to_string(),
            ));
        }

        if let Some(cost) = request.cost {
            if cost < Decimal::ZERO {
                return Err(MatchdayError::Validation("Cost cannot be negative".to_string()));
            }
        }

        if let Some(max) = request.max_participants {
            if max < self.config.min_participants || max > self.config.max_participants {
                return Err(MatchdayError::Validation(format!(
                    "Max participants must be between {} and {}",
                    self.config.min_participants, self.config.max_participants
                )));
            }

            let roster = self.participants.roster_in_tx(&mut tx, game_id).await?;
            let occupied = crate::domain::capacity::occupied_slots(&roster);
            if max < occupied {
                return Err(MatchdayError::Validation(format!(
                    "Cannot reduce capacity to {max}: {occupied} slot(s) already confirmed"
                )));
            }
        }

        let updated = self.games.update(&mut tx, game_id, request).await?;
        tx.commit().await?;

        info!(game_id = game_id, "Game updated");
        Ok(updated)
    }

    /// Delete a game outright. Organizer-initiated only; expiry never deletes.
    pub async fn delete_game(&self, game_id: i64) -> Result<bool> {
        let deleted = self.games.delete(game_id).await?;
        if deleted {
            info!(game_id = game_id, "Game deleted");
        }
        Ok(deleted)
    }

    /// Cancel a game with a reason. Terminal; confirmed participants are
    /// notified. Settlements, if any exist, are left as they are.
    pub async fn cancel_game(&self, game_id: i64, reason: &str) -> Result<Game> {
        let mut tx = self.pool.begin().await?;

        let game = self
            .games
            .find_for_update(&mut tx, game_id)
            .await?
            .ok_or(MatchdayError::GameNotFound { game_id })?;

        if !game.status.can_transition_to(GameStatus::Cancelled) {
            return Err(MatchdayError::InvalidStateTransition {
                from: game.status.to_string(),
                to: GameStatus::Cancelled.to_string(),
            });
        }

        self.games.set_cancelled(&mut tx, game_id, reason).await?;
        let roster = self.participants.roster_in_tx(&mut tx, game_id).await?;
        tx.commit().await?;

        info!(game_id = game_id, reason = reason, "Game cancelled");

        for p in roster.iter().filter(|p| p.is_confirmed()) {
            self.notifier
                .notify(Notification::GameCancelled {
                    game_id,
                    user_id: p.user_id,
                    reason: reason.to_string(),
                })
                .await;
        }

        let mut cancelled = game;
        cancelled.status = GameStatus::Cancelled;
        cancelled.cancellation_reason = Some(reason.to_string());
        Ok(cancelled)
    }

    /// Re-derive open/full from current occupancy. Terminal games stay put.
    pub async fn reopen_game(&self, game_id: i64) -> Result<Game> {
        let mut tx = self.pool.begin().await?;

        let game = self
            .games
            .find_for_update(&mut tx, game_id)
            .await?
            .ok_or(MatchdayError::GameNotFound { game_id })?;

        if game.status.is_terminal() {
            return Err(MatchdayError::InvalidStateTransition {
                from: game.status.to_string(),
                to: GameStatus::Open.to_string(),
            });
        }

        let roster = self.participants.roster_in_tx(&mut tx, game_id).await?;
        let occupied = crate::domain::capacity::occupied_slots(&roster);
        let target = if occupied >= game.max_participants {
            GameStatus::Full
        } else {
            GameStatus::Open
        };
        self.games.set_status(&mut tx, game_id, target).await?;

        tx.commit().await?;

        let mut updated = game;
        updated.status = target;
        Ok(updated)
    }

    /// Upcoming non-cancelled games
    pub async fn upcoming_games(&self, limit: Option<i64>) -> Result<Vec<Game>> {
        self.games.list_upcoming(limit).await
    }

    /// Publicly visible open/full games
    pub async fn public_games(&self) -> Result<Vec<Game>> {
        self.games.list_public().await
    }

    /// Games organized by a user
    pub async fn games_by_organizer(&self, organizer_id: Uuid) -> Result<Vec<Game>> {
        self.games.list_by_organizer(organizer_id).await
    }

    /// Games a user is enrolled in
    pub async fn games_by_participant(&self, user_id: Uuid) -> Result<Vec<Game>> {
        self.games.list_by_participant(user_id).await
    }

    /// A group's non-cancelled games
    pub async fn games_by_group(&self, group_id: i64) -> Result<Vec<Game>> {
        self.games.list_by_group(group_id).await
    }

    /// Ids of games whose start has passed the given cutoff and that are not
    /// yet terminal. Used by the expiry sweep.
    pub async fn expired_game_ids(&self, cutoff: chrono::DateTime<Utc>) -> Result<Vec<i64>> {
        self.games.find_expired_ids(cutoff).await
    }

    /// Mark one expired game completed.
    ///
    /// Takes the game row lock so completion cannot interleave with a join
    /// that is still confirming a participant. Returns the completed game and
    /// its confirmed roster, or `None` when another writer already finalized
    /// it or its start is back inside the cutoff.
    pub async fn complete_game(
        &self,
        game_id: i64,
        cutoff: chrono::DateTime<Utc>,
    ) -> Result<Option<(Game, Vec<Participant>)>> {
        let mut tx = self.pool.begin().await?;

        let game = match self.games.find_for_update(&mut tx, game_id).await? {
            Some(game) => game,
            None => return Ok(None),
        };

        if game.status.is_terminal() || game.start_time >= cutoff {
            return Ok(None);
        }

        self.games.set_status(&mut tx, game_id, GameStatus::Completed).await?;
        let roster = self.participants.roster_in_tx(&mut tx, game_id).await?;
        tx.commit().await?;

        let confirmed: Vec<Participant> = roster.into_iter().filter(|p| p.is_confirmed()).collect();

        info!(
            game_id = game_id,
            confirmed = confirmed.len(),
            "Game completed by expiry sweep"
        );

        for p in &confirmed {
            self.stats.user_stats_changed(p.user_id).await;
        }

        let mut completed = game;
        completed.status = GameStatus::Completed;
        Ok(Some((completed, confirmed)))
    }

    /// Top up every active series that has fewer upcoming occurrences than
    /// its pattern's lookahead. Appends exactly one occurrence per series per
    /// pass, copying template fields from the latest non-cancelled occurrence
    /// so recent edits propagate forward. Returns how many were appended.
    pub async fn maintain_series(&self) -> Result<usize> {
        let now = Utc::now();
        let mut appended = 0;

        for series_id in self.games.active_series_ids().await? {
            let latest = match self.games.latest_in_series(series_id).await? {
                Some(game) => game,
                None => continue,
            };
            let pattern = match latest.pattern {
                Some(pattern) => pattern,
                None => {
                    warn!(series_id = %series_id, "Series occurrence without a pattern; skipping");
                    continue;
                }
            };

            let upcoming = self.games.count_upcoming_in_series(series_id, now).await?;
            if upcoming >= pattern.lookahead_count() {
                continue;
            }

            let plan = recurrence::plan_next_occurrence(latest.start_time, latest.end_time, pattern);
            let template = CreateGameRequest {
                name: latest.name.clone(),
                organizer_id: latest.organizer_id,
                group_id: latest.group_id,
                location: latest.location.clone(),
                start_time: plan.start_time,
                end_time: plan.end_time,
                max_participants: latest.max_participants,
                cost: latest.cost,
                is_paid: latest.is_paid,
                is_public: latest.is_public,
                pattern: Some(pattern),
            };

            let mut tx = self.pool.begin().await?;
            let game = self
                .games
                .create(&mut tx, &template, Some(series_id), plan.start_time, plan.end_time)
                .await?;
            self.enroll_organizer(&mut tx, &game).await?;
            tx.commit().await?;

            info!(
                series_id = %series_id,
                game_id = game.id,
                start_time = %game.start_time,
                "Series topped up"
            );
            appended += 1;
        }

        Ok(appended)
    }

    fn validate_create(&self, request: &CreateGameRequest) -> Result<()> {
        if request.name.trim().is_empty() {
            return Err(MatchdayError::Validation("Game name is required".to_string()));
        }

        if request.end_time <= request.start_time {
            return Err(MatchdayError::Validation(
                "Game must end after it starts".to_string(),
            ));
        }

        if request.max_participants < self.config.min_participants
            || request.max_participants > self.config.max_participants
        {
            return Err(MatchdayError::Validation(format!(
                "Max participants must be between {} and {}",
                self.config.min_participants, self.config.max_participants
            )));
        }

        if request.cost < Decimal::ZERO {
            return Err(MatchdayError::Validation("Cost cannot be negative".to_string()));
        }

        if request.is_paid && request.cost <= Decimal::ZERO {
            return Err(MatchdayError::Validation(
                "A paid game needs a positive cost".to_string(),
            ));
        }

        let earliest_start = Utc::now() + Duration::minutes(self.config.min_lead_minutes);
        if request.start_time < earliest_start {
            return Err(MatchdayError::Validation(format!(
                "Games must be scheduled at least {} minute(s) ahead",
                self.config.min_lead_minutes
            )));
        }

        Ok(())
    }

    /// Free games carry no cost, whatever the caller sent.
    fn normalized(request: &CreateGameRequest) -> CreateGameRequest {
        let mut request = request.clone();
        if !request.is_paid {
            request.cost = Decimal::ZERO;
        }
        request
    }

    /// Auto-enroll the organizer as a confirmed participant with no guests.
    async fn enroll_organizer(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        game: &Game,
    ) -> Result<Participant> {
        self.participants
            .insert(
                &mut *tx,
                game.id,
                game.organizer_id,
                ParticipantStatus::Confirmed,
                None,
                0,
            )
            .await
    }
}
