//! Expiry and maintenance scheduler
//!
//! A periodic background task that finalizes games whose time has passed,
//! generates settlements for the paid ones, tops recurring series up and
//! flags overdue settlements. One instance runs per process, decoupled from
//! request handling; a failed sweep is logged, backed off and retried on a
//! later tick, never fatal.

use chrono::{Duration as ChronoDuration, Utc};
use rust_decimal::Decimal;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::SchedulerConfig;
use crate::services::game::GameService;
use crate::services::settlement::SettlementService;
use crate::utils::errors::Result;
use crate::utils::logging;

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Games transitioned to completed.
    pub completed: usize,
    /// Games that errored and were skipped this sweep.
    pub failed: usize,
    /// Completed paid games that got settlements generated.
    pub settled: usize,
    /// Series occurrences appended.
    pub topped_up: usize,
    /// Settlements flagged overdue.
    pub overdue: usize,
}

/// Periodic expiry/maintenance task owned by the process lifecycle.
#[derive(Clone)]
pub struct Scheduler {
    config: SchedulerConfig,
    games: GameService,
    settlements: SettlementService,
    shutdown: CancellationToken,
}

impl Scheduler {
    pub fn new(
        config: SchedulerConfig,
        games: GameService,
        settlements: SettlementService,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            config,
            games,
            settlements,
            shutdown,
        }
    }

    /// Spawn the periodic loop onto the runtime. The task ends when the
    /// shutdown token is cancelled.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        info!(
            startup_delay_secs = self.config.startup_delay_secs,
            sweep_interval_secs = self.config.sweep_interval_secs,
            "Scheduler started"
        );

        if self
            .sleep_or_shutdown(Duration::from_secs(self.config.startup_delay_secs))
            .await
        {
            return;
        }

        loop {
            let delay = match self.run_sweep().await {
                Ok(stats) => {
                    logging::log_sweep_outcome(stats.completed, stats.failed, stats.topped_up);
                    Duration::from_secs(self.config.sweep_interval_secs)
                }
                Err(e) => {
                    error!(error = %e, "Sweep failed; backing off");
                    Duration::from_secs(self.config.error_backoff_secs)
                }
            };

            if self.sleep_or_shutdown(delay).await {
                return;
            }
        }
    }

    /// Run one expiry/maintenance sweep.
    ///
    /// A failure on one game is logged and the sweep moves on to the next;
    /// only failures of whole sweep stages propagate (and trigger backoff).
    pub async fn run_sweep(&self) -> Result<SweepStats> {
        let cutoff = Utc::now() - ChronoDuration::minutes(self.config.completion_grace_minutes);
        let mut stats = SweepStats::default();

        for game_id in self.games.expired_game_ids(cutoff).await? {
            match self.games.complete_game(game_id, cutoff).await {
                Ok(Some((game, _confirmed))) => {
                    stats.completed += 1;
                    if game.is_paid && game.cost > Decimal::ZERO {
                        match self.settlements.generate_for_game(game.id).await {
                            Ok(_) => stats.settled += 1,
                            Err(e) => {
                                // Settlement trouble on one game must not
                                // abort the rest of the batch.
                                error!(game_id = game.id, error = %e, "Settlement generation failed");
                                stats.failed += 1;
                            }
                        }
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    error!(game_id = game_id, error = %e, "Failed to complete expired game");
                    stats.failed += 1;
                }
            }
        }

        stats.topped_up = self.games.maintain_series().await?;
        stats.overdue = self.settlements.flag_overdue().await?.len();

        Ok(stats)
    }

    /// Sleep for `delay`, returning `true` when shutdown was requested.
    async fn sleep_or_shutdown(&self, delay: Duration) -> bool {
        tokio::select! {
            _ = self.shutdown.cancelled() => {
                info!("Scheduler stopped");
                true
            }
            _ = tokio::time::sleep(delay) => false,
        }
    }
}
