//! Services module
//!
//! This module contains business logic services

pub mod enrollment;
pub mod game;
pub mod hooks;
pub mod scheduler;
pub mod settlement;

// Re-export commonly used services
pub use enrollment::EnrollmentService;
pub use game::GameService;
pub use hooks::{LoggingHooks, Notification, NotificationSink, StatisticsSink};
pub use scheduler::{Scheduler, SweepStats};
pub use settlement::SettlementService;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::Settings;
use crate::database::DatabaseService;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub enrollment: EnrollmentService,
    pub games: GameService,
    pub settlements: SettlementService,
    settings: Settings,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(
        database: DatabaseService,
        settings: Settings,
        stats: Arc<dyn StatisticsSink>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        let pool = database.pool().clone();

        let enrollment = EnrollmentService::new(
            pool.clone(),
            database.games.clone(),
            database.participants.clone(),
            settings.enrollment.clone(),
            stats.clone(),
            notifier.clone(),
        );
        let games = GameService::new(
            pool.clone(),
            database.games.clone(),
            database.participants.clone(),
            settings.enrollment.clone(),
            stats,
            notifier.clone(),
        );
        let settlements = SettlementService::new(
            pool,
            database.games.clone(),
            database.participants.clone(),
            database.settlements.clone(),
            settings.settlement.clone(),
            notifier,
        );

        Self {
            enrollment,
            games,
            settlements,
            settings,
        }
    }

    /// Factory wired to hooks that only log; for tests and headless runs.
    pub fn with_logging_hooks(database: DatabaseService, settings: Settings) -> Self {
        let hooks = Arc::new(LoggingHooks);
        Self::new(database, settings, hooks.clone(), hooks)
    }

    /// Build the background scheduler over these services.
    pub fn scheduler(&self, shutdown: CancellationToken) -> Scheduler {
        Scheduler::new(
            self.settings.scheduler.clone(),
            self.games.clone(),
            self.settlements.clone(),
            shutdown,
        )
    }
}
