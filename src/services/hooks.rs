//! Collaborator seams
//!
//! The engine decides *that* a statistics update or notification is due;
//! delivery belongs to the hosting application. Both sinks are fire-and-forget
//! from the engine's point of view and must never fail an enrollment or sweep.

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

/// Template-selection data for an outbound notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A join landed a confirmed spot.
    JoinConfirmed { game_id: i64, user_id: Uuid },
    /// A join landed on the waitlist at the given position.
    Waitlisted {
        game_id: i64,
        user_id: Uuid,
        position: i32,
    },
    /// A freed slot promoted this participant off the waitlist.
    Promoted { game_id: i64, user_id: Uuid },
    /// The organizer cancelled the game.
    GameCancelled {
        game_id: i64,
        user_id: Uuid,
        reason: String,
    },
    /// A settlement went past its due date unpaid.
    PaymentReminder {
        settlement_id: i64,
        game_id: i64,
        payer_id: Uuid,
    },
}

/// Outbound notification sink implemented by the hosting application.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, notification: Notification);
}

/// Statistics-update sink, keyed by user id. Observers recompute whatever
/// per-user bookkeeping they maintain (attendance counts, VIP promotion).
#[async_trait]
pub trait StatisticsSink: Send + Sync {
    async fn user_stats_changed(&self, user_id: Uuid);
}

/// Default hooks that only log; useful for tests and headless deployments.
#[derive(Debug, Clone, Default)]
pub struct LoggingHooks;

#[async_trait]
impl NotificationSink for LoggingHooks {
    async fn notify(&self, notification: Notification) {
        debug!(notification = ?notification, "Notification due");
    }
}

#[async_trait]
impl StatisticsSink for LoggingHooks {
    async fn user_stats_changed(&self, user_id: Uuid) {
        debug!(user_id = %user_id, "User statistics update due");
    }
}
