//! Matchday
//!
//! Core engine for organizing recurring group games. Tracks capacity-bounded
//! rosters with per-participant guests, manages waitlists with fair skip-over
//! promotion, regenerates recurring occurrences, retires past games and
//! computes per-game cost settlements. Authorization, identity and delivery
//! of notifications belong to the hosting application; this crate exposes the
//! library-level operations they call after authorizing the actor.

pub mod config;
pub mod database;
pub mod domain;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{MatchdayError, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use services::{
    EnrollmentService, GameService, LoggingHooks, Notification, NotificationSink, Scheduler,
    ServiceFactory, SettlementService, StatisticsSink, SweepStats,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
