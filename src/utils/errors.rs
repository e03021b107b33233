//! Error handling for matchday
//!
//! This module defines the main error types used throughout the crate
//! and provides a unified error handling strategy.

use thiserror::Error;

/// Main error type for matchday operations
#[derive(Error, Debug)]
pub enum MatchdayError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Game not found: {game_id}")]
    GameNotFound { game_id: i64 },

    #[error("Settlement not found: {settlement_id}")]
    SettlementNotFound { settlement_id: i64 },

    #[error("User {user_id} is already enrolled in game {game_id}")]
    AlreadyEnrolled { game_id: i64, user_id: uuid::Uuid },

    #[error("User {user_id} is not enrolled in game {game_id}")]
    NotEnrolled { game_id: i64, user_id: uuid::Uuid },

    #[error("Organizer cannot leave game {game_id}; cancel or delete it instead")]
    OrganizerCannotLeave { game_id: i64 },

    #[error("Registration for game {game_id} is closed")]
    RegistrationClosed { game_id: i64 },

    #[error("Game {game_id} cannot fit {requested} more slot(s): {available} available")]
    CapacityExceeded {
        game_id: i64,
        requested: i32,
        available: i32,
    },

    #[error("Participant is on the waitlist, not confirmed")]
    NotConfirmed { game_id: i64, user_id: uuid::Uuid },

    #[error("Settlement {settlement_id} is already paid")]
    SettlementAlreadyPaid { settlement_id: i64 },

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for matchday operations
pub type Result<T> = std::result::Result<T, MatchdayError>;

impl MatchdayError {
    /// Check if the error is a logical state conflict rather than a fault.
    ///
    /// Conflicts are facts about the current roster or settlement state; the
    /// caller should surface them, never retry them.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            MatchdayError::AlreadyEnrolled { .. }
                | MatchdayError::NotEnrolled { .. }
                | MatchdayError::OrganizerCannotLeave { .. }
                | MatchdayError::RegistrationClosed { .. }
                | MatchdayError::CapacityExceeded { .. }
                | MatchdayError::NotConfirmed { .. }
                | MatchdayError::SettlementAlreadyPaid { .. }
                | MatchdayError::InvalidStateTransition { .. }
        )
    }

    /// Check if the error may succeed on a later attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            MatchdayError::Database(e) => !matches!(e, sqlx::Error::RowNotFound),
            MatchdayError::Io(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn conflicts_are_not_transient() {
        let err = MatchdayError::AlreadyEnrolled {
            game_id: 1,
            user_id: Uuid::nil(),
        };
        assert!(err.is_conflict());
        assert!(!err.is_transient());
    }

    #[test]
    fn validation_is_neither_conflict_nor_transient() {
        let err = MatchdayError::Validation("negative guest count".to_string());
        assert!(!err.is_conflict());
        assert!(!err.is_transient());
    }
}
