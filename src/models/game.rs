//! Game model

use chrono::{DateTime, Duration, Months, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle status of a game.
///
/// `open` and `full` flip back and forth as occupancy crosses capacity;
/// `cancelled` and `completed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "game_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Open,
    Full,
    Cancelled,
    Completed,
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, GameStatus::Cancelled | GameStatus::Completed)
    }

    /// Whether the transition is allowed by the lifecycle state machine.
    pub fn can_transition_to(self, to: GameStatus) -> bool {
        match (self, to) {
            (GameStatus::Open, GameStatus::Full) | (GameStatus::Full, GameStatus::Open) => true,
            (GameStatus::Open | GameStatus::Full, GameStatus::Cancelled) => true,
            (GameStatus::Open | GameStatus::Full, GameStatus::Completed) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GameStatus::Open => "open",
            GameStatus::Full => "full",
            GameStatus::Cancelled => "cancelled",
            GameStatus::Completed => "completed",
        };
        write!(f, "{s}")
    }
}

/// Recurrence cadence for a game series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "recurrence_pattern", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RecurrencePattern {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
}

impl RecurrencePattern {
    /// How many upcoming occurrences a series of this cadence keeps scheduled.
    ///
    /// Daily series carry a shorter lookahead; four occurrences a month ahead
    /// is plenty, while four daily instances would churn constantly.
    pub fn lookahead_count(self) -> i64 {
        match self {
            RecurrencePattern::Daily => 1,
            RecurrencePattern::Weekly | RecurrencePattern::Biweekly | RecurrencePattern::Monthly => 4,
        }
    }

    /// The start time of the occurrence following one starting at `start`.
    pub fn next_start(self, start: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            RecurrencePattern::Daily => start + Duration::days(1),
            RecurrencePattern::Weekly => start + Duration::days(7),
            RecurrencePattern::Biweekly => start + Duration::days(14),
            RecurrencePattern::Monthly => start + Months::new(1),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Game {
    pub id: i64,
    pub name: String,
    pub organizer_id: Uuid,
    pub group_id: Option<i64>,
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub max_participants: i32,
    pub cost: Decimal,
    pub is_paid: bool,
    pub is_public: bool,
    pub pattern: Option<RecurrencePattern>,
    pub series_id: Option<Uuid>,
    pub status: GameStatus,
    pub cancellation_reason: Option<String>,
    pub waitlist_seq: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Game {
    pub fn is_recurring(&self) -> bool {
        self.series_id.is_some()
    }

    /// Duration of one occurrence; recurring occurrences keep it.
    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGameRequest {
    pub name: String,
    pub organizer_id: Uuid,
    pub group_id: Option<i64>,
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub max_participants: i32,
    pub cost: Decimal,
    pub is_paid: bool,
    pub is_public: bool,
    pub pattern: Option<RecurrencePattern>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateGameRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub max_participants: Option<i32>,
    pub cost: Option<Decimal>,
    pub is_paid: Option<bool>,
    pub is_public: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_reject_transitions() {
        assert!(!GameStatus::Cancelled.can_transition_to(GameStatus::Open));
        assert!(!GameStatus::Completed.can_transition_to(GameStatus::Full));
        assert!(!GameStatus::Completed.can_transition_to(GameStatus::Cancelled));
    }

    #[test]
    fn open_and_full_flip_both_ways() {
        assert!(GameStatus::Open.can_transition_to(GameStatus::Full));
        assert!(GameStatus::Full.can_transition_to(GameStatus::Open));
        assert!(GameStatus::Full.can_transition_to(GameStatus::Completed));
    }

    #[test]
    fn pattern_lookahead_counts() {
        assert_eq!(RecurrencePattern::Daily.lookahead_count(), 1);
        assert_eq!(RecurrencePattern::Weekly.lookahead_count(), 4);
        assert_eq!(RecurrencePattern::Biweekly.lookahead_count(), 4);
        assert_eq!(RecurrencePattern::Monthly.lookahead_count(), 4);
    }

    #[test]
    fn monthly_advance_uses_calendar_months() {
        let start = "2025-01-31T18:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let next = RecurrencePattern::Monthly.next_start(start);
        // Jan 31 + 1 month clamps to the end of February.
        assert_eq!(next.to_rfc3339(), "2025-02-28T18:00:00+00:00");
    }
}
