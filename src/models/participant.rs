//! Participant model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Enrollment status of a participant within one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "participant_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ParticipantStatus {
    Confirmed,
    Reserve,
}

impl std::fmt::Display for ParticipantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ParticipantStatus::Confirmed => "confirmed",
            ParticipantStatus::Reserve => "reserve",
        };
        write!(f, "{s}")
    }
}

/// One user's enrollment in one game. At most one row per (game, user).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Participant {
    pub id: i64,
    pub game_id: i64,
    pub user_id: Uuid,
    pub status: ParticipantStatus,
    /// Set only while on the waitlist; cleared on promotion.
    pub waitlist_position: Option<i32>,
    pub guest_count: i32,
    pub joined_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl Participant {
    /// Slots this enrollment consumes: the participant plus their guests.
    pub fn total_slots(&self) -> i32 {
        1 + self.guest_count
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == ParticipantStatus::Confirmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(guest_count: i32) -> Participant {
        Participant {
            id: 1,
            game_id: 1,
            user_id: Uuid::new_v4(),
            status: ParticipantStatus::Confirmed,
            waitlist_position: None,
            guest_count,
            joined_at: Utc::now(),
            confirmed_at: Some(Utc::now()),
        }
    }

    #[test]
    fn total_slots_counts_guests() {
        assert_eq!(participant(0).total_slots(), 1);
        assert_eq!(participant(3).total_slots(), 4);
    }
}
