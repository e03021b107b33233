//! Test helpers
//!
//! An in-memory roster simulator that drives the same capacity-ledger
//! decisions the enrollment service wires into database transactions, so
//! state-machine scenarios can run without a live database.

#![allow(dead_code)]

use chrono::Utc;
use uuid::Uuid;

use matchday::domain::capacity;
use matchday::models::game::GameStatus;
use matchday::models::participant::{Participant, ParticipantStatus};

/// One game's roster driven through join/leave/promote decisions.
pub struct RosterSim {
    pub max_participants: i32,
    pub waitlist_seq: i32,
    pub roster: Vec<Participant>,
    next_id: i64,
}

impl RosterSim {
    pub fn new(max_participants: i32) -> Self {
        Self {
            max_participants,
            waitlist_seq: 0,
            roster: Vec::new(),
            next_id: 1,
        }
    }

    pub fn occupied(&self) -> i32 {
        capacity::occupied_slots(&self.roster)
    }

    pub fn available(&self) -> i32 {
        capacity::available_slots(self.max_participants, self.occupied())
    }

    /// Status as the lifecycle controller would derive it from occupancy.
    pub fn status(&self) -> GameStatus {
        if self.occupied() >= self.max_participants {
            GameStatus::Full
        } else {
            GameStatus::Open
        }
    }

    pub fn join(&mut self, user_id: Uuid, guest_count: i32) -> ParticipantStatus {
        let outcome = capacity::decide_join(
            self.max_participants,
            self.occupied(),
            1 + guest_count,
            self.waitlist_seq,
        );

        let waitlist_position = match outcome.status {
            ParticipantStatus::Confirmed => None,
            ParticipantStatus::Reserve => {
                self.waitlist_seq += 1;
                Some(self.waitlist_seq)
            }
        };

        self.roster.push(Participant {
            id: self.next_id,
            game_id: 1,
            user_id,
            status: outcome.status,
            waitlist_position,
            guest_count,
            joined_at: Utc::now(),
            confirmed_at: match outcome.status {
                ParticipantStatus::Confirmed => Some(Utc::now()),
                ParticipantStatus::Reserve => None,
            },
        });
        self.next_id += 1;

        outcome.status
    }

    /// Remove a participant; a confirmed departure promotes from the
    /// waitlist before the operation completes.
    pub fn leave(&mut self, user_id: Uuid) -> Vec<Uuid> {
        let Some(index) = self.roster.iter().position(|p| p.user_id == user_id) else {
            return Vec::new();
        };
        let was_confirmed = self.roster[index].is_confirmed();
        self.roster.remove(index);

        if was_confirmed {
            self.promote()
        } else {
            Vec::new()
        }
    }

    /// Walk the waitlist and promote whatever fits the free slots.
    pub fn promote(&mut self) -> Vec<Uuid> {
        let promoted_ids: Vec<i64> =
            capacity::plan_promotions(self.max_participants, self.occupied(), &self.roster)
                .iter()
                .map(|p| p.id)
                .collect();

        let mut promoted_users = Vec::with_capacity(promoted_ids.len());
        for id in promoted_ids {
            let p = self.roster.iter_mut().find(|p| p.id == id).unwrap();
            p.status = ParticipantStatus::Confirmed;
            p.waitlist_position = None;
            p.confirmed_at = Some(Utc::now());
            promoted_users.push(p.user_id);
        }

        promoted_users
    }

    pub fn waitlist_positions(&self) -> Vec<i32> {
        let mut positions: Vec<i32> = self
            .roster
            .iter()
            .filter(|p| p.status == ParticipantStatus::Reserve)
            .filter_map(|p| p.waitlist_position)
            .collect();
        positions.sort_unstable();
        positions
    }

    pub fn participant(&self, user_id: Uuid) -> Option<&Participant> {
        self.roster.iter().find(|p| p.user_id == user_id)
    }
}
