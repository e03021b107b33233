//! Capacity ledger
//!
//! Pure slot arithmetic for one game: how many slots the confirmed roster
//! occupies, whether a join confirms or waitlists, whether a guest-count
//! change fits, and which waitlisted participants a freed slot promotes.
//!
//! Everything here is a pure function of the roster snapshot; the enrollment
//! service is responsible for calling it under the game row lock so that the
//! read-check-write sequence is atomic per game.

use crate::models::participant::{Participant, ParticipantStatus};

/// Outcome of a join request as decided by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinOutcome {
    pub status: ParticipantStatus,
    /// Assigned position when waitlisted; `None` when confirmed.
    pub waitlist_position: Option<i32>,
}

/// Slots occupied by the confirmed part of the roster.
pub fn occupied_slots(roster: &[Participant]) -> i32 {
    roster
        .iter()
        .filter(|p| p.is_confirmed())
        .map(Participant::total_slots)
        .sum()
}

/// Free confirmed slots, never negative.
pub fn available_slots(max_participants: i32, occupied: i32) -> i32 {
    (max_participants - occupied).max(0)
}

/// Decide whether a join for `requested` slots confirms or waitlists.
///
/// `last_waitlist_position` is the game's monotonic position counter; the
/// assigned position is one past it and is never handed out twice, even after
/// removals leave gaps.
pub fn decide_join(
    max_participants: i32,
    occupied: i32,
    requested: i32,
    last_waitlist_position: i32,
) -> JoinOutcome {
    if occupied + requested <= max_participants {
        JoinOutcome {
            status: ParticipantStatus::Confirmed,
            waitlist_position: None,
        }
    } else {
        JoinOutcome {
            status: ParticipantStatus::Reserve,
            waitlist_position: Some(last_waitlist_position + 1),
        }
    }
}

/// Whether changing a confirmed participant's footprint from `old_slots` to
/// `new_slots` keeps the roster within capacity.
pub fn guest_change_fits(max_participants: i32, occupied: i32, old_slots: i32, new_slots: i32) -> bool {
    occupied - old_slots + new_slots <= max_participants
}

/// Plan which waitlisted participants to promote into free slots.
///
/// Walks the waitlist in ascending position order. An entry is promoted only
/// if its full party fits the remaining free slots; an oversized party is
/// skipped and the walk continues, so a large group at the front of the line
/// does not block smaller parties behind it. The walk stops once no free
/// slots remain.
pub fn plan_promotions<'a>(
    max_participants: i32,
    occupied: i32,
    waitlist: &'a [Participant],
) -> Vec<&'a Participant> {
    let mut free = available_slots(max_participants, occupied);
    if free <= 0 {
        return Vec::new();
    }

    let mut ordered: Vec<&Participant> = waitlist
        .iter()
        .filter(|p| p.status == ParticipantStatus::Reserve)
        .collect();
    ordered.sort_by_key(|p| p.waitlist_position.unwrap_or(i32::MAX));

    let mut promoted = Vec::new();
    for candidate in ordered {
        if free == 0 {
            break;
        }
        let needed = candidate.total_slots();
        if needed <= free {
            free -= needed;
            promoted.push(candidate);
        }
    }

    promoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;
    use uuid::Uuid;

    fn confirmed(guests: i32) -> Participant {
        Participant {
            id: 0,
            game_id: 1,
            user_id: Uuid::new_v4(),
            status: ParticipantStatus::Confirmed,
            waitlist_position: None,
            guest_count: guests,
            joined_at: Utc::now(),
            confirmed_at: Some(Utc::now()),
        }
    }

    fn reserve(position: i32, guests: i32) -> Participant {
        Participant {
            id: position as i64,
            game_id: 1,
            user_id: Uuid::new_v4(),
            status: ParticipantStatus::Reserve,
            waitlist_position: Some(position),
            guest_count: guests,
            joined_at: Utc::now(),
            confirmed_at: None,
        }
    }

    #[test]
    fn occupied_ignores_reserves() {
        let roster = vec![confirmed(0), confirmed(2), reserve(1, 4)];
        assert_eq!(occupied_slots(&roster), 4);
    }

    #[test]
    fn exact_fit_confirms() {
        // 1 + guestCount exactly equal to remaining capacity confirms.
        let outcome = decide_join(10, 7, 3, 0);
        assert_eq!(outcome.status, ParticipantStatus::Confirmed);
        assert_eq!(outcome.waitlist_position, None);
    }

    #[test]
    fn one_over_waitlists() {
        let outcome = decide_join(10, 7, 4, 0);
        assert_eq!(outcome.status, ParticipantStatus::Reserve);
        assert_eq!(outcome.waitlist_position, Some(1));
    }

    #[test]
    fn waitlist_positions_increase_and_never_reuse() {
        // Counter-based assignment keeps increasing even after the tail
        // of the waitlist leaves.
        let first = decide_join(1, 1, 1, 0);
        assert_eq!(first.waitlist_position, Some(1));
        let second = decide_join(1, 1, 1, 1);
        assert_eq!(second.waitlist_position, Some(2));
        // Tail (position 2) leaves; the counter still reads 2.
        let third = decide_join(1, 1, 1, 2);
        assert_eq!(third.waitlist_position, Some(3));
    }

    #[test]
    fn guest_change_rejected_on_overflow() {
        // 8 occupied of 10, participant holds 2; growing to 5 would need 11.
        assert!(!guest_change_fits(10, 8, 2, 5));
        assert!(guest_change_fits(10, 8, 2, 4));
        assert!(guest_change_fits(10, 8, 2, 1));
    }

    #[test]
    fn promotion_skips_oversized_party() {
        // Capacity 5, 4 occupied (1 free), waitlist [A: 2 slots, B: 1 slot].
        // A does not fit and does not block B behind it.
        let waitlist = vec![reserve(1, 1), reserve(2, 0)];
        let promoted = plan_promotions(5, 4, &waitlist);
        let positions: Vec<_> = promoted.iter().map(|p| p.waitlist_position).collect();
        assert_eq!(positions, vec![Some(2)]);

        // With 3 free slots, A fits first and B takes the remaining slot.
        let promoted = plan_promotions(5, 2, &waitlist);
        let positions: Vec<_> = promoted.iter().map(|p| p.waitlist_position).collect();
        assert_eq!(positions, vec![Some(1), Some(2)]);
    }

    #[test]
    fn promotion_noop_when_full() {
        let waitlist = vec![reserve(1, 0)];
        assert!(plan_promotions(4, 4, &waitlist).is_empty());
        assert!(plan_promotions(4, 5, &waitlist).is_empty());
    }

    #[test]
    fn promotion_stops_at_zero_free() {
        let waitlist = vec![reserve(1, 0), reserve(2, 0), reserve(3, 0)];
        let promoted = plan_promotions(6, 4, &waitlist);
        assert_eq!(promoted.len(), 2);
    }

    proptest! {
        /// Promotions never push the confirmed roster past capacity.
        #[test]
        fn promotions_respect_capacity(
            max in 1i32..30,
            occupied in 0i32..30,
            guests in proptest::collection::vec(0i32..5, 0..12),
        ) {
            let waitlist: Vec<Participant> = guests
                .iter()
                .enumerate()
                .map(|(i, &g)| reserve(i as i32 + 1, g))
                .collect();
            let promoted = plan_promotions(max, occupied, &waitlist);
            let gained: i32 = promoted.iter().map(|p| p.total_slots()).sum();
            prop_assert!(occupied >= max || occupied + gained <= max);
            if occupied >= max {
                prop_assert!(promoted.is_empty());
            }
        }

        /// A join decision never confirms past capacity.
        #[test]
        fn join_never_overbooks(
            max in 1i32..30,
            occupied in 0i32..30,
            requested in 1i32..6,
        ) {
            let outcome = decide_join(max, occupied, requested, 0);
            if outcome.status == ParticipantStatus::Confirmed {
                prop_assert!(occupied + requested <= max);
            }
        }
    }
}
