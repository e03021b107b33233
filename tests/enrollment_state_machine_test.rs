//! Enrollment state machine scenarios
//!
//! Drives the capacity ledger through the join/leave/promote flows the
//! enrollment service runs under the game row lock, checking the roster
//! invariants hold at every step.

mod helpers;

use helpers::RosterSim;
use matchday::models::game::GameStatus;
use matchday::models::participant::ParticipantStatus;
use uuid::Uuid;

#[test]
fn tenth_join_fills_the_game_and_eleventh_waits() {
    let mut sim = RosterSim::new(10);

    for _ in 0..9 {
        assert_eq!(sim.join(Uuid::new_v4(), 0), ParticipantStatus::Confirmed);
        assert_eq!(sim.status(), GameStatus::Open);
    }

    // The tenth solo join exactly fills capacity and flips the game.
    assert_eq!(sim.join(Uuid::new_v4(), 0), ParticipantStatus::Confirmed);
    assert_eq!(sim.occupied(), 10);
    assert_eq!(sim.status(), GameStatus::Full);

    // The eleventh lands on the waitlist at position 1.
    let eleventh = Uuid::new_v4();
    assert_eq!(sim.join(eleventh, 0), ParticipantStatus::Reserve);
    assert_eq!(sim.participant(eleventh).unwrap().waitlist_position, Some(1));
}

#[test]
fn exact_fit_party_confirms() {
    let mut sim = RosterSim::new(10);
    for _ in 0..7 {
        sim.join(Uuid::new_v4(), 0);
    }

    // 3 slots free; a party of exactly 3 (1 + 2 guests) confirms.
    let host = Uuid::new_v4();
    assert_eq!(sim.join(host, 2), ParticipantStatus::Confirmed);
    assert_eq!(sim.status(), GameStatus::Full);
}

#[test]
fn promotion_skips_oversized_party_then_picks_it_up() {
    // Capacity 5, filled by a solo, a pair and two more solos.
    let mut sim = RosterSim::new(5);
    let solo = Uuid::new_v4();
    let pair_host = Uuid::new_v4();
    let leaver_a = Uuid::new_v4();
    let leaver_b = Uuid::new_v4();
    sim.join(solo, 0);
    sim.join(pair_host, 1);
    sim.join(leaver_a, 0);
    sim.join(leaver_b, 0);
    assert_eq!(sim.occupied(), 5);
    assert_eq!(sim.status(), GameStatus::Full);

    // Waitlist: A needs 2 slots, B needs 1, in that order.
    let waiting_a = Uuid::new_v4();
    let waiting_b = Uuid::new_v4();
    assert_eq!(sim.join(waiting_a, 1), ParticipantStatus::Reserve);
    assert_eq!(sim.join(waiting_b, 0), ParticipantStatus::Reserve);

    // One departure frees 1 slot: B fits, A (ahead in line) does not block it.
    let promoted = sim.leave(leaver_a);
    assert_eq!(promoted, vec![waiting_b]);
    assert_eq!(
        sim.participant(waiting_a).unwrap().status,
        ParticipantStatus::Reserve
    );

    // Another solo departure still leaves only 1 free slot; A keeps waiting.
    assert!(sim.leave(leaver_b).is_empty());

    // The next solo departure makes it 2 free and A's pair finally fits.
    let promoted = sim.leave(solo);
    assert_eq!(promoted, vec![waiting_a]);
    assert!(sim.participant(waiting_a).unwrap().is_confirmed());
    assert_eq!(sim.participant(waiting_a).unwrap().waitlist_position, None);
}

#[test]
fn capacity_invariant_holds_through_churn() {
    let mut sim = RosterSim::new(8);
    let users: Vec<Uuid> = (0..20).map(|_| Uuid::new_v4()).collect();

    for (i, user) in users.iter().enumerate() {
        sim.join(*user, (i % 3) as i32);
        assert!(sim.occupied() <= 8, "overbooked after join {i}");
    }

    for user in users.iter().step_by(2) {
        sim.leave(*user);
        assert!(sim.occupied() <= 8, "overbooked after leave");
    }
}

#[test]
fn waitlist_positions_never_reused_after_tail_leaves() {
    let mut sim = RosterSim::new(1);
    sim.join(Uuid::new_v4(), 0); // fills the single slot

    let first = Uuid::new_v4();
    let second = Uuid::new_v4();
    sim.join(first, 0);
    sim.join(second, 0);
    assert_eq!(sim.waitlist_positions(), vec![1, 2]);

    // The tail of the waitlist leaves; the next joiner must not get 2 back.
    sim.leave(second);
    let third = Uuid::new_v4();
    sim.join(third, 0);
    assert_eq!(sim.participant(third).unwrap().waitlist_position, Some(3));
    assert_eq!(sim.waitlist_positions(), vec![1, 3]);
}

#[test]
fn reserve_departure_promotes_nobody() {
    let mut sim = RosterSim::new(2);
    sim.join(Uuid::new_v4(), 1); // full
    let waiting = Uuid::new_v4();
    sim.join(waiting, 0);

    let promoted = sim.leave(waiting);
    assert!(promoted.is_empty());
    assert_eq!(sim.occupied(), 2);
}
