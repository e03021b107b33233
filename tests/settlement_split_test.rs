//! Settlement split scenarios

use rust_decimal::Decimal;
use uuid::Uuid;

use matchday::domain::split::split_by_slots;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

#[test]
fn guests_are_charged_to_their_host() {
    // Cost 100, participant A with no guests, participant B with one guest:
    // 3 payer slots, per-slot 33.33, B carries two of them.
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let shares = split_by_slots(dec("100"), &[(a, 1), (b, 2)]);

    assert_eq!(shares[0].payer_id, a);
    assert_eq!(shares[0].amount, dec("33.33"));
    assert_eq!(shares[1].payer_id, b);
    assert_eq!(shares[1].amount, dec("66.67"));
}

#[test]
fn shares_always_reconcile_to_cost() {
    for payer_count in 1..=9usize {
        for slots in 1..=3i32 {
            let payers: Vec<(Uuid, i32)> =
                (0..payer_count).map(|_| (Uuid::new_v4(), slots)).collect();
            let cost = dec("77.77");
            let shares = split_by_slots(cost, &payers);
            let total: Decimal = shares.iter().map(|s| s.amount).sum();
            assert_eq!(total, cost, "{payer_count} payers x {slots} slots");
        }
    }
}

#[test]
fn last_payer_absorbs_the_rounding_remainder() {
    let payers: Vec<(Uuid, i32)> = (0..7).map(|_| (Uuid::new_v4(), 1)).collect();
    let shares = split_by_slots(dec("100"), &payers);

    for share in &shares[..6] {
        assert_eq!(share.amount, dec("14.29"));
    }
    assert_eq!(shares[6].amount, dec("14.26"));
}

#[test]
fn free_or_payerless_games_produce_no_shares() {
    assert!(split_by_slots(dec("0"), &[(Uuid::new_v4(), 1)]).is_empty());
    assert!(split_by_slots(dec("100"), &[]).is_empty());
}
