//! Cost splitting
//!
//! Divides a paid game's cost across its payers proportionally to the slots
//! each occupies, so guests are paid for by their host. The organizer is
//! never a payer; the split covers the full cost, with the last payer
//! absorbing the rounding remainder so the set reconciles exactly.

use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

/// One payer's computed share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Share {
    pub payer_id: Uuid,
    pub amount: Decimal,
}

/// Split `cost` across `payers`, each a `(payer, slots)` pair, proportionally
/// to slots. Amounts are rounded to currency precision (2 dp, half away from
/// zero); the last payer's share is adjusted so the shares sum to `cost`.
///
/// Returns an empty set when there are no payers or no occupied slots.
pub fn split_by_slots(cost: Decimal, payers: &[(Uuid, i32)]) -> Vec<Share> {
    let total_slots: i32 = payers.iter().map(|(_, slots)| *slots).sum();
    if payers.is_empty() || total_slots <= 0 || cost <= Decimal::ZERO {
        return Vec::new();
    }

    let per_slot = cost / Decimal::from(total_slots);
    let mut shares = Vec::with_capacity(payers.len());
    let mut allocated = Decimal::ZERO;

    for (i, (payer_id, slots)) in payers.iter().enumerate() {
        let amount = if i + 1 == payers.len() {
            cost - allocated
        } else {
            (per_slot * Decimal::from(*slots))
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        };
        allocated += amount;
        shares.push(Share {
            payer_id: *payer_id,
            amount,
        });
    }

    shares
}
