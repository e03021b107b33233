//! Pure domain logic
//!
//! Slot arithmetic, cost splitting and recurrence planning, free of any I/O.
//! The service layer wires these decisions into transactions.

pub mod capacity;
pub mod recurrence;
pub mod split;

pub use capacity::{available_slots, decide_join, occupied_slots, plan_promotions, JoinOutcome};
pub use recurrence::{plan_next_occurrence, plan_series_seed, OccurrencePlan};
pub use split::{split_by_slots, Share};
