//! Recurring series planning
//!
//! Pure date arithmetic for recurring games: seeding a new series from a
//! template and extending an existing series past its latest occurrence.

use chrono::{DateTime, Utc};

use crate::models::game::RecurrencePattern;

/// Start/end times of one planned occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccurrencePlan {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Plan the seed batch for a new series: the template occurrence itself plus
/// subsequent ones at the pattern's offset, `pattern.lookahead_count()` in
/// total. Each occurrence keeps the template's duration.
pub fn plan_series_seed(
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    pattern: RecurrencePattern,
) -> Vec<OccurrencePlan> {
    let duration = end_time - start_time;
    let count = pattern.lookahead_count();

    let mut occurrences = Vec::with_capacity(count as usize);
    let mut start = start_time;
    for _ in 0..count {
        occurrences.push(OccurrencePlan {
            start_time: start,
            end_time: start + duration,
        });
        start = pattern.next_start(start);
    }

    occurrences
}

/// Plan the occurrence immediately after the series' latest one, keeping
/// that occurrence's duration.
pub fn plan_next_occurrence(
    latest_start: DateTime<Utc>,
    latest_end: DateTime<Utc>,
    pattern: RecurrencePattern,
) -> OccurrencePlan {
    let start = pattern.next_start(latest_start);
    OccurrencePlan {
        start_time: start,
        end_time: start + (latest_end - latest_start),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn daily_seeds_a_single_occurrence() {
        let plans = plan_series_seed(
            at("2025-06-02T18:00:00Z"),
            at("2025-06-02T20:00:00Z"),
            RecurrencePattern::Daily,
        );
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].start_time, at("2025-06-02T18:00:00Z"));
    }

    #[test]
    fn weekly_seeds_four_occurrences_a_week_apart() {
        let plans = plan_series_seed(
            at("2025-06-02T18:00:00Z"),
            at("2025-06-02T20:00:00Z"),
            RecurrencePattern::Weekly,
        );
        assert_eq!(plans.len(), 4);
        assert_eq!(plans[1].start_time, at("2025-06-09T18:00:00Z"));
        assert_eq!(plans[3].start_time, at("2025-06-23T18:00:00Z"));
        for plan in &plans {
            assert_eq!(plan.end_time - plan.start_time, Duration::hours(2));
        }
    }

    #[test]
    fn biweekly_spacing_is_fourteen_days() {
        let plans = plan_series_seed(
            at("2025-06-02T18:00:00Z"),
            at("2025-06-02T19:30:00Z"),
            RecurrencePattern::Biweekly,
        );
        assert_eq!(plans[1].start_time - plans[0].start_time, Duration::days(14));
    }

    #[test]
    fn next_occurrence_follows_the_latest() {
        let plan = plan_next_occurrence(
            at("2025-06-23T18:00:00Z"),
            at("2025-06-23T20:00:00Z"),
            RecurrencePattern::Weekly,
        );
        assert_eq!(plan.start_time, at("2025-06-30T18:00:00Z"));
        assert_eq!(plan.end_time, at("2025-06-30T20:00:00Z"));
    }

    #[test]
    fn monthly_keeps_duration_across_clamping() {
        // Jan 31 -> Feb 28; the two-hour duration survives the clamp.
        let plan = plan_next_occurrence(
            at("2025-01-31T18:00:00Z"),
            at("2025-01-31T20:00:00Z"),
            RecurrencePattern::Monthly,
        );
        assert_eq!(plan.start_time, at("2025-02-28T18:00:00Z"));
        assert_eq!(plan.end_time - plan.start_time, Duration::hours(2));
    }
}
