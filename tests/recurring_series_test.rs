//! Recurring series scenarios
//!
//! Simulates the scheduler's series maintenance over an in-memory occurrence
//! list: seed a series, let time pass, top up one occurrence per sweep and
//! check each pattern holds its lookahead.

use chrono::{DateTime, Duration, Utc};

use matchday::domain::recurrence::{plan_next_occurrence, plan_series_seed, OccurrencePlan};
use matchday::models::game::RecurrencePattern;

fn at(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

/// One maintenance pass: append one occurrence when the upcoming count is
/// below the pattern's lookahead, exactly as the game service does.
fn maintain(
    occurrences: &mut Vec<OccurrencePlan>,
    pattern: RecurrencePattern,
    now: DateTime<Utc>,
) -> bool {
    let upcoming = occurrences.iter().filter(|o| o.start_time > now).count() as i64;
    if upcoming >= pattern.lookahead_count() {
        return false;
    }

    let latest = *occurrences.last().expect("series never empty");
    occurrences.push(plan_next_occurrence(latest.start_time, latest.end_time, pattern));
    true
}

#[test]
fn daily_series_maintains_one_upcoming_occurrence() {
    let pattern = RecurrencePattern::Daily;
    let mut series = plan_series_seed(at("2025-06-02T18:00:00Z"), at("2025-06-02T20:00:00Z"), pattern);
    assert_eq!(series.len(), 1);

    // Walk a week of sweeps, one per evening after each occurrence ends.
    let mut now = at("2025-06-02T21:00:00Z");
    for _ in 0..7 {
        assert!(maintain(&mut series, pattern, now));
        let upcoming = series.iter().filter(|o| o.start_time > now).count();
        assert_eq!(upcoming, 1);
        // A second sweep in the same tick appends nothing.
        assert!(!maintain(&mut series, pattern, now));
        now += Duration::days(1);
    }
}

#[test]
fn weekly_series_maintains_four_upcoming_occurrences() {
    let pattern = RecurrencePattern::Weekly;
    let mut series = plan_series_seed(at("2025-06-02T18:00:00Z"), at("2025-06-02T20:00:00Z"), pattern);
    assert_eq!(series.len(), 4);

    // Before anything passes, the series is already topped up.
    let now = at("2025-06-01T00:00:00Z");
    assert!(!maintain(&mut series, pattern, now));

    // The first occurrence passes; one sweep restores the lookahead.
    let now = at("2025-06-02T21:00:00Z");
    assert!(maintain(&mut series, pattern, now));
    let upcoming = series.iter().filter(|o| o.start_time > now).count();
    assert_eq!(upcoming, 4);
    assert_eq!(series.last().unwrap().start_time, at("2025-06-30T18:00:00Z"));
}

#[test]
fn top_up_copies_the_latest_occurrence_timing() {
    let pattern = RecurrencePattern::Biweekly;
    let mut series = plan_series_seed(at("2025-06-02T18:00:00Z"), at("2025-06-02T19:00:00Z"), pattern);

    // The organizer reschedules the most recent instance an hour later and
    // doubles its length; the next generated occurrence inherits both.
    let latest = series.last_mut().unwrap();
    latest.start_time += Duration::hours(1);
    latest.end_time += Duration::hours(2);
    let edited = *latest;

    let now = series[0].end_time + Duration::hours(1);
    assert!(maintain(&mut series, pattern, now));

    let appended = series.last().unwrap();
    assert_eq!(appended.start_time, edited.start_time + Duration::days(14));
    assert_eq!(
        appended.end_time - appended.start_time,
        edited.end_time - edited.start_time
    );
}
