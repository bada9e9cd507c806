//! Tests for utility functions

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use parking_reservation::util::{init_tracing, Clock, ManualClock, SystemClock};

#[test]
fn test_manual_clock_advances_and_sets() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
    let clock = ManualClock::new(start);
    assert_eq!(clock.now(), start);

    clock.advance(Duration::minutes(45));
    assert_eq!(clock.now(), start + Duration::minutes(45));

    let later = Utc.with_ymd_and_hms(2024, 1, 2, 8, 0, 0).unwrap();
    clock.set(later);
    assert_eq!(clock.now(), later);
}

#[test]
fn test_shared_clock_sees_updates() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
    let clock = Arc::new(ManualClock::new(start));
    let shared: Arc<ManualClock> = Arc::clone(&clock);
    clock.advance(Duration::hours(1));
    assert_eq!(shared.now(), start + Duration::hours(1));
}

#[test]
fn test_system_clock_moves_forward() {
    let before = Utc::now();
    assert!(SystemClock.now() >= before);
}

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
}
