//! Time based billing.
//!
//! Two rules coexist. The estimate charged up front covers every requested
//! hour. The final bill floors the elapsed time to whole hours, so a stay
//! shorter than one hour bills zero.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::core::error::{EngineError, EngineResult};
use crate::core::model::Reservation;

const SECONDS_PER_HOUR: i64 = 3600;

/// Price of the requested hours at booking time.
pub fn estimated_cost(cost_per_unit: Decimal, requested_hours: u32) -> EngineResult<Decimal> {
    charge(cost_per_unit, Decimal::from(requested_hours))
}

/// Whole hours elapsed between `check_in` and `end`, rounded down.
/// An `end` before `check_in` counts as zero.
pub fn billable_hours(check_in: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let elapsed = (end - check_in).num_seconds().max(0);
    elapsed / SECONDS_PER_HOUR
}

/// Cost of the time spent between `check_in` and `end`.
pub fn cost_between(
    cost_per_unit: Decimal,
    check_in: DateTime<Utc>,
    end: DateTime<Utc>,
) -> EngineResult<Decimal> {
    charge(cost_per_unit, Decimal::from(billable_hours(check_in, end)))
}

/// Cost of a reservation as of `now`.
///
/// Released reservations are priced up to their actual checkout; active
/// ones up to `now`, which gives the running estimate shown while parked.
pub fn reservation_cost(reservation: &Reservation, now: DateTime<Utc>) -> EngineResult<Decimal> {
    let end = reservation.actual_checkout.unwrap_or(now);
    cost_between(reservation.cost_per_unit, reservation.check_in, end)
}

fn charge(cost_per_unit: Decimal, hours: Decimal) -> EngineResult<Decimal> {
    cost_per_unit
        .checked_mul(hours)
        .map(|cost| cost.round_dp(2))
        .ok_or_else(|| {
            EngineError::Validation(format!("cost of {hours} hours at {cost_per_unit} overflows"))
        })
}

/// Time parked as of `now`.
pub fn parking_duration(reservation: &Reservation, now: DateTime<Utc>) -> chrono::Duration {
    let end = reservation.actual_checkout.unwrap_or(now);
    (end - reservation.check_in).max(chrono::Duration::zero())
}
