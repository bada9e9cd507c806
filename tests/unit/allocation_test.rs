//! Tests for allocation policy and reservation billing snapshots

use chrono::{Duration, TimeZone, Utc};
use parking_reservation::core::allocation::{ensure_spot_free, ensure_vehicle_free};
use parking_reservation::core::billing::{parking_duration, reservation_cost};
use parking_reservation::core::model::normalize_plate;
use parking_reservation::core::{
    AllocationPolicy, EngineError, LowestIndexFirst, ParkingSpot, Reservation, SpotStatus,
};
use rust_decimal::Decimal;

fn spot(id: u64, index: u32, status: SpotStatus) -> ParkingSpot {
    ParkingSpot {
        id,
        lot_id: 1,
        spot_index: index,
        status,
    }
}

fn reservation(spot_id: Option<u64>, closed_after: Option<Duration>) -> Reservation {
    let check_in = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
    Reservation {
        id: 1,
        user_id: 1,
        spot_id,
        check_in,
        estimated_checkout: check_in + Duration::hours(2),
        actual_checkout: closed_after.map(|d| check_in + d),
        vehicle_model: "Swift".into(),
        vehicle_plate: "KA01AB1234".into(),
        cost_per_unit: Decimal::from(25),
        estimated_cost: Decimal::from(50),
        final_cost: None,
        archived_lot_id: None,
        archived_primary_location: None,
        archived_spot_id: None,
    }
}

#[test]
fn test_lowest_available_index_wins_regardless_of_order() {
    let spots = vec![
        spot(10, 4, SpotStatus::Available),
        spot(11, 0, SpotStatus::Occupied),
        spot(12, 2, SpotStatus::Available),
        spot(13, 1, SpotStatus::Occupied),
    ];
    let chosen = LowestIndexFirst.choose(&spots).unwrap();
    assert_eq!(chosen.spot_index, 2);
}

#[test]
fn test_no_choice_when_all_occupied() {
    let spots = vec![spot(1, 0, SpotStatus::Occupied), spot(2, 1, SpotStatus::Occupied)];
    assert!(LowestIndexFirst.choose(&spots).is_none());
    assert!(LowestIndexFirst.choose(&[]).is_none());
}

#[test]
fn test_preconditions() {
    let active = reservation(Some(3), None);
    assert!(matches!(
        ensure_vehicle_free("KA01AB1234", Some(&active)),
        Err(EngineError::VehicleAlreadyActive { .. })
    ));
    assert!(ensure_vehicle_free("KA01AB1234", None).is_ok());

    let occupied = spot(3, 0, SpotStatus::Occupied);
    assert!(matches!(
        ensure_spot_free(&occupied, None),
        Err(EngineError::SpotAlreadyReserved { spot_id: 3 })
    ));
    let free = spot(4, 1, SpotStatus::Available);
    assert!(ensure_spot_free(&free, None).is_ok());
}

#[test]
fn test_closed_reservation_bills_to_checkout() {
    let closed = reservation(None, Some(Duration::minutes(185)));
    let much_later = closed.check_in + Duration::days(3);
    assert_eq!(reservation_cost(&closed, much_later).unwrap(), Decimal::from(75));
    assert_eq!(parking_duration(&closed, much_later), Duration::minutes(185));
}

#[test]
fn test_open_reservation_bills_to_now() {
    let open = reservation(Some(1), None);
    let now = open.check_in + Duration::minutes(61);
    assert_eq!(reservation_cost(&open, now).unwrap(), Decimal::from(25));
    // A clock behind check-in never produces a negative bill.
    assert_eq!(reservation_cost(&open, open.check_in - Duration::hours(1)).unwrap(), Decimal::ZERO);
}

#[test]
fn test_plate_normalization() {
    assert_eq!(normalize_plate("  ka01 ab1234 "), "KA01 AB1234");
}
