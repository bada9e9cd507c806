//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use parking_reservation::core::{
    AdminCapability, BookingRequest, Caller, LowestIndexFirst, NewLot, NewUser, ParkingEngine,
    ParkingLot, ParkingStore,
};
use parking_reservation::infra::InMemoryStore;
use parking_reservation::util::{Clock, ManualClock};
use rust_decimal::Decimal;

static USER_SEQ: AtomicU64 = AtomicU64::new(0);

pub struct Fixture<S: ParkingStore = InMemoryStore> {
    pub engine: ParkingEngine<S, Arc<ManualClock>, LowestIndexFirst>,
    pub clock: Arc<ManualClock>,
    pub admin: AdminCapability,
}

pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

pub fn fixture() -> Fixture {
    fixture_on(InMemoryStore::new())
}

pub fn fixture_on<S: ParkingStore>(store: S) -> Fixture<S> {
    let clock = Arc::new(ManualClock::new(start()));
    let engine = ParkingEngine::with_parts(store, Arc::clone(&clock), LowestIndexFirst);
    let admin = engine
        .ensure_admin(NewUser {
            username: "admin".into(),
            email: "admin@parking.test".into(),
            contact_number: Some("9988776655".into()),
            address: "Admin Headquarters".into(),
        })
        .unwrap();
    let admin = Caller::of(&admin).admin().unwrap();
    Fixture {
        engine,
        clock,
        admin,
    }
}

pub fn member<S, C>(engine: &ParkingEngine<S, C, LowestIndexFirst>, name: &str) -> Caller
where
    S: ParkingStore,
    C: Clock,
{
    let n = USER_SEQ.fetch_add(1, Ordering::Relaxed);
    let user = engine
        .register_user(NewUser {
            username: format!("{name}-{n}"),
            email: format!("{name}-{n}@parking.test"),
            contact_number: None,
            address: "1 Test Street".into(),
        })
        .unwrap();
    Caller::of(&user)
}

pub fn new_lot(location: &str, max_spots: u32, cost: i64) -> NewLot {
    NewLot {
        primary_location: location.into(),
        full_address: format!("{location} Main Road"),
        pincode: "560001".into(),
        max_spots,
        cost_per_unit: Decimal::from(cost),
    }
}

pub fn lot<S: ParkingStore>(fx: &Fixture<S>, location: &str, max_spots: u32, cost: i64) -> ParkingLot {
    fx.engine
        .create_lot(&fx.admin, new_lot(location, max_spots, cost))
        .unwrap()
}

pub fn booking(lot_id: u64, plate: &str, hours: u32) -> BookingRequest {
    BookingRequest {
        lot_id,
        vehicle_plate: plate.into(),
        vehicle_model: "Swift".into(),
        requested_hours: hours,
    }
}
