//! Tests for presentation-layer forms

use parking_reservation::core::ErrorKind;
use parking_reservation::runtime::{health, BookingForm, LotForm, LotUpdateForm, RegistrationForm};
use parking_reservation::core::ParkingEngine;
use parking_reservation::infra::InMemoryStore;
use rust_decimal::Decimal;

fn lot_form() -> LotForm {
    LotForm {
        primary_location: "Indiranagar".into(),
        full_address: "100ft Road".into(),
        pincode: "560038".into(),
        cost_per_unit: Decimal::from(25),
        max_spots: 10,
    }
}

fn registration() -> RegistrationForm {
    RegistrationForm {
        username: "asha".into(),
        email: "asha@parking.test".into(),
        contact_number: Some("9876543210".into()),
        address: "12 Lake Road".into(),
    }
}

#[test]
fn test_valid_lot_form_converts() {
    let lot = lot_form().into_new_lot().unwrap();
    assert_eq!(lot.max_spots, 10);
    assert_eq!(lot.cost_per_unit, Decimal::from(25));
}

#[test]
fn test_lot_form_bounds() {
    let cheap = LotForm {
        cost_per_unit: Decimal::new(2499, 2),
        ..lot_form()
    };
    assert_eq!(cheap.into_new_lot().unwrap_err().kind(), ErrorKind::Validation);

    for spots in [9, 41] {
        let form = LotForm {
            max_spots: spots,
            ..lot_form()
        };
        assert!(form.into_new_lot().is_err(), "{spots} spots accepted");
    }

    let short_pin = LotForm {
        pincode: "56003".into(),
        ..lot_form()
    };
    assert!(short_pin.into_new_lot().is_err());
}

#[test]
fn test_lot_update_form() {
    let (spots, cost) = LotUpdateForm {
        max_spots: 40,
        cost_per_unit: Decimal::from(30),
    }
    .into_parts()
    .unwrap();
    assert_eq!((spots, cost), (40, Decimal::from(30)));

    assert!(LotUpdateForm {
        max_spots: 8,
        cost_per_unit: Decimal::from(30),
    }
    .into_parts()
    .is_err());
}

#[test]
fn test_booking_form_limits() {
    let form = |plate: &str, model: &str, hours: u32| BookingForm {
        lot_id: 1,
        vehicle_plate: plate.into(),
        vehicle_model: model.into(),
        requested_hours: hours,
    };
    assert!(form("KA01AB1234", "Swift", 72).into_request().is_ok());
    assert!(form("KA01AB1234", "Swift", 0).into_request().is_err());
    assert!(form("KA01AB1234567890", "Swift", 1).into_request().is_err());
    assert!(form("KA01AB1234", "A very long model name", 1).into_request().is_err());
}

#[test]
fn test_registration_form() {
    let user = registration().into_new_user().unwrap();
    assert_eq!(user.username, "asha");

    let bad_email = RegistrationForm {
        email: "not-an-email".into(),
        ..registration()
    };
    assert!(bad_email.into_new_user().is_err());

    let letters = RegistrationForm {
        contact_number: Some("98765abcde".into()),
        ..registration()
    };
    assert!(letters.into_new_user().is_err());

    let no_contact = RegistrationForm {
        contact_number: None,
        ..registration()
    };
    assert!(no_contact.into_new_user().is_ok());
}

#[test]
fn test_health_reports_lot_count() {
    let engine = ParkingEngine::new(InMemoryStore::new());
    let status = health(&engine);
    assert!(status.ok);
    assert_eq!(status.lots, 0);
    assert!(status.error.is_none());
}
