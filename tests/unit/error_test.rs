//! Tests for error types

use parking_reservation::core::{EngineError, ErrorKind};

#[test]
fn test_lot_full_error() {
    let err = EngineError::LotFull { lot_id: 3 };
    assert_eq!(format!("{err}"), "lot 3 has no available spots");
    assert_eq!(err.kind(), ErrorKind::Capacity);
}

#[test]
fn test_shrink_error_message() {
    let err = EngineError::OccupiedSpotsExceedCapacity {
        lot_id: 1,
        occupied: 9,
        requested: 8,
    };
    assert_eq!(
        format!("{err}"),
        "lot 1 has 9 occupied spot(s); cannot resize to 8"
    );
    assert_eq!(err.kind(), ErrorKind::Capacity);
}

#[test]
fn test_conflict_classification() {
    let conflicts = [
        EngineError::DuplicateLocation {
            location: "Indiranagar".into(),
        },
        EngineError::DuplicateUser {
            field: "email",
            value: "a@b.test".into(),
        },
        EngineError::VehicleAlreadyActive {
            plate: "KA01AB1234".into(),
        },
        EngineError::SpotAlreadyReserved { spot_id: 7 },
        EngineError::AlreadyReleased { reservation_id: 2 },
        EngineError::PriceChangeBlocked {
            lot_id: 1,
            occupied: 4,
        },
    ];
    for err in conflicts {
        assert_eq!(err.kind(), ErrorKind::Conflict, "{err}");
    }
}

#[test]
fn test_not_found_error() {
    let err = EngineError::NotFound {
        entity: "reservation",
        id: 12,
    };
    assert_eq!(format!("{err}"), "reservation 12 not found");
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_backend_error() {
    let err = EngineError::Backend("disk full".to_string());
    assert_eq!(format!("{err}"), "backend error: disk full");
    assert_eq!(err.kind(), ErrorKind::Backend);
}

#[test]
fn test_error_converts_into_anyhow() {
    let err: anyhow::Error = EngineError::Forbidden("nope".into()).into();
    assert!(err.downcast_ref::<EngineError>().is_some());
}
