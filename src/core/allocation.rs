//! Spot selection and booking preconditions.
//!
//! Allocation is a pure decision over a snapshot of a lot's spots.

use crate::core::error::{EngineError, EngineResult};
use crate::core::model::{ParkingSpot, Reservation};

/// Chooses which spot a booking receives.
pub trait AllocationPolicy: Send + Sync {
    /// Pick a spot among `spots` (all belonging to one lot), or `None` when
    /// nothing is bookable.
    fn choose<'a>(&self, spots: &'a [ParkingSpot]) -> Option<&'a ParkingSpot>;
}

/// Lowest `spot_index` among available spots.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowestIndexFirst;

impl AllocationPolicy for LowestIndexFirst {
    fn choose<'a>(&self, spots: &'a [ParkingSpot]) -> Option<&'a ParkingSpot> {
        spots
            .iter()
            .filter(|spot| spot.is_available())
            .min_by_key(|spot| spot.spot_index)
    }
}

/// Fails if the vehicle already holds an active reservation.
pub fn ensure_vehicle_free(plate: &str, active: Option<&Reservation>) -> EngineResult<()> {
    match active {
        Some(existing) if existing.is_active() => Err(EngineError::VehicleAlreadyActive {
            plate: plate.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Fails if the spot is not available or already carries an active
/// reservation.
pub fn ensure_spot_free(spot: &ParkingSpot, active: Option<&Reservation>) -> EngineResult<()> {
    let held = active.is_some_and(Reservation::is_active);
    if held || !spot.is_available() {
        return Err(EngineError::SpotAlreadyReserved { spot_id: spot.id });
    }
    Ok(())
}
