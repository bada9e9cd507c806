//! Reservation ledger: booking, release and archival of reservations.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use crate::core::allocation::{ensure_spot_free, ensure_vehicle_free, AllocationPolicy};
use crate::core::billing;
use crate::core::error::{EngineError, EngineResult};
use crate::core::inventory::SpotInventory;
use crate::core::model::{
    normalize_plate, BookingRequest, NewReservation, ParkingLot, ParkingSpot, Reservation,
    ReservationId, UserId,
};
use crate::core::repository::Repository;

/// Owns reservation rows within a transaction.
pub struct ReservationLedger<'r, R: Repository> {
    repo: &'r mut R,
}

impl<'r, R: Repository> ReservationLedger<'r, R> {
    /// Bind the ledger to an open transaction.
    pub fn new(repo: &'r mut R) -> Self {
        Self { repo }
    }

    /// Allocate a spot in `request.lot_id` and open a reservation on it.
    ///
    /// `cost_per_unit` is the lot price read in the same transaction; it is
    /// frozen on the reservation. The caller's transaction makes the insert
    /// and the status flip one unit.
    pub fn book<P>(
        &mut self,
        policy: &P,
        user_id: UserId,
        request: &BookingRequest,
        cost_per_unit: Decimal,
        now: DateTime<Utc>,
    ) -> EngineResult<Reservation>
    where
        P: AllocationPolicy + ?Sized,
    {
        let estimated_checkout = Duration::try_hours(i64::from(request.requested_hours))
            .and_then(|stay| now.checked_add_signed(stay))
            .ok_or_else(|| {
                EngineError::Validation(format!(
                    "requested_hours {} is out of range",
                    request.requested_hours
                ))
            })?;
        let estimated_cost = billing::estimated_cost(cost_per_unit, request.requested_hours)?;

        let plate = normalize_plate(&request.vehicle_plate);
        let existing = self.repo.active_reservation_for_plate(&plate)?;
        ensure_vehicle_free(&plate, existing.as_ref())?;

        let spot = SpotInventory::new(&mut *self.repo)
            .pick_available(policy, request.lot_id)?
            .ok_or(EngineError::LotFull {
                lot_id: request.lot_id,
            })?;
        let holder = self.repo.active_reservation_for_spot(spot.id)?;
        ensure_spot_free(&spot, holder.as_ref())?;

        let reservation = self.repo.insert_reservation(NewReservation {
            user_id,
            spot_id: spot.id,
            check_in: now,
            estimated_checkout,
            vehicle_model: request.vehicle_model.trim().to_string(),
            vehicle_plate: plate,
            cost_per_unit,
            estimated_cost,
        })?;
        SpotInventory::new(&mut *self.repo).mark_occupied(spot.id)?;
        Ok(reservation)
    }

    /// Close an active reservation at `now`, bill it and free its spot.
    pub fn release(&mut self, reservation_id: ReservationId, now: DateTime<Utc>) -> EngineResult<Reservation> {
        let mut reservation = self.load(reservation_id)?;
        if !reservation.is_active() {
            return Err(EngineError::AlreadyReleased { reservation_id });
        }
        let spot_id = reservation.spot_id.ok_or_else(|| {
            EngineError::Invariant(format!("active reservation {reservation_id} has no spot"))
        })?;
        let spot = self
            .repo
            .spot(spot_id)?
            .ok_or_else(|| EngineError::not_found("spot", spot_id))?;
        if spot.is_available() {
            return Err(EngineError::AlreadyReleased { reservation_id });
        }

        reservation.actual_checkout = Some(now);
        reservation.final_cost = Some(billing::reservation_cost(&reservation, now)?);
        self.repo.update_reservation(&reservation)?;
        SpotInventory::new(&mut *self.repo).mark_available(spot_id)?;
        Ok(reservation)
    }

    /// Copy lot and spot attribution onto every reservation of `spot` and
    /// detach them from it, ahead of the spot being deleted. Returns the
    /// number of reservations archived.
    pub fn archive_spot_history(&mut self, spot: &ParkingSpot, lot: &ParkingLot) -> EngineResult<usize> {
        let history = self.repo.reservations_for_spot(spot.id)?;
        for mut reservation in history.iter().cloned() {
            if reservation.is_active() {
                return Err(EngineError::Invariant(format!(
                    "refusing to archive active reservation {}",
                    reservation.id
                )));
            }
            reservation.archived_lot_id = Some(lot.id);
            reservation.archived_primary_location = Some(lot.primary_location.clone());
            reservation.archived_spot_id = Some(spot.id);
            reservation.spot_id = None;
            self.repo.update_reservation(&reservation)?;
        }
        Ok(history.len())
    }

    fn load(&self, id: ReservationId) -> EngineResult<Reservation> {
        self.repo
            .reservation(id)?
            .ok_or_else(|| EngineError::not_found("reservation", id))
    }
}
