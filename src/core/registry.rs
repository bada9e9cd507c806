//! Lot registry: creation, resizing, editing and deletion of lots.
//!
//! Capacity changes cascade to the spot inventory, and spot removal always
//! archives reservation history before the spot row goes away.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::error::{EngineError, EngineResult};
use crate::core::inventory::SpotInventory;
use crate::core::ledger::ReservationLedger;
use crate::core::model::{LotDetails, LotId, NewLot, ParkingLot, ParkingSpot, SpotId};
use crate::core::repository::Repository;

/// Highest hourly price a lot may charge.
pub const MAX_COST_PER_UNIT: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Result of a capacity or price change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResizeOutcome {
    /// Lot after the change.
    pub lot: ParkingLot,
    /// Spots created by growing.
    pub added: Vec<SpotId>,
    /// Spots deleted by shrinking.
    pub removed: Vec<SpotId>,
    /// Reservations archived off removed spots.
    pub archived: usize,
}

/// Result of deleting a lot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotRemoval {
    /// The deleted lot as it was.
    pub lot: ParkingLot,
    /// Spots deleted with it.
    pub removed_spots: usize,
    /// Reservations archived.
    pub archived: usize,
}

/// Owns lot rows within a transaction.
pub struct LotRegistry<'r, R: Repository> {
    repo: &'r mut R,
}

impl<'r, R: Repository> LotRegistry<'r, R> {
    /// Bind the registry to an open transaction.
    pub fn new(repo: &'r mut R) -> Self {
        Self { repo }
    }

    /// Register a lot and materialize its spots at indices `0..max_spots`.
    pub fn create(&mut self, new: NewLot) -> EngineResult<ParkingLot> {
        let new = NewLot {
            primary_location: required("primary_location", &new.primary_location)?,
            full_address: required("full_address", &new.full_address)?,
            pincode: required("pincode", &new.pincode)?,
            ..new
        };
        ensure_positive_price(new.cost_per_unit)?;
        if self.repo.lot_by_location(&new.primary_location)?.is_some() {
            return Err(EngineError::DuplicateLocation {
                location: new.primary_location,
            });
        }

        let lot = self.repo.insert_lot(new)?;
        SpotInventory::new(&mut *self.repo).materialize(lot.id, 0, lot.max_spots)?;
        Ok(lot)
    }

    /// Change a lot's capacity and price.
    pub fn resize(&mut self, lot_id: LotId, new_max_spots: u32, new_cost_per_unit: Decimal) -> EngineResult<ResizeOutcome> {
        ensure_positive_price(new_cost_per_unit)?;
        let mut lot = self.load(lot_id)?;
        let counts = SpotInventory::new(&mut *self.repo).counts(lot_id)?;

        if new_max_spots < counts.occupied {
            return Err(EngineError::OccupiedSpotsExceedCapacity {
                lot_id,
                occupied: counts.occupied,
                requested: new_max_spots,
            });
        }
        if new_cost_per_unit != lot.cost_per_unit && counts.occupied > 0 {
            return Err(EngineError::PriceChangeBlocked {
                lot_id,
                occupied: counts.occupied,
            });
        }

        let mut outcome = ResizeOutcome {
            lot: lot.clone(),
            added: Vec::new(),
            removed: Vec::new(),
            archived: 0,
        };
        if new_max_spots > counts.total {
            outcome.added = SpotInventory::new(&mut *self.repo)
                .grow_to(lot_id, new_max_spots)?
                .into_iter()
                .map(|s| s.id)
                .collect();
        } else if new_max_spots < counts.total {
            let candidates =
                SpotInventory::new(&mut *self.repo).removal_candidates(lot_id, new_max_spots)?;
            for spot in &candidates {
                outcome.archived += self.retire_spot(&lot, spot)?;
                outcome.removed.push(spot.id);
            }
        }

        lot.max_spots = new_max_spots;
        lot.cost_per_unit = new_cost_per_unit;
        self.repo.update_lot(&lot)?;
        outcome.lot = lot;
        Ok(outcome)
    }

    /// Update descriptive fields. A new location must stay unique.
    pub fn edit_details(&mut self, lot_id: LotId, details: LotDetails) -> EngineResult<ParkingLot> {
        let mut lot = self.load(lot_id)?;
        if let Some(location) = details.primary_location {
            let location = required("primary_location", &location)?;
            if let Some(other) = self.repo.lot_by_location(&location)? {
                if other.id != lot_id {
                    return Err(EngineError::DuplicateLocation { location });
                }
            }
            lot.primary_location = location;
        }
        if let Some(address) = details.full_address {
            lot.full_address = required("full_address", &address)?;
        }
        if let Some(pincode) = details.pincode {
            lot.pincode = required("pincode", &pincode)?;
        }
        self.repo.update_lot(&lot)?;
        Ok(lot)
    }

    /// Delete a lot with all its spots, archiving their history first.
    pub fn delete(&mut self, lot_id: LotId) -> EngineResult<LotRemoval> {
        let lot = self.load(lot_id)?;
        let spots = self.repo.spots_in_lot(lot_id)?;
        let mut occupied = 0u32;
        for spot in &spots {
            if !spot.is_available() || self.repo.active_reservation_for_spot(spot.id)?.is_some() {
                occupied += 1;
            }
        }
        if occupied > 0 {
            return Err(EngineError::LotHasOccupiedSpots { lot_id, occupied });
        }

        let mut archived = 0;
        for spot in &spots {
            archived += self.retire_spot(&lot, spot)?;
        }
        self.repo.delete_lot(lot_id)?;
        Ok(LotRemoval {
            lot,
            removed_spots: spots.len(),
            archived,
        })
    }

    /// Archive a spot's reservations, then delete the spot.
    fn retire_spot(&mut self, lot: &ParkingLot, spot: &ParkingSpot) -> EngineResult<usize> {
        if self.repo.active_reservation_for_spot(spot.id)?.is_some() {
            return Err(EngineError::SpotOccupiedDuringShrink {
                lot_id: lot.id,
                spot_id: spot.id,
            });
        }
        let archived = ReservationLedger::new(&mut *self.repo).archive_spot_history(spot, lot)?;
        SpotInventory::new(&mut *self.repo).remove_spot(lot.id, spot.id)?;
        Ok(archived)
    }

    fn load(&self, lot_id: LotId) -> EngineResult<ParkingLot> {
        self.repo
            .lot(lot_id)?
            .ok_or_else(|| EngineError::not_found("lot", lot_id))
    }
}

fn required(field: &str, value: &str) -> EngineResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

fn ensure_positive_price(cost_per_unit: Decimal) -> EngineResult<()> {
    if cost_per_unit <= Decimal::ZERO {
        return Err(EngineError::Validation(
            "cost_per_unit must be greater than 0".into(),
        ));
    }
    if cost_per_unit > MAX_COST_PER_UNIT {
        return Err(EngineError::Validation(format!(
            "cost_per_unit must not exceed {MAX_COST_PER_UNIT}"
        )));
    }
    Ok(())
}
