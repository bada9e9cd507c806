//! Spot inventory: creation, status transitions and removal of spots.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::allocation::AllocationPolicy;
use crate::core::error::{EngineError, EngineResult};
use crate::core::model::{LotId, ParkingSpot, SpotId, SpotStatus};
use crate::core::repository::Repository;

/// Spot totals for one lot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotCounts {
    /// All spots.
    pub total: u32,
    /// Spots held by a reservation.
    pub occupied: u32,
    /// Spots free to book.
    pub available: u32,
}

impl SpotCounts {
    /// Tally a lot's spots.
    pub fn from_spots(spots: &[ParkingSpot]) -> Self {
        spots.iter().fold(Self::default(), |mut counts, spot| {
            counts.total += 1;
            match spot.status {
                SpotStatus::Available => counts.available += 1,
                SpotStatus::Occupied => counts.occupied += 1,
            }
            counts
        })
    }
}

/// Owns spot rows and their status within a transaction.
pub struct SpotInventory<'r, R: Repository> {
    repo: &'r mut R,
}

impl<'r, R: Repository> SpotInventory<'r, R> {
    /// Bind the inventory to an open transaction.
    pub fn new(repo: &'r mut R) -> Self {
        Self { repo }
    }

    /// Create available spots for every index in `from..to` not already
    /// present in the lot.
    pub fn materialize(&mut self, lot_id: LotId, from: u32, to: u32) -> EngineResult<Vec<ParkingSpot>> {
        let existing = self.indices(lot_id)?;
        let mut created = Vec::new();
        for index in (from..to).filter(|i| !existing.contains(i)) {
            created.push(self.repo.insert_spot(lot_id, index)?);
        }
        Ok(created)
    }

    /// Add spots at the lowest missing indices until the lot owns `target`
    /// spots. A lot without gaps grows exactly at `len..target`.
    pub fn grow_to(&mut self, lot_id: LotId, target: u32) -> EngineResult<Vec<ParkingSpot>> {
        let existing = self.indices(lot_id)?;
        let mut count = u32::try_from(existing.len())
            .map_err(|_| EngineError::Invariant(format!("lot {lot_id} spot count overflow")))?;
        let mut created = Vec::new();
        let mut index = 0u32;
        while count < target {
            if !existing.contains(&index) {
                created.push(self.repo.insert_spot(lot_id, index)?);
                count += 1;
            }
            index += 1;
        }
        Ok(created)
    }

    /// The spot `policy` would allocate next in `lot_id`.
    pub fn pick_available<P>(&self, policy: &P, lot_id: LotId) -> EngineResult<Option<ParkingSpot>>
    where
        P: AllocationPolicy + ?Sized,
    {
        let spots = self.repo.spots_in_lot(lot_id)?;
        let chosen = policy.choose(&spots).cloned();
        if let Some(spot) = &chosen {
            tracing::debug!(lot_id, spot_id = spot.id, spot_index = spot.spot_index, "spot selected");
        }
        Ok(chosen)
    }

    /// Flip an available spot to occupied.
    pub fn mark_occupied(&mut self, spot_id: SpotId) -> EngineResult<ParkingSpot> {
        let mut spot = self.load(spot_id)?;
        if spot.status != SpotStatus::Available {
            return Err(EngineError::SpotAlreadyReserved { spot_id });
        }
        self.repo.set_spot_status(spot_id, SpotStatus::Occupied)?;
        spot.status = SpotStatus::Occupied;
        Ok(spot)
    }

    /// Flip an occupied spot back to available.
    pub fn mark_available(&mut self, spot_id: SpotId) -> EngineResult<ParkingSpot> {
        let mut spot = self.load(spot_id)?;
        if spot.status != SpotStatus::Occupied {
            return Err(EngineError::Invariant(format!("spot {spot_id} is not occupied")));
        }
        self.repo.set_spot_status(spot_id, SpotStatus::Available)?;
        spot.status = SpotStatus::Available;
        Ok(spot)
    }

    /// Spot totals for a lot.
    pub fn counts(&self, lot_id: LotId) -> EngineResult<SpotCounts> {
        Ok(SpotCounts::from_spots(&self.repo.spots_in_lot(lot_id)?))
    }

    /// Spots to delete so the lot shrinks to `target`: available spots,
    /// highest index first.
    pub fn removal_candidates(&self, lot_id: LotId, target: u32) -> EngineResult<Vec<ParkingSpot>> {
        let spots = self.repo.spots_in_lot(lot_id)?;
        let excess = spots.len().saturating_sub(target as usize);
        let mut available: Vec<ParkingSpot> =
            spots.iter().filter(|s| s.is_available()).cloned().collect();
        if available.len() < excess {
            let counts = SpotCounts::from_spots(&spots);
            return Err(EngineError::OccupiedSpotsExceedCapacity {
                lot_id,
                occupied: counts.occupied,
                requested: target,
            });
        }
        available.sort_by(|a, b| b.spot_index.cmp(&a.spot_index));
        available.truncate(excess);
        Ok(available)
    }

    /// Delete a spot after re-checking, against current state, that nothing
    /// holds it.
    pub fn remove_spot(&mut self, lot_id: LotId, spot_id: SpotId) -> EngineResult<()> {
        let spot = self.load(spot_id)?;
        let held = self.repo.active_reservation_for_spot(spot_id)?.is_some();
        if held || !spot.is_available() {
            return Err(EngineError::SpotOccupiedDuringShrink { lot_id, spot_id });
        }
        self.repo.delete_spot(spot_id)
    }

    fn load(&self, spot_id: SpotId) -> EngineResult<ParkingSpot> {
        self.repo
            .spot(spot_id)?
            .ok_or_else(|| EngineError::not_found("spot", spot_id))
    }

    fn indices(&self, lot_id: LotId) -> EngineResult<BTreeSet<u32>> {
        Ok(self
            .repo
            .spots_in_lot(lot_id)?
            .into_iter()
            .map(|s| s.spot_index)
            .collect())
    }
}
