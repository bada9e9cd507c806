//! In-memory tables and the store built on them.
//!
//! Transactions are copy-on-write: the closure works on a clone of the
//! committed tables, which replaces them only if the closure succeeds.
//! The write lock is held for the whole transaction, so writers are
//! serialized and readers never observe a half-applied change.
//! Each transaction clones every table, history included, so its cost grows
//! with the number of stored reservations.

use std::collections::BTreeMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::core::error::{EngineError, EngineResult};
use crate::core::model::{
    LotId, NewLot, NewReservation, NewUser, ParkingLot, ParkingSpot, Reservation, ReservationId,
    SpotId, SpotStatus, User, UserId,
};
use crate::core::repository::{ParkingStore, Repository};

/// Last identifier handed out per table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Sequences {
    user: u64,
    lot: u64,
    spot: u64,
    reservation: u64,
}

fn next(counter: &mut u64) -> u64 {
    *counter += 1;
    *counter
}

/// Engine tables held in ordered maps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryTables {
    sequences: Sequences,
    users: BTreeMap<UserId, User>,
    lots: BTreeMap<LotId, ParkingLot>,
    spots: BTreeMap<SpotId, ParkingSpot>,
    reservations: BTreeMap<ReservationId, Reservation>,
}

impl MemoryTables {
    /// Empty tables.
    pub fn new() -> Self {
        Self::default()
    }

    fn find_user(&self, pred: impl Fn(&User) -> bool) -> Option<User> {
        self.users.values().find(|&u| pred(u)).cloned()
    }

    fn find_active(&self, pred: impl Fn(&Reservation) -> bool) -> Option<Reservation> {
        self.reservations
            .values()
            .find(|&r| r.is_active() && pred(r))
            .cloned()
    }

    /// Enforce the one-active-per-spot and one-active-per-plate constraints
    /// for a row that is (or will be) active.
    fn check_active_unique(
        &self,
        id: Option<ReservationId>,
        spot_id: Option<SpotId>,
        plate: &str,
    ) -> EngineResult<()> {
        let others = |r: &&Reservation| r.is_active() && Some(r.id) != id;
        if let Some(spot_id) = spot_id {
            if self
                .reservations
                .values()
                .filter(others)
                .any(|r| r.spot_id == Some(spot_id))
            {
                return Err(EngineError::SpotAlreadyReserved { spot_id });
            }
        }
        if self
            .reservations
            .values()
            .filter(others)
            .any(|r| r.vehicle_plate == plate)
        {
            return Err(EngineError::VehicleAlreadyActive {
                plate: plate.to_string(),
            });
        }
        Ok(())
    }
}

impl Repository for MemoryTables {
    fn insert_user(&mut self, user: NewUser, is_admin: bool) -> EngineResult<User> {
        let clash = |field: &'static str, value: &str| EngineError::DuplicateUser {
            field,
            value: value.to_string(),
        };
        if self.find_user(|u| u.username == user.username).is_some() {
            return Err(clash("username", &user.username));
        }
        if self.find_user(|u| u.email == user.email).is_some() {
            return Err(clash("email", &user.email));
        }
        if let Some(contact) = &user.contact_number {
            if self
                .find_user(|u| u.contact_number.as_deref() == Some(contact.as_str()))
                .is_some()
            {
                return Err(clash("contact_number", contact));
            }
        }
        let stored = User {
            id: next(&mut self.sequences.user),
            username: user.username,
            email: user.email,
            contact_number: user.contact_number,
            address: user.address,
            is_admin,
        };
        self.users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn user(&self, id: UserId) -> EngineResult<Option<User>> {
        Ok(self.users.get(&id).cloned())
    }

    fn user_by_username(&self, username: &str) -> EngineResult<Option<User>> {
        Ok(self.find_user(|u| u.username == username))
    }

    fn user_by_email(&self, email: &str) -> EngineResult<Option<User>> {
        Ok(self.find_user(|u| u.email == email))
    }

    fn user_by_contact(&self, contact_number: &str) -> EngineResult<Option<User>> {
        Ok(self.find_user(|u| u.contact_number.as_deref() == Some(contact_number)))
    }

    fn insert_lot(&mut self, lot: NewLot) -> EngineResult<ParkingLot> {
        if self.lot_by_location(&lot.primary_location)?.is_some() {
            return Err(EngineError::DuplicateLocation {
                location: lot.primary_location,
            });
        }
        let stored = ParkingLot {
            id: next(&mut self.sequences.lot),
            primary_location: lot.primary_location,
            full_address: lot.full_address,
            pincode: lot.pincode,
            max_spots: lot.max_spots,
            cost_per_unit: lot.cost_per_unit,
        };
        self.lots.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn lot(&self, id: LotId) -> EngineResult<Option<ParkingLot>> {
        Ok(self.lots.get(&id).cloned())
    }

    fn lot_by_location(&self, location: &str) -> EngineResult<Option<ParkingLot>> {
        Ok(self
            .lots
            .values()
            .find(|l| l.primary_location == location)
            .cloned())
    }

    fn lots(&self) -> EngineResult<Vec<ParkingLot>> {
        Ok(self.lots.values().cloned().collect())
    }

    fn update_lot(&mut self, lot: &ParkingLot) -> EngineResult<()> {
        if !self.lots.contains_key(&lot.id) {
            return Err(EngineError::not_found("lot", lot.id));
        }
        if let Some(other) = self.lot_by_location(&lot.primary_location)? {
            if other.id != lot.id {
                return Err(EngineError::DuplicateLocation {
                    location: lot.primary_location.clone(),
                });
            }
        }
        self.lots.insert(lot.id, lot.clone());
        Ok(())
    }

    fn delete_lot(&mut self, id: LotId) -> EngineResult<()> {
        if self.spots.values().any(|s| s.lot_id == id) {
            return Err(EngineError::Invariant(format!(
                "lot {id} still owns spots"
            )));
        }
        self.lots
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| EngineError::not_found("lot", id))
    }

    fn insert_spot(&mut self, lot_id: LotId, spot_index: u32) -> EngineResult<ParkingSpot> {
        if !self.lots.contains_key(&lot_id) {
            return Err(EngineError::not_found("lot", lot_id));
        }
        if self
            .spots
            .values()
            .any(|s| s.lot_id == lot_id && s.spot_index == spot_index)
        {
            return Err(EngineError::Invariant(format!(
                "lot {lot_id} already has a spot at index {spot_index}"
            )));
        }
        let spot = ParkingSpot {
            id: next(&mut self.sequences.spot),
            lot_id,
            spot_index,
            status: SpotStatus::Available,
        };
        self.spots.insert(spot.id, spot.clone());
        Ok(spot)
    }

    fn spot(&self, id: SpotId) -> EngineResult<Option<ParkingSpot>> {
        Ok(self.spots.get(&id).cloned())
    }

    fn spots_in_lot(&self, lot_id: LotId) -> EngineResult<Vec<ParkingSpot>> {
        let mut spots: Vec<ParkingSpot> = self
            .spots
            .values()
            .filter(|s| s.lot_id == lot_id)
            .cloned()
            .collect();
        spots.sort_by_key(|s| s.spot_index);
        Ok(spots)
    }

    fn set_spot_status(&mut self, id: SpotId, status: SpotStatus) -> EngineResult<()> {
        let spot = self
            .spots
            .get_mut(&id)
            .ok_or_else(|| EngineError::not_found("spot", id))?;
        spot.status = status;
        Ok(())
    }

    fn delete_spot(&mut self, id: SpotId) -> EngineResult<()> {
        // Reservations must be archived (detached) before their spot goes.
        if self.reservations.values().any(|r| r.spot_id == Some(id)) {
            return Err(EngineError::Invariant(format!(
                "spot {id} is still referenced by reservations"
            )));
        }
        self.spots
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| EngineError::not_found("spot", id))
    }

    fn insert_reservation(&mut self, reservation: NewReservation) -> EngineResult<Reservation> {
        if !self.users.contains_key(&reservation.user_id) {
            return Err(EngineError::not_found("user", reservation.user_id));
        }
        if !self.spots.contains_key(&reservation.spot_id) {
            return Err(EngineError::not_found("spot", reservation.spot_id));
        }
        self.check_active_unique(None, Some(reservation.spot_id), &reservation.vehicle_plate)?;
        let stored = Reservation {
            id: next(&mut self.sequences.reservation),
            user_id: reservation.user_id,
            spot_id: Some(reservation.spot_id),
            check_in: reservation.check_in,
            estimated_checkout: reservation.estimated_checkout,
            actual_checkout: None,
            vehicle_model: reservation.vehicle_model,
            vehicle_plate: reservation.vehicle_plate,
            cost_per_unit: reservation.cost_per_unit,
            estimated_cost: reservation.estimated_cost,
            final_cost: None,
            archived_lot_id: None,
            archived_primary_location: None,
            archived_spot_id: None,
        };
        self.reservations.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn reservation(&self, id: ReservationId) -> EngineResult<Option<Reservation>> {
        Ok(self.reservations.get(&id).cloned())
    }

    fn update_reservation(&mut self, reservation: &Reservation) -> EngineResult<()> {
        if !self.reservations.contains_key(&reservation.id) {
            return Err(EngineError::not_found("reservation", reservation.id));
        }
        if reservation.is_active() {
            self.check_active_unique(
                Some(reservation.id),
                reservation.spot_id,
                &reservation.vehicle_plate,
            )?;
        }
        self.reservations.insert(reservation.id, reservation.clone());
        Ok(())
    }

    fn active_reservation_for_plate(&self, plate: &str) -> EngineResult<Option<Reservation>> {
        Ok(self.find_active(|r| r.vehicle_plate == plate))
    }

    fn active_reservation_for_spot(&self, spot_id: SpotId) -> EngineResult<Option<Reservation>> {
        Ok(self.find_active(|r| r.spot_id == Some(spot_id)))
    }

    fn reservations_for_spot(&self, spot_id: SpotId) -> EngineResult<Vec<Reservation>> {
        Ok(self
            .reservations
            .values()
            .filter(|r| r.spot_id == Some(spot_id))
            .cloned()
            .collect())
    }

    fn reservations_for_user(&self, user_id: UserId) -> EngineResult<Vec<Reservation>> {
        Ok(self
            .reservations
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    fn reservations(&self) -> EngineResult<Vec<Reservation>> {
        Ok(self.reservations.values().cloned().collect())
    }
}

/// Process-local store for development, tests and single-node deployments.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<MemoryTables>,
}

impl InMemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with existing tables.
    pub fn from_tables(tables: MemoryTables) -> Self {
        Self {
            tables: RwLock::new(tables),
        }
    }

    /// Copy of the committed tables.
    pub fn snapshot(&self) -> MemoryTables {
        self.tables.read().clone()
    }
}

impl ParkingStore for InMemoryStore {
    type Repo = MemoryTables;

    fn read<R, F>(&self, f: F) -> EngineResult<R>
    where
        F: FnOnce(&Self::Repo) -> EngineResult<R>,
    {
        let tables = self.tables.read();
        f(&tables)
    }

    fn transaction<R, F>(&self, f: F) -> EngineResult<R>
    where
        F: FnOnce(&mut Self::Repo) -> EngineResult<R>,
    {
        let mut committed = self.tables.write();
        let mut working = committed.clone();
        let out = f(&mut working)?;
        *committed = working;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ErrorKind, LotRegistry};
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn seeded() -> (MemoryTables, User, ParkingLot) {
        let mut tables = MemoryTables::new();
        let user = tables
            .insert_user(
                NewUser {
                    username: "asha".into(),
                    email: "asha@example.com".into(),
                    contact_number: Some("9876543210".into()),
                    address: "12 Lake Road".into(),
                },
                false,
            )
            .unwrap();
        let lot = tables
            .insert_lot(NewLot {
                primary_location: "Indiranagar".into(),
                full_address: "100ft Road".into(),
                pincode: "560038".into(),
                max_spots: 2,
                cost_per_unit: Decimal::from(30),
            })
            .unwrap();
        (tables, user, lot)
    }

    fn new_reservation(user: UserId, spot: SpotId, plate: &str) -> NewReservation {
        let now = Utc::now();
        NewReservation {
            user_id: user,
            spot_id: spot,
            check_in: now,
            estimated_checkout: now,
            vehicle_model: "Swift".into(),
            vehicle_plate: plate.into(),
            cost_per_unit: Decimal::from(30),
            estimated_cost: Decimal::from(30),
        }
    }

    #[test]
    fn duplicate_spot_index_rejected() {
        let (mut tables, _, lot) = seeded();
        tables.insert_spot(lot.id, 0).unwrap();
        let err = tables.insert_spot(lot.id, 0).unwrap_err();
        assert!(matches!(err, EngineError::Invariant(_)));
    }

    #[test]
    fn one_active_reservation_per_spot_and_plate() {
        let (mut tables, user, lot) = seeded();
        let a = tables.insert_spot(lot.id, 0).unwrap();
        let b = tables.insert_spot(lot.id, 1).unwrap();
        tables
            .insert_reservation(new_reservation(user.id, a.id, "KA01AB1234"))
            .unwrap();

        let same_spot = tables.insert_reservation(new_reservation(user.id, a.id, "KA02CD5678"));
        assert!(matches!(same_spot, Err(EngineError::SpotAlreadyReserved { .. })));

        let same_plate = tables.insert_reservation(new_reservation(user.id, b.id, "KA01AB1234"));
        assert!(matches!(same_plate, Err(EngineError::VehicleAlreadyActive { .. })));
    }

    #[test]
    fn referenced_spot_cannot_be_deleted() {
        let (mut tables, user, lot) = seeded();
        let spot = tables.insert_spot(lot.id, 0).unwrap();
        tables
            .insert_reservation(new_reservation(user.id, spot.id, "MH12XY0001"))
            .unwrap();
        assert!(matches!(
            tables.delete_spot(spot.id),
            Err(EngineError::Invariant(_))
        ));
    }

    #[test]
    fn shrink_aborts_when_a_removed_spot_is_still_held() {
        let (mut tables, user, _) = seeded();
        let lot = tables
            .insert_lot(NewLot {
                primary_location: "Jayanagar".into(),
                full_address: "4th Block".into(),
                pincode: "560011".into(),
                max_spots: 12,
                cost_per_unit: Decimal::from(30),
            })
            .unwrap();
        let spots: Vec<ParkingSpot> = (0..12)
            .map(|index| tables.insert_spot(lot.id, index).unwrap())
            .collect();
        // Index 10 still reads Available but carries an open reservation.
        let held = tables
            .insert_reservation(new_reservation(user.id, spots[10].id, "KA05JN0010"))
            .unwrap();
        let store = InMemoryStore::from_tables(tables);
        let before = serde_json::to_value(store.snapshot()).unwrap();

        let err = store
            .transaction(|repo| LotRegistry::new(repo).resize(lot.id, 10, Decimal::from(30)))
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::SpotOccupiedDuringShrink { spot_id, .. } if spot_id == spots[10].id
        ));
        assert_eq!(err.kind(), ErrorKind::Capacity);

        // Index 11 was removed first inside the transaction; none of it sticks.
        assert_eq!(serde_json::to_value(store.snapshot()).unwrap(), before);
        store
            .read(|repo| {
                assert_eq!(repo.spots_in_lot(lot.id)?.len(), 12);
                assert_eq!(repo.lot(lot.id)?.unwrap().max_spots, 12);
                let reservation = repo.reservation(held.id)?.unwrap();
                assert_eq!(reservation.spot_id, Some(spots[10].id));
                assert!(reservation.archived_lot_id.is_none());
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn failed_transaction_leaves_no_trace() {
        let store = InMemoryStore::new();
        let result: EngineResult<()> = store.transaction(|repo| {
            repo.insert_lot(NewLot {
                primary_location: "Koramangala".into(),
                full_address: "80ft Road".into(),
                pincode: "560034".into(),
                max_spots: 10,
                cost_per_unit: Decimal::from(25),
            })?;
            Err(EngineError::Backend("boom".into()))
        });
        assert!(result.is_err());
        assert!(store.read(|repo| repo.lots()).unwrap().is_empty());
    }
}
