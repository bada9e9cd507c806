//! The reservation engine facade.
//!
//! `ParkingEngine` wires the registry, inventory, ledger and directory to an
//! injected [`ParkingStore`]. Each mutating call is exactly one store
//! transaction: either every row it touches changes, or none does. Audit
//! events are emitted only after the transaction has committed.

use std::sync::Arc;

use parking_lot::Mutex;
use rust_decimal::Decimal;

use crate::core::access::{AdminCapability, Caller};
use crate::core::allocation::{AllocationPolicy, LowestIndexFirst};
use crate::core::audit::{AuditAction, AuditEvent, AuditSink};
use crate::core::directory::{self, UserDirectory};
use crate::core::error::{EngineError, EngineResult};
use crate::core::ledger::ReservationLedger;
use crate::core::model::{
    BookingRequest, LotDetails, LotId, NewLot, NewUser, ParkingLot, Reservation, ReservationId,
    User, UserId,
};
use crate::core::registry::{LotRegistry, LotRemoval, ResizeOutcome};
use crate::core::reports::{
    self, LotOverview, ReservationView, RevenueSummary, SpotDetail, UserSummary,
};
use crate::core::repository::{ParkingStore, Repository};
use crate::util::clock::{Clock, SystemClock};

/// Spot allocation and reservation lifecycle engine.
pub struct ParkingEngine<S, C = SystemClock, P = LowestIndexFirst> {
    store: S,
    clock: C,
    policy: P,
    audit: Option<Arc<Mutex<Box<dyn AuditSink>>>>,
}

impl<S: ParkingStore> ParkingEngine<S> {
    /// Engine over `store` using wall-clock time and lowest-index allocation.
    pub fn new(store: S) -> Self {
        Self::with_parts(store, SystemClock, LowestIndexFirst)
    }
}

impl<S, C, P> ParkingEngine<S, C, P>
where
    S: ParkingStore,
    C: Clock,
    P: AllocationPolicy,
{
    /// Engine from explicit components.
    pub fn with_parts(store: S, clock: C, policy: P) -> Self {
        Self {
            store,
            clock,
            policy,
            audit: None,
        }
    }

    /// Attach an audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Box<dyn AuditSink>) -> Self {
        self.audit = Some(Arc::new(Mutex::new(audit)));
        self
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The engine's time source.
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// Register a regular user.
    pub fn register_user(&self, new: NewUser) -> EngineResult<User> {
        let user = observe(
            "register_user",
            self.store
                .transaction(|repo| UserDirectory::new(repo).register(new, false)),
        )?;
        tracing::info!(user_id = user.id, username = %user.username, "user registered");
        self.record(AuditEvent::new(user.id, AuditAction::UserRegistered, self.clock.now()));
        Ok(user)
    }

    /// Ensure an administrator named `new.username` exists, creating it if
    /// needed. Returns the stored administrator.
    pub fn ensure_admin(&self, new: NewUser) -> EngineResult<User> {
        self.store.transaction(|repo| {
            if let Some(existing) = repo.user_by_username(new.username.trim())? {
                if !existing.is_admin {
                    return Err(EngineError::DuplicateUser {
                        field: "username",
                        value: existing.username,
                    });
                }
                return Ok(existing);
            }
            let admin = UserDirectory::new(repo).register(new, true)?;
            tracing::info!(user_id = admin.id, username = %admin.username, "administrator seeded");
            Ok(admin)
        })
    }

    /// Look up a user.
    pub fn user(&self, id: UserId) -> EngineResult<User> {
        self.store.read(|repo| directory::load_user(repo, id))
    }

    // ------------------------------------------------------------------
    // Lots (admin only)
    // ------------------------------------------------------------------

    /// Create a lot with `max_spots` available spots.
    pub fn create_lot(&self, admin: &AdminCapability, new: NewLot) -> EngineResult<ParkingLot> {
        let lot = observe(
            "create_lot",
            self.store.transaction(|repo| {
                directory::verify_admin(repo, admin)?;
                LotRegistry::new(repo).create(new)
            }),
        )?;
        tracing::info!(
            lot_id = lot.id,
            location = %lot.primary_location,
            max_spots = lot.max_spots,
            cost_per_unit = %lot.cost_per_unit,
            "lot created"
        );
        self.record(
            AuditEvent::new(admin.user_id(), AuditAction::LotCreated, self.clock.now())
                .lot(lot.id)
                .detail(format!("max_spots={}", lot.max_spots)),
        );
        Ok(lot)
    }

    /// Change a lot's capacity and price.
    pub fn resize_lot(
        &self,
        admin: &AdminCapability,
        lot_id: LotId,
        new_max_spots: u32,
        new_cost_per_unit: Decimal,
    ) -> EngineResult<ResizeOutcome> {
        let outcome = observe(
            "resize_lot",
            self.store.transaction(|repo| {
                directory::verify_admin(repo, admin)?;
                LotRegistry::new(repo).resize(lot_id, new_max_spots, new_cost_per_unit)
            }),
        )?;
        tracing::info!(
            lot_id,
            max_spots = new_max_spots,
            added = outcome.added.len(),
            removed = outcome.removed.len(),
            archived = outcome.archived,
            "lot resized"
        );
        self.record(
            AuditEvent::new(admin.user_id(), AuditAction::LotResized, self.clock.now())
                .lot(lot_id)
                .detail(format!(
                    "max_spots={} cost_per_unit={} added={} removed={}",
                    new_max_spots,
                    new_cost_per_unit,
                    outcome.added.len(),
                    outcome.removed.len()
                )),
        );
        Ok(outcome)
    }

    /// Edit a lot's location, address or pincode.
    pub fn edit_lot(
        &self,
        admin: &AdminCapability,
        lot_id: LotId,
        details: LotDetails,
    ) -> EngineResult<ParkingLot> {
        let lot = observe(
            "edit_lot",
            self.store.transaction(|repo| {
                directory::verify_admin(repo, admin)?;
                LotRegistry::new(repo).edit_details(lot_id, details)
            }),
        )?;
        tracing::info!(lot_id, location = %lot.primary_location, "lot edited");
        self.record(
            AuditEvent::new(admin.user_id(), AuditAction::LotEdited, self.clock.now()).lot(lot_id),
        );
        Ok(lot)
    }

    /// Delete a lot and its spots, archiving their reservation history.
    pub fn delete_lot(&self, admin: &AdminCapability, lot_id: LotId) -> EngineResult<LotRemoval> {
        let removal = observe(
            "delete_lot",
            self.store.transaction(|repo| {
                directory::verify_admin(repo, admin)?;
                LotRegistry::new(repo).delete(lot_id)
            }),
        )?;
        tracing::info!(
            lot_id,
            removed_spots = removal.removed_spots,
            archived = removal.archived,
            "lot deleted"
        );
        self.record(
            AuditEvent::new(admin.user_id(), AuditAction::LotDeleted, self.clock.now())
                .lot(lot_id)
                .detail(format!("archived={}", removal.archived)),
        );
        Ok(removal)
    }

    // ------------------------------------------------------------------
    // Reservations
    // ------------------------------------------------------------------

    /// Reserve the next available spot of a lot for the caller's vehicle.
    pub fn book_spot(&self, caller: &Caller, request: BookingRequest) -> EngineResult<Reservation> {
        validate_booking(&request)?;
        let now = self.clock.now();
        let reservation = observe(
            "book_spot",
            self.store.transaction(|repo| {
                let user = directory::verify_member(repo, caller)?;
                let lot = repo
                    .lot(request.lot_id)?
                    .ok_or_else(|| EngineError::not_found("lot", request.lot_id))?;
                ReservationLedger::new(repo).book(
                    &self.policy,
                    user.id,
                    &request,
                    lot.cost_per_unit,
                    now,
                )
            }),
        )?;
        tracing::info!(
            reservation_id = reservation.id,
            user_id = caller.user_id,
            lot_id = request.lot_id,
            spot_id = ?reservation.spot_id,
            plate = %reservation.vehicle_plate,
            estimated_cost = %reservation.estimated_cost,
            "spot booked"
        );
        self.record(
            AuditEvent::new(caller.user_id, AuditAction::SpotBooked, now)
                .lot(request.lot_id)
                .spot(reservation.spot_id)
                .reservation(reservation.id),
        );
        Ok(reservation)
    }

    /// Check out: close the reservation, bill it and free its spot. Only the
    /// owner or an administrator may release.
    pub fn release_spot(&self, caller: &Caller, reservation_id: ReservationId) -> EngineResult<Reservation> {
        let now = self.clock.now();
        let reservation = observe(
            "release_spot",
            self.store.transaction(|repo| {
                let user = directory::load_user(repo, caller.user_id)?;
                let current = repo
                    .reservation(reservation_id)?
                    .ok_or_else(|| EngineError::not_found("reservation", reservation_id))?;
                if current.user_id != user.id && !user.is_admin {
                    return Err(EngineError::Forbidden(format!(
                        "reservation {reservation_id} belongs to another user"
                    )));
                }
                ReservationLedger::new(repo).release(reservation_id, now)
            }),
        )?;
        let final_cost = reservation.final_cost.unwrap_or_default();
        tracing::info!(
            reservation_id,
            user_id = reservation.user_id,
            spot_id = ?reservation.spot_id,
            final_cost = %final_cost,
            "spot released"
        );
        self.record(
            AuditEvent::new(caller.user_id, AuditAction::SpotReleased, now)
                .spot(reservation.spot_id)
                .reservation(reservation_id)
                .detail(format!("final_cost={final_cost}")),
        );
        Ok(reservation)
    }

    /// Look up a reservation.
    pub fn reservation(&self, id: ReservationId) -> EngineResult<Reservation> {
        self.store.read(|repo| {
            repo.reservation(id)?
                .ok_or_else(|| EngineError::not_found("reservation", id))
        })
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Every lot with live counts.
    pub fn list_lots(&self) -> EngineResult<Vec<LotOverview>> {
        self.store.read(|repo| reports::lot_overviews(repo))
    }

    /// One lot with live counts.
    pub fn lot(&self, lot_id: LotId) -> EngineResult<LotOverview> {
        self.store.read(|repo| {
            reports::lot_overviews(repo)?
                .into_iter()
                .find(|o| o.lot.id == lot_id)
                .ok_or_else(|| EngineError::not_found("lot", lot_id))
        })
    }

    /// Lots matching a location, address or pincode fragment.
    pub fn search_lots(&self, query: &str) -> EngineResult<Vec<LotOverview>> {
        self.store.read(|repo| reports::search_lots(repo, query))
    }

    /// Spots of a lot with their holders.
    pub fn lot_spots(&self, lot_id: LotId) -> EngineResult<Vec<SpotDetail>> {
        let now = self.clock.now();
        self.store.read(|repo| {
            if repo.lot(lot_id)?.is_none() {
                return Err(EngineError::not_found("lot", lot_id));
            }
            reports::lot_spots(repo, lot_id, now)
        })
    }

    /// A user's reservation history, newest first.
    pub fn user_reservations(&self, user_id: UserId) -> EngineResult<Vec<ReservationView>> {
        let now = self.clock.now();
        self.store.read(|repo| {
            directory::load_user(repo, user_id)?;
            reports::user_reservations(repo, user_id, now)
        })
    }

    /// Revenue and occupancy per lot.
    pub fn revenue_summary(&self) -> EngineResult<RevenueSummary> {
        self.store.read(|repo| reports::revenue_summary(repo))
    }

    /// Totals for one user.
    pub fn user_summary(&self, user_id: UserId) -> EngineResult<UserSummary> {
        self.store.read(|repo| {
            directory::load_user(repo, user_id)?;
            reports::user_summary(repo, user_id)
        })
    }

    fn record(&self, event: AuditEvent) {
        if let Some(audit) = &self.audit {
            audit.lock().record(event);
        }
    }
}

fn validate_booking(request: &BookingRequest) -> EngineResult<()> {
    if request.requested_hours == 0 {
        return Err(EngineError::Validation(
            "requested_hours must be at least 1".into(),
        ));
    }
    if request.vehicle_plate.trim().is_empty() {
        return Err(EngineError::Validation("vehicle_plate must not be empty".into()));
    }
    if request.vehicle_model.trim().is_empty() {
        return Err(EngineError::Validation("vehicle_model must not be empty".into()));
    }
    Ok(())
}

fn observe<T>(operation: &'static str, result: EngineResult<T>) -> EngineResult<T> {
    if let Err(err) = &result {
        tracing::warn!(operation, kind = ?err.kind(), error = %err, "request rejected");
    }
    result
}
